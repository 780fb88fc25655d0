use crate::cli::ConfigCommands;
use crate::config::{global_config_path, Config, CONFIG_FILE_NAME};
use crate::error::Result;
use std::path::{Path, PathBuf};

pub fn execute(command: &ConfigCommands, project_root: &Path) -> Result<()> {
    match command {
        ConfigCommands::Validate { file } => validate(file.as_ref(), project_root),
        ConfigCommands::Show => show(project_root),
    }
}

fn validate(file: Option<&PathBuf>, project_root: &Path) -> Result<()> {
    if let Some(file) = file {
        println!("Validating {}...", file.display());
        return report(Config::from_file(file).and_then(|config| config.validate()));
    }

    let project_config = project_root.join(CONFIG_FILE_NAME);
    let global_config =
        global_config_path().unwrap_or_else(|| PathBuf::from("~").join(CONFIG_FILE_NAME));

    println!("Validating configuration files...\n");

    for (label, path) in [("Global", &global_config), ("Project", &project_config)] {
        if path.exists() {
            println!("  {} config: {}", label, path.display());
        } else {
            println!(
                "  {} config: {} - not found (optional)",
                label,
                path.display()
            );
        }
    }

    println!("\nLoading and validating configuration...");
    report(Config::load(project_root).and_then(|config| config.validate()))
}

fn report(outcome: Result<()>) -> Result<()> {
    match outcome {
        Ok(()) => {
            println!("✓ Configuration is valid!");
            Ok(())
        }
        Err(e) => {
            println!("✗ Configuration is invalid!");
            println!("  Error: {}", e);
            Err(e)
        }
    }
}

fn show(project_root: &Path) -> Result<()> {
    let config = Config::load(project_root)?;

    println!("Effective Configuration:");
    println!("(CLI > Environment > Project config > Global config > Defaults)\n");

    println!("Convert:");
    println!("  normalize: {}", config.convert.normalize);
    println!("  add_marker: {}", config.convert.add_marker);
    println!(
        "  include_incompatible: {}",
        config.convert.include_incompatible
    );

    if !config.targets.droids.is_empty() || !config.targets.skills.is_empty() {
        println!("\nTargets:");
        print_list("droids", &config.targets.droids);
        print_list("skills", &config.targets.skills);
    }

    let catalog = &config.catalog;
    let customised = !catalog.native.is_empty()
        || !catalog.mapping.is_empty()
        || !catalog.unmapped.is_empty()
        || !catalog.restricted.is_empty()
        || !catalog.models.is_empty()
        || !catalog.patterns.is_empty();

    if customised {
        println!("\nCatalog additions:");
        print_list("native", &catalog.native);
        print_list("unmapped", &catalog.unmapped);
        print_list("restricted", &catalog.restricted);
        for (from, to) in &catalog.mapping {
            println!("  mapping: {} -> {}", from, to);
        }
        for (alias, model) in &catalog.models {
            println!("  model: {} -> {}", alias, model);
        }
        for rule in &catalog.patterns {
            println!("  pattern {}: {}", rule.id, rule.pattern);
        }
    }

    Ok(())
}

fn print_list(label: &str, items: &[String]) {
    if !items.is_empty() {
        println!("  {}: {}", label, items.join(", "));
    }
}
