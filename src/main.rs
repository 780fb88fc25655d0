#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;

use droid_port::cli::{Cli, Commands};
use droid_port::commands;
use droid_port::config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let project_root = std::env::current_dir()?;

    match &cli.command {
        Commands::Analyze { paths, kind, json } => {
            let mut config = Config::load(&project_root)?;
            config.verbose = cli.verbose;
            commands::analyze::execute(&config, paths, kind.map(Into::into), *json)?;
        }
        Commands::Convert {
            path,
            kind,
            flags,
            output,
        } => {
            let config =
                Config::load(&project_root)?.with_convert_overrides(flags, cli.verbose);
            commands::convert::execute(&config, path, kind.map(Into::into), output.as_ref())?;
        }
        Commands::Plan {
            plugins,
            include_incompatible,
        } => {
            let config = Config::load(&project_root)?
                .with_plan_overrides(*include_incompatible, cli.verbose);
            commands::plan::execute(&config, plugins)?;
        }
        Commands::Config { command } => {
            commands::config::execute(command, &project_root)?;
        }
    }

    Ok(())
}

/// Logs go to stderr so converted output on stdout stays clean.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("droid_port={level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
