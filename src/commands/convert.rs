use super::helpers::load_artifact;
use crate::analysis::Analyzer;
use crate::artifact::{ArtifactKind, ContentFetcher, LocalFetcher};
use crate::config::Config;
use crate::convert::Converter;
use crate::error::{DroidPortError, Result};
use std::path::{Path, PathBuf};

pub fn execute(
    config: &Config,
    path: &Path,
    kind: Option<ArtifactKind>,
    output: Option<&PathBuf>,
) -> Result<()> {
    let artifact = load_artifact(path, kind)?;
    let catalog = config.catalog()?;

    let source = match artifact.kind {
        ArtifactKind::Skill => Analyzer::new(catalog.clone())
            .find_skill_main(&artifact.files)
            .map(|main| main.source.clone())
            .ok_or_else(|| DroidPortError::MissingSkillFile(path.to_path_buf()))?,
        _ => artifact.source.clone(),
    };

    let text = LocalFetcher.fetch(&source)?;
    let converter = Converter::new(catalog, config.convert_options());
    let conversion = converter.convert(artifact.kind, &artifact.name, &text);

    if !conversion.converted {
        eprintln!(
            "Warning: frontmatter of {} is not valid YAML; output is the original text",
            path.display()
        );
    }
    for token in &conversion.tools.unmapped {
        eprintln!("Warning: dropped tool '{}' (no Droid equivalent)", token);
    }
    if let Some(normalized) = &conversion.normalized {
        for note in &normalized.notes {
            tracing::info!(artifact = %artifact.name, "{}", note);
        }
        for droid in &normalized.unresolved_droids {
            eprintln!("Note: droid `{}` is referenced but not known to exist", droid);
        }
        for skill in &normalized.unresolved_skills {
            eprintln!("Note: skill `{}` is referenced but not known to exist", skill);
        }
    }

    match output {
        Some(target) => {
            if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(target, &conversion.text)?;
            println!("Wrote {} {} to {}", artifact.kind, artifact.name, target.display());
        }
        None => print!("{}", conversion.text),
    }

    Ok(())
}
