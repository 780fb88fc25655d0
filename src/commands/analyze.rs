use super::helpers::load_artifact;
use crate::analysis::{AnalysisResult, Analyzer};
use crate::artifact::{Artifact, ArtifactKind, LocalFetcher};
use crate::config::Config;
use crate::error::Result;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct AnalysisEntry<'a> {
    name: &'a str,
    kind: ArtifactKind,
    plugin: &'a str,
    #[serde(flatten)]
    result: &'a AnalysisResult,
}

pub fn execute(
    config: &Config,
    paths: &[PathBuf],
    kind: Option<ArtifactKind>,
    json: bool,
) -> Result<()> {
    let analyzer = Analyzer::new(config.catalog()?);

    let artifacts = paths
        .iter()
        .map(|path| load_artifact(path, kind))
        .collect::<Result<Vec<Artifact>>>()?;

    let results: Vec<AnalysisResult> = artifacts
        .iter()
        .map(|artifact| analyzer.analyze(artifact, &LocalFetcher))
        .collect();

    if json {
        let entries: Vec<_> = artifacts
            .iter()
            .zip(&results)
            .map(|(artifact, result)| AnalysisEntry {
                name: &artifact.name,
                kind: artifact.kind,
                plugin: &artifact.plugin,
                result,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for (i, (artifact, result)) in artifacts.iter().zip(&results).enumerate() {
        if i > 0 {
            println!();
        }
        print!("{}", render(artifact, result));
    }

    Ok(())
}

fn render(artifact: &Artifact, result: &AnalysisResult) -> String {
    let mut out = format!(
        "{} `{}`: {} (score {})\n",
        artifact.kind,
        artifact.name,
        if result.compatible {
            "compatible"
        } else {
            "incompatible"
        },
        result.score
    );

    if !result.mapped_tools.is_empty() {
        out.push_str(&format!("  tools: {}\n", result.mapped_tools.join(", ")));
    }
    if !result.unmapped_tools.is_empty() {
        out.push_str(&format!("  unmapped: {}\n", result.unmapped_tools.join(", ")));
    }
    for server in &result.dependencies {
        out.push_str(&format!("  requires MCP server: {}\n", server));
    }
    for issue in &result.issues {
        out.push_str(&format!("  ✗ {}\n", issue));
    }
    for warning in &result.warnings {
        out.push_str(&format!("  ! {}\n", warning));
    }
    for suggestion in &result.suggestions {
        out.push_str(&format!("  → {}\n", suggestion));
    }

    out
}
