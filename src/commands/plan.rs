use super::helpers::scan_plugin;
use crate::analysis::{format_report, AnalysisResult, Analyzer, NamedResult, PluginAnalysis};
use crate::artifact::{Artifact, ArtifactKind, LocalFetcher};
use crate::config::Config;
use crate::error::Result;
use crate::plan::InstallPlan;
use std::path::PathBuf;

const KINDS: [(ArtifactKind, &str); 3] = [
    (ArtifactKind::Droid, "droids"),
    (ArtifactKind::Command, "commands"),
    (ArtifactKind::Skill, "skills"),
];

pub fn execute(config: &Config, plugins: &[PathBuf]) -> Result<()> {
    let analyzer = Analyzer::new(config.catalog()?);
    let include_incompatible = config.convert.include_incompatible;

    let mut analyses = Vec::new();
    let mut plans = Vec::new();

    for root in plugins {
        let (plugin, artifacts) = scan_plugin(root)?;
        let results: Vec<AnalysisResult> = artifacts
            .iter()
            .map(|artifact| analyzer.analyze(artifact, &LocalFetcher))
            .collect();

        analyses.push(plugin_analysis(&plugin, &artifacts, &results));
        plans.push((
            plugin,
            InstallPlan::build(&artifacts, &results, include_incompatible),
        ));
    }

    print!("{}", format_report(&analyses));
    println!();
    print!("{}", format_plan(&plans, include_incompatible));

    Ok(())
}

fn plugin_analysis(plugin: &str, artifacts: &[Artifact], results: &[AnalysisResult]) -> PluginAnalysis {
    let mut analysis = PluginAnalysis::new(plugin);
    for (artifact, result) in artifacts.iter().zip(results) {
        analysis.push(artifact.kind, NamedResult::new(&artifact.name, result.clone()));
    }
    analysis
}

fn format_plan(plans: &[(String, InstallPlan)], include_incompatible: bool) -> String {
    let mut out = String::new();

    out.push_str("Install plan\n");
    out.push_str("============\n");
    if include_incompatible {
        out.push_str("(including incompatible artifacts)\n");
    }

    for (plugin, plan) in plans {
        out.push_str(&format!("\nPlugin: {}\n", plugin));
        for (kind, label) in KINDS {
            let selection = plan.selection(kind);
            if !selection.selected.is_empty() {
                out.push_str(&format!(
                    "  install {}: {}\n",
                    label,
                    selection.selected_names().join(", ")
                ));
            }
            if !selection.excluded.is_empty() {
                out.push_str(&format!("  skip {}: {}\n", label, selection.excluded.join(", ")));
            }
        }
    }

    let selected: usize = plans.iter().map(|(_, p)| p.selected_count()).sum();
    let excluded: usize = plans.iter().map(|(_, p)| p.excluded_count()).sum();
    out.push_str(&format!("\n{} to install, {} skipped\n", selected, excluded));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactSource;

    #[test]
    fn test_format_plan() {
        let artifacts = [
            Artifact::new("a", ArtifactKind::Droid, "kit", ArtifactSource::local("/a.md")),
            Artifact::new("b", ArtifactKind::Droid, "kit", ArtifactSource::local("/b.md")),
        ];
        let results = [
            Analyzer::default().analyze_text(ArtifactKind::Droid, "---\nname: a\ndescription: d\n---\n"),
            AnalysisResult::failed("Tool 'NotebookEdit' has no Droid equivalent"),
        ];

        let plans = vec![(
            "kit".to_string(),
            InstallPlan::build(&artifacts, &results, false),
        )];
        let text = format_plan(&plans, false);

        assert!(text.contains("Plugin: kit\n  install droids: a\n  skip droids: b\n"));
        assert!(text.ends_with("1 to install, 1 skipped\n"));
    }

    #[test]
    fn test_plugin_analysis_groups_by_kind() {
        let artifacts = [
            Artifact::new("a", ArtifactKind::Command, "kit", ArtifactSource::local("/a.md")),
            Artifact::new("s", ArtifactKind::Skill, "kit", ArtifactSource::local("/s")),
        ];
        let results = [
            AnalysisResult::failed("x"),
            AnalysisResult::missing_skill_file(),
        ];

        let analysis = plugin_analysis("kit", &artifacts, &results);
        assert_eq!(analysis.commands.len(), 1);
        assert_eq!(analysis.skills[0].name, "s");
        assert!(analysis.droids.is_empty());
    }
}
