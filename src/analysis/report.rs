//! Batch report over already-computed analysis results.

use super::AnalysisResult;
use crate::artifact::ArtifactKind;
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
pub struct NamedResult {
    pub name: String,
    pub result: AnalysisResult,
}

impl NamedResult {
    pub fn new(name: impl Into<String>, result: AnalysisResult) -> Self {
        Self {
            name: name.into(),
            result,
        }
    }
}

/// Analysis results for every artifact of one plugin.
#[derive(Debug, Clone, Default)]
pub struct PluginAnalysis {
    pub plugin: String,
    pub droids: Vec<NamedResult>,
    pub commands: Vec<NamedResult>,
    pub skills: Vec<NamedResult>,
}

impl PluginAnalysis {
    pub fn new(plugin: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            ..Default::default()
        }
    }

    pub fn results(&self, kind: ArtifactKind) -> &[NamedResult] {
        match kind {
            ArtifactKind::Droid => &self.droids,
            ArtifactKind::Command => &self.commands,
            ArtifactKind::Skill => &self.skills,
        }
    }

    pub fn push(&mut self, kind: ArtifactKind, entry: NamedResult) {
        match kind {
            ArtifactKind::Droid => self.droids.push(entry),
            ArtifactKind::Command => self.commands.push(entry),
            ArtifactKind::Skill => self.skills.push(entry),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub total: usize,
    pub compatible: usize,
}

impl Counts {
    fn of(results: &[NamedResult]) -> Self {
        Self {
            total: results.len(),
            compatible: results.iter().filter(|r| r.result.compatible).count(),
        }
    }

    fn add(self, other: Self) -> Self {
        Self {
            total: self.total + other.total,
            compatible: self.compatible + other.compatible,
        }
    }
}

const KINDS: [(ArtifactKind, &str); 3] = [
    (ArtifactKind::Droid, "Droids"),
    (ArtifactKind::Command, "Commands"),
    (ArtifactKind::Skill, "Skills"),
];

/// Per-kind counts summed across plugins.
pub fn overall_counts(plugins: &[PluginAnalysis], kind: ArtifactKind) -> Counts {
    plugins
        .iter()
        .map(|p| Counts::of(p.results(kind)))
        .fold(Counts::default(), Counts::add)
}

/// Sorted, unique MCP servers required anywhere in the batch.
pub fn required_dependencies(plugins: &[PluginAnalysis]) -> Vec<String> {
    let mut servers = BTreeSet::new();
    for plugin in plugins {
        for (kind, _) in KINDS {
            for entry in plugin.results(kind) {
                servers.extend(entry.result.dependencies.iter().cloned());
            }
        }
    }
    servers.into_iter().collect()
}

/// Render the operator-facing compatibility report.
pub fn format_report(plugins: &[PluginAnalysis]) -> String {
    let mut out = String::new();

    out.push_str("Compatibility report\n");
    out.push_str("====================\n");

    for plugin in plugins {
        out.push_str(&format!("\nPlugin: {}\n", plugin.plugin));
        for (kind, label) in KINDS {
            let counts = Counts::of(plugin.results(kind));
            write_counts(&mut out, label, counts);
        }
    }

    out.push_str("\nOverall:\n");
    for (kind, label) in KINDS {
        write_counts(&mut out, label, overall_counts(plugins, kind));
    }

    let dependencies = required_dependencies(plugins);
    if !dependencies.is_empty() {
        out.push_str("\nRequired MCP servers:\n");
        for server in &dependencies {
            out.push_str(&format!("  - {}\n", server));
        }
    }

    let mut incompatible = Vec::new();
    for plugin in plugins {
        for (kind, _) in KINDS {
            for entry in plugin.results(kind) {
                if !entry.result.compatible {
                    incompatible.push(format!(
                        "  - {} {} `{}`: {}",
                        plugin.plugin,
                        kind,
                        entry.name,
                        entry.result.first_issue().unwrap_or("no issue recorded")
                    ));
                }
            }
        }
    }

    if !incompatible.is_empty() {
        out.push_str("\nIncompatible:\n");
        for line in incompatible {
            out.push_str(&format!("{}\n", line));
        }
    }

    out
}

fn write_counts(out: &mut String, label: &str, counts: Counts) {
    out.push_str(&format!(
        "  {:<9} {}/{} compatible\n",
        format!("{}:", label),
        counts.compatible,
        counts.total
    ));
}
