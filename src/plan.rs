//! Selecting which artifacts get installed.
//!
//! Artifacts are paired with their analysis results positionally. The filter
//! functions below work on iterators of those pairs and can be chained.

use crate::analysis::AnalysisResult;
use crate::artifact::{Artifact, ArtifactKind};
use serde::Serialize;

/// An artifact with its analysis result, if one was produced.
pub type Analysed<'a> = (&'a Artifact, Option<&'a AnalysisResult>);

/// Pair artifacts with results by position. Artifacts past the end of
/// `results` get `None`.
pub fn pair_results<'a>(
    artifacts: &'a [Artifact],
    results: &'a [AnalysisResult],
) -> impl Iterator<Item = Analysed<'a>> + 'a {
    artifacts
        .iter()
        .enumerate()
        .map(move |(i, artifact)| (artifact, results.get(i)))
}

/// Keep only artifacts whose analysis says they are compatible.
///
/// Artifacts without a result are dropped.
pub fn filter_compatible<'a>(
    entries: impl Iterator<Item = Analysed<'a>> + 'a,
) -> impl Iterator<Item = Analysed<'a>> + 'a {
    entries.filter(|(_, result)| is_compatible(*result))
}

/// Inverse of [`filter_compatible`].
pub fn exclude_compatible<'a>(
    entries: impl Iterator<Item = Analysed<'a>> + 'a,
) -> impl Iterator<Item = Analysed<'a>> + 'a {
    entries.filter(|(_, result)| !is_compatible(*result))
}

/// Keep only artifacts of one kind.
pub fn filter_kind<'a>(
    entries: impl Iterator<Item = Analysed<'a>> + 'a,
    kind: ArtifactKind,
) -> impl Iterator<Item = Analysed<'a>> + 'a {
    entries.filter(move |(artifact, _)| artifact.kind == kind)
}

fn is_compatible(result: Option<&AnalysisResult>) -> bool {
    result.map(|r| r.compatible).unwrap_or(false)
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Selection {
    #[serde(serialize_with = "serialize_names")]
    pub selected: Vec<Artifact>,
    pub excluded: Vec<String>,
}

impl Selection {
    pub fn selected_names(&self) -> Vec<&str> {
        self.selected.iter().map(|a| a.name.as_str()).collect()
    }
}

fn serialize_names<S: serde::Serializer>(
    artifacts: &[Artifact],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(artifacts.iter().map(|a| a.name.as_str()))
}

/// Split artifacts into those to install and the names of those left out.
///
/// With `include_incompatible` every artifact is selected.
pub fn select(
    artifacts: &[Artifact],
    results: &[AnalysisResult],
    include_incompatible: bool,
) -> Selection {
    if include_incompatible {
        return Selection {
            selected: artifacts.to_vec(),
            excluded: Vec::new(),
        };
    }

    Selection {
        selected: filter_compatible(pair_results(artifacts, results))
            .map(|(artifact, _)| artifact.clone())
            .collect(),
        excluded: exclude_compatible(pair_results(artifacts, results))
            .map(|(artifact, _)| artifact.name.clone())
            .collect(),
    }
}

/// Per-kind selections for one install run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InstallPlan {
    pub droids: Selection,
    pub commands: Selection,
    pub skills: Selection,
}

impl InstallPlan {
    /// Build a plan from artifacts of any kind and their positional results.
    pub fn build(
        artifacts: &[Artifact],
        results: &[AnalysisResult],
        include_incompatible: bool,
    ) -> Self {
        let by_kind = |kind: ArtifactKind| {
            let (items, matched): (Vec<Artifact>, Vec<Option<AnalysisResult>>) =
                filter_kind(pair_results(artifacts, results), kind)
                    .map(|(artifact, result)| (artifact.clone(), result.cloned()))
                    .unzip();
            let present: Vec<AnalysisResult> = matched.iter().map_while(|r| r.clone()).collect();
            select(&items, &present, include_incompatible)
        };

        Self {
            droids: by_kind(ArtifactKind::Droid),
            commands: by_kind(ArtifactKind::Command),
            skills: by_kind(ArtifactKind::Skill),
        }
    }

    pub fn selection(&self, kind: ArtifactKind) -> &Selection {
        match kind {
            ArtifactKind::Droid => &self.droids,
            ArtifactKind::Command => &self.commands,
            ArtifactKind::Skill => &self.skills,
        }
    }

    pub fn selected_count(&self) -> usize {
        self.droids.selected.len() + self.commands.selected.len() + self.skills.selected.len()
    }

    pub fn excluded_count(&self) -> usize {
        self.droids.excluded.len() + self.commands.excluded.len() + self.skills.excluded.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactSource;

    fn artifact(name: &str, kind: ArtifactKind) -> Artifact {
        Artifact::new(
            name,
            kind,
            "plugin",
            ArtifactSource::local(format!("/p/{}.md", name)),
        )
    }

    fn result(compatible: bool) -> AnalysisResult {
        if compatible {
            AnalysisResult {
                compatible: true,
                score: 100,
                issues: vec![],
                warnings: vec![],
                mapped_tools: vec![],
                unmapped_tools: vec![],
                dependencies: vec![],
                suggestions: vec![],
            }
        } else {
            AnalysisResult::failed("Tool 'NotebookEdit' has no Droid equivalent")
        }
    }

    #[test]
    fn test_select_compatible_only() {
        let artifacts = [
            artifact("a", ArtifactKind::Droid),
            artifact("b", ArtifactKind::Droid),
            artifact("c", ArtifactKind::Droid),
        ];
        let results = [result(true), result(false), result(true)];

        let selection = select(&artifacts, &results, false);
        assert_eq!(selection.selected_names(), vec!["a", "c"]);
        assert_eq!(selection.excluded, vec!["b"]);
    }

    #[test]
    fn test_select_override_takes_everything() {
        let artifacts = [
            artifact("a", ArtifactKind::Command),
            artifact("b", ArtifactKind::Command),
        ];
        let results = [result(false)];

        let selection = select(&artifacts, &results, true);
        assert_eq!(selection.selected_names(), vec!["a", "b"]);
        assert!(selection.excluded.is_empty());
    }

    #[test]
    fn test_missing_result_is_excluded() {
        let artifacts = [
            artifact("a", ArtifactKind::Skill),
            artifact("b", ArtifactKind::Skill),
        ];
        let results = [result(true)];

        let selection = select(&artifacts, &results, false);
        assert_eq!(selection.selected_names(), vec!["a"]);
        assert_eq!(selection.excluded, vec!["b"]);
    }

    #[test]
    fn test_filters_chain() {
        let artifacts = [
            artifact("d", ArtifactKind::Droid),
            artifact("c", ArtifactKind::Command),
        ];
        let results = [result(true), result(true)];

        let droids: Vec<_> = filter_compatible(filter_kind(
            pair_results(&artifacts, &results),
            ArtifactKind::Droid,
        ))
        .collect();
        assert_eq!(droids.len(), 1);
        assert_eq!(droids[0].0.name, "d");
    }

    #[test]
    fn test_install_plan_per_kind() {
        let artifacts = [
            artifact("reviewer", ArtifactKind::Droid),
            artifact("notebook", ArtifactKind::Droid),
            artifact("commit", ArtifactKind::Command),
            artifact("pdf", ArtifactKind::Skill),
        ];
        let results = [result(true), result(false), result(true), result(false)];

        let plan = InstallPlan::build(&artifacts, &results, false);
        assert_eq!(plan.droids.selected_names(), vec!["reviewer"]);
        assert_eq!(plan.droids.excluded, vec!["notebook"]);
        assert_eq!(plan.commands.selected_names(), vec!["commit"]);
        assert_eq!(plan.skills.excluded, vec!["pdf"]);
        assert_eq!(plan.selected_count(), 2);
        assert_eq!(plan.excluded_count(), 2);

        let all = InstallPlan::build(&artifacts, &results, true);
        assert_eq!(all.excluded_count(), 0);
        assert_eq!(all.selection(ArtifactKind::Skill).selected_names(), vec!["pdf"]);
    }

    #[test]
    fn test_install_plan_short_results() {
        let artifacts = [
            artifact("a", ArtifactKind::Droid),
            artifact("b", ArtifactKind::Droid),
        ];
        let plan = InstallPlan::build(&artifacts, &[result(true)], false);
        assert_eq!(plan.droids.selected_names(), vec!["a"]);
        assert_eq!(plan.droids.excluded, vec!["b"]);
    }
}
