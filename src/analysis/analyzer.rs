use super::{score, AnalysisResult};
use crate::artifact::{Artifact, ArtifactKind, ContentFetcher, SkillFile};
use crate::catalog::Catalog;
use crate::metadata::{self, MetadataBlock};
use crate::resolver::ToolResolver;

/// Runs compatibility checks using one [`Catalog`].
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    catalog: Catalog,
}

/// Findings accumulated while analysing one artifact.
#[derive(Debug, Default)]
struct Findings {
    issues: Vec<String>,
    warnings: Vec<String>,
    suggestions: Vec<String>,
}

impl Findings {
    fn issue(&mut self, message: impl Into<String>) {
        self.issues.push(message.into());
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    fn suggest(&mut self, message: impl Into<String>) {
        self.suggestions.push(message.into());
    }
}

impl Analyzer {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Analyse any artifact, dispatching on its kind. Never fails.
    pub fn analyze(&self, artifact: &Artifact, fetcher: &dyn ContentFetcher) -> AnalysisResult {
        match artifact.kind {
            ArtifactKind::Droid => self.analyze_droid(artifact, fetcher),
            ArtifactKind::Command => self.analyze_command(artifact, fetcher),
            ArtifactKind::Skill => self.analyze_skill(artifact, fetcher),
        }
    }

    pub fn analyze_droid(&self, artifact: &Artifact, fetcher: &dyn ContentFetcher) -> AnalysisResult {
        self.fetch_and_analyze(ArtifactKind::Droid, artifact, fetcher)
    }

    pub fn analyze_command(
        &self,
        artifact: &Artifact,
        fetcher: &dyn ContentFetcher,
    ) -> AnalysisResult {
        self.fetch_and_analyze(ArtifactKind::Command, artifact, fetcher)
    }

    /// Skills are analysed through their main file; without one there is
    /// nothing to check.
    pub fn analyze_skill(&self, artifact: &Artifact, fetcher: &dyn ContentFetcher) -> AnalysisResult {
        let Some(main) = self.find_skill_main(&artifact.files) else {
            tracing::info!(skill = %artifact.name, "skill has no main file");
            return AnalysisResult::missing_skill_file();
        };

        match fetcher.fetch(&main.source) {
            Ok(text) => self.analyze_text(ArtifactKind::Skill, &text),
            Err(e) => {
                tracing::warn!(skill = %artifact.name, error = %e, "fetch failed");
                AnalysisResult::fetch_failed(&e)
            }
        }
    }

    /// The skill's main file, matched case-insensitively by file name.
    pub fn find_skill_main<'f>(&self, files: &'f [SkillFile]) -> Option<&'f SkillFile> {
        files
            .iter()
            .find(|file| self.catalog.is_skill_main_file(file.file_name()))
    }

    fn fetch_and_analyze(
        &self,
        kind: ArtifactKind,
        artifact: &Artifact,
        fetcher: &dyn ContentFetcher,
    ) -> AnalysisResult {
        match fetcher.fetch(&artifact.source) {
            Ok(text) => {
                let result = self.analyze_text(kind, &text);
                tracing::debug!(
                    kind = %kind,
                    name = %artifact.name,
                    score = result.score,
                    compatible = result.compatible,
                    "analysed"
                );
                result
            }
            Err(e) => {
                tracing::warn!(kind = %kind, name = %artifact.name, error = %e, "fetch failed");
                AnalysisResult::fetch_failed(&e)
            }
        }
    }

    /// Analyse already-fetched text as an artifact of `kind`.
    pub fn analyze_text(&self, kind: ArtifactKind, text: &str) -> AnalysisResult {
        let block = metadata::split(text);
        let mut findings = Findings::default();

        self.check_metadata(kind, &block, &mut findings);

        let resolver = ToolResolver::new(&self.catalog);
        let resolved = resolver.resolve_all(block.token_list(kind.tools_field()));

        for token in &resolved.unmapped {
            if resolver.is_soft_unmapped(token) {
                findings.warn(format!(
                    "{} is not available in Droid; questions are asked conversationally instead",
                    token
                ));
                findings.suggest(format!(
                    "Remove {} from the tool list and ask the user directly",
                    token
                ));
            } else {
                findings.issue(format!("Tool '{}' has no Droid equivalent", token));
            }
        }

        // Droid has no restriction syntax; the qualifier is dropped without penalty
        for restricted in resolved.restricted() {
            if let Some(target) = &restricted.target {
                tracing::debug!(token = %restricted.token, target = %target, "restriction dropped");
            }
        }

        for rule in &self.catalog.legacy_patterns {
            if rule.matches(&block.body) {
                findings.warn(rule.warning.clone());
                if let Some(suggestion) = &rule.suggestion {
                    findings.suggest(suggestion.clone());
                }
            }
        }

        let compatible = resolved
            .unmapped
            .iter()
            .all(|token| resolver.is_soft_unmapped(token));

        AnalysisResult {
            compatible,
            score: score(findings.issues.len(), findings.warnings.len()),
            issues: findings.issues,
            warnings: findings.warnings,
            mapped_tools: resolved.tools,
            unmapped_tools: resolved.unmapped,
            dependencies: resolved.dependencies,
            suggestions: findings.suggestions,
        }
    }

    fn check_metadata(&self, kind: ArtifactKind, block: &MetadataBlock, findings: &mut Findings) {
        if block.is_salvaged() {
            findings.warn(format!(
                "Frontmatter is not valid YAML; recovered {} field(s) by line scan",
                block.fields.len()
            ));
        }

        // Command names come from the file name
        if kind != ArtifactKind::Command && block.scalar("name").is_none() {
            findings.issue("Missing required field: name");
        }

        if block.scalar("description").is_none() {
            findings.warn("Missing description");
        }

        if kind == ArtifactKind::Droid {
            if let Some(model) = block.scalar("model") {
                if self.catalog.map_model(&model).is_none() {
                    findings.warn(format!(
                        "Model '{}' is not a known alias and is kept verbatim",
                        model
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactSource;
    use crate::error::{DroidPortError, Result};

    fn analyze(kind: ArtifactKind, text: &str) -> AnalysisResult {
        Analyzer::default().analyze_text(kind, text)
    }

    #[test]
    fn test_clean_droid_scores_100() {
        let result = analyze(
            ArtifactKind::Droid,
            "---\nname: reviewer\ndescription: Reviews code\ntools: Read, Grep\n---\nReview it.\n",
        );

        assert!(result.compatible);
        assert_eq!(result.score, 100);
        assert!(result.issues.is_empty());
        assert!(result.warnings.is_empty());
        assert_eq!(result.mapped_tools, vec!["Read", "Grep"]);
    }

    #[test]
    fn test_unmapped_tool_is_blocking() {
        let result = analyze(
            ArtifactKind::Droid,
            "---\nname: nb\ndescription: Notebooks\ntools: Read, NotebookEdit\n---\n",
        );

        assert!(!result.compatible);
        assert_eq!(result.issues, vec!["Tool 'NotebookEdit' has no Droid equivalent"]);
        assert_eq!(result.unmapped_tools, vec!["NotebookEdit"]);
        assert_eq!(result.score, 80);
    }

    #[test]
    fn test_soft_unmapped_alone_keeps_compatibility() {
        let base = "---\nname: a\ndescription: d\ntools: Read\n---\n";
        let with_soft = "---\nname: a\ndescription: d\ntools: Read, AskUserQuestion\n---\n";

        let before = analyze(ArtifactKind::Droid, base);
        let after = analyze(ArtifactKind::Droid, with_soft);

        assert!(after.compatible);
        assert_eq!(after.issues.len(), before.issues.len());
        assert_eq!(after.warnings.len(), before.warnings.len() + 1);
        assert_eq!(after.suggestions.len(), before.suggestions.len() + 1);
        assert_eq!(after.unmapped_tools, vec!["AskUserQuestion"]);
    }

    #[test]
    fn test_command_does_not_require_name() {
        let result = analyze(ArtifactKind::Command, "---\ndescription: Commit\n---\nDo it\n");
        assert!(result.issues.is_empty());
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_command_uses_allowed_tools() {
        let result = analyze(
            ArtifactKind::Command,
            "---\ndescription: Commit\nallowed-tools: Bash(git add:*), Bash(git commit:*)\n---\n",
        );
        assert_eq!(result.mapped_tools, vec!["Execute"]);
        assert!(result.warnings.is_empty());
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_restricted_tool_does_not_lower_score() {
        let result = analyze(
            ArtifactKind::Command,
            "---\ndescription: Commit\nallowed-tools: Bash(git add:*)\n---\nCommit.\n",
        );

        assert!(result.compatible);
        assert!(result.issues.is_empty());
        assert!(result.warnings.is_empty());
        assert_eq!(result.score, 100);
        assert_eq!(result.mapped_tools, vec!["Execute"]);
    }

    #[test]
    fn test_skill_missing_name_is_issue() {
        let result = analyze(ArtifactKind::Skill, "---\ndescription: PDFs\n---\n");
        assert_eq!(result.issues, vec!["Missing required field: name"]);
        assert!(result.compatible);
        assert_eq!(result.score, 80);
    }

    #[test]
    fn test_salvaged_frontmatter_warns_and_continues() {
        let result = analyze(
            ArtifactKind::Droid,
            "---\nname: helper\ndescription: Use when: asked\ntools: Bash\n---\n",
        );

        assert!(result.warnings[0].contains("not valid YAML"));
        assert!(result.issues.is_empty());
        assert_eq!(result.mapped_tools, vec!["Execute"]);
    }

    #[test]
    fn test_legacy_patterns_add_warnings_and_suggestions() {
        let result = analyze(
            ArtifactKind::Command,
            "---\ndescription: d\n---\nagent reviewer --strict\nRun ${CLAUDE_PLUGIN_ROOT}/x.sh\n",
        );

        assert_eq!(result.warnings.len(), 2);
        assert_eq!(result.suggestions.len(), 2);
        assert_eq!(result.score, 90);
    }

    #[test]
    fn test_unknown_model_warns() {
        let result = analyze(
            ArtifactKind::Droid,
            "---\nname: a\ndescription: d\nmodel: gpt-5\n---\n",
        );
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("gpt-5"));

        let alias = analyze(
            ArtifactKind::Droid,
            "---\nname: a\ndescription: d\nmodel: sonnet\n---\n",
        );
        assert!(alias.warnings.is_empty());
    }

    #[test]
    fn test_fetch_failure_is_contained() {
        let artifact = Artifact::new(
            "broken",
            ArtifactKind::Droid,
            "plugin",
            ArtifactSource::remote("https://example.com/agents/broken.md"),
        );
        let fetcher = |_: &ArtifactSource| -> Result<String> {
            Err(DroidPortError::Fetch {
                locator: "https://example.com/agents/broken.md".to_string(),
                reason: "404".to_string(),
            })
        };

        let result = Analyzer::default().analyze(&artifact, &fetcher);
        assert!(!result.compatible);
        assert_eq!(result.score, 0);
        assert_eq!(result.issues.len(), 1);
        assert!(result.issues[0].contains("404"));
    }

    #[test]
    fn test_skill_main_file_lookup() {
        let files = vec![
            SkillFile {
                path: "reference.md".to_string(),
                source: ArtifactSource::local("/s/reference.md"),
            },
            SkillFile {
                path: "skill.md".to_string(),
                source: ArtifactSource::local("/s/skill.md"),
            },
        ];

        let analyzer = Analyzer::default();
        let main = analyzer.find_skill_main(&files).unwrap();
        assert_eq!(main.path, "skill.md");
        assert!(analyzer.find_skill_main(&files[..1]).is_none());
    }
}
