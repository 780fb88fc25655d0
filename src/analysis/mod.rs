//! Compatibility analysis of Claude Code artifacts against the Droid runtime.
//!
//! # Scoring
//!
//! Every artifact starts at 100. Each blocking issue costs 20 points and each
//! advisory warning costs 5; the result is clamped to `0..=100`. An artifact is
//! compatible when every declared tool resolves, with the single exception of
//! the soft-unmapped `AskUserQuestion` tool.

pub mod analyzer;
pub mod report;

pub use analyzer::Analyzer;
pub use report::{format_report, NamedResult, PluginAnalysis};

use crate::error::DroidPortError;
use serde::Serialize;

const ISSUE_PENALTY: usize = 20;
const WARNING_PENALTY: usize = 5;

pub const MISSING_SKILL_FILE: &str = "Missing SKILL.md file";

/// Outcome of analysing one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub compatible: bool,
    pub score: u8,
    /// Blocking problems
    pub issues: Vec<String>,
    /// Advisory problems
    pub warnings: Vec<String>,
    pub mapped_tools: Vec<String>,
    pub unmapped_tools: Vec<String>,
    /// MCP servers the converted artifact needs
    pub dependencies: Vec<String>,
    pub suggestions: Vec<String>,
}

impl AnalysisResult {
    /// Zero-score, incompatible result carrying a single issue.
    pub fn failed(issue: impl Into<String>) -> Self {
        Self {
            compatible: false,
            score: 0,
            issues: vec![issue.into()],
            warnings: Vec::new(),
            mapped_tools: Vec::new(),
            unmapped_tools: Vec::new(),
            dependencies: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn missing_skill_file() -> Self {
        Self::failed(MISSING_SKILL_FILE)
    }

    /// The issue reads `Failed to fetch content: <reason>`, naming the cause once.
    pub fn fetch_failed(error: &DroidPortError) -> Self {
        match error {
            DroidPortError::Fetch { reason, .. } => {
                Self::failed(format!("Failed to fetch content: {}", reason))
            }
            other => Self::failed(format!("Failed to fetch content: {}", other)),
        }
    }

    pub fn first_issue(&self) -> Option<&str> {
        self.issues.first().map(String::as_str)
    }
}

/// Score for the given finding counts.
pub fn score(issues: usize, warnings: usize) -> u8 {
    let penalty = issues
        .saturating_mul(ISSUE_PENALTY)
        .saturating_add(warnings.saturating_mul(WARNING_PENALTY));
    100usize.saturating_sub(penalty) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bounds() {
        assert_eq!(score(0, 0), 100);
        assert_eq!(score(1, 0), 80);
        assert_eq!(score(0, 1), 95);
        assert_eq!(score(2, 3), 45);
        assert_eq!(score(5, 0), 0);
        assert_eq!(score(50, 50), 0);
        assert_eq!(score(usize::MAX, usize::MAX), 0);
    }

    #[test]
    fn test_score_is_monotonic() {
        for issues in 0..8 {
            for warnings in 0..25 {
                assert!(score(issues + 1, warnings) <= score(issues, warnings));
                assert!(score(issues, warnings + 1) <= score(issues, warnings));
            }
        }
    }

    #[test]
    fn test_failed_result_shape() {
        let result = AnalysisResult::missing_skill_file();
        assert!(!result.compatible);
        assert_eq!(result.score, 0);
        assert_eq!(result.issues, vec![MISSING_SKILL_FILE]);
        assert!(result.warnings.is_empty());
        assert!(result.mapped_tools.is_empty());
    }

    #[test]
    fn test_fetch_failure_records_message() {
        let error = DroidPortError::RemoteUnsupported("https://example.com/x.md".to_string());
        let result = AnalysisResult::fetch_failed(&error);
        assert_eq!(result.score, 0);
        assert!(result.issues[0].starts_with("Failed to fetch content:"));
        assert!(result.issues[0].contains("https://example.com/x.md"));
    }

    #[test]
    fn test_fetch_error_reason_appears_once() {
        let error = DroidPortError::Fetch {
            locator: "/x".to_string(),
            reason: "404".to_string(),
        };
        let result = AnalysisResult::fetch_failed(&error);

        assert_eq!(result.issues, vec!["Failed to fetch content: 404"]);
        assert_eq!(result.issues[0].matches("fetch").count(), 1);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(AnalysisResult::failed("x")).unwrap();
        assert!(json.get("mappedTools").is_some());
        assert!(json.get("unmappedTools").is_some());
    }
}
