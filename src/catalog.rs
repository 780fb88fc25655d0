//! Static vocabulary shared by the resolver, analyzer and normalizer.
//!
//! Everything that must stay in lockstep lives in one [`Catalog`] value:
//! the Droid tool set, the Claude Code to Droid mapping (including deliberate
//! `None` entries for tools with no equivalent), the MCP passthrough prefix,
//! the pattern-restricted tool names, model aliases, and the legacy body
//! patterns. Configuration can extend or override any table.

use crate::config::CatalogConfig;
use crate::error::{DroidPortError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

/// Tools a Droid understands natively.
const DROID_TOOLS: &[&str] = &[
    "Read",
    "LS",
    "Grep",
    "Glob",
    "Create",
    "Edit",
    "MultiEdit",
    "ApplyPatch",
    "Execute",
    "WebSearch",
    "FetchUrl",
    "TodoWrite",
    "Task",
    "Skill",
];

/// Claude Code tool names and their Droid counterparts.
const TOOL_MAPPING: &[(&str, Option<&str>)] = &[
    ("Bash", Some("Execute")),
    ("Write", Some("Create")),
    ("WebFetch", Some("FetchUrl")),
    ("NotebookRead", Some("Read")),
    ("Agent", Some("Task")),
    ("NotebookEdit", None),
    ("BashOutput", None),
    ("KillShell", None),
    ("KillBash", None),
    ("SlashCommand", None),
    ("ExitPlanMode", None),
    ("AskUserQuestion", None),
];

/// Tools that accept a `Name(pattern)` restriction in Claude Code.
const RESTRICTED_TOOLS: &[&str] = &["Bash", "Execute"];

const MODEL_ALIASES: &[(&str, &str)] = &[
    ("inherit", "inherit"),
    ("sonnet", "inherit"),
    ("opus", "inherit"),
    ("haiku", "inherit"),
];

const SKILL_MAIN_FILES: &[&str] = &["SKILL.md", "SKILL.markdown"];

pub const MCP_PREFIX: &str = "mcp";

/// The interactive question tool. Droids ask questions conversationally, so
/// losing it is advisory rather than blocking.
pub const SOFT_UNMAPPED_TOOL: &str = "AskUserQuestion";

/// Ids of the legacy rules the normalizer knows how to rewrite.
pub const ASK_USER_RULE: &str = "ask-user";
pub const AGENT_SHORTHAND_RULE: &str = "agent-shorthand";
pub const SKILL_SHORTHAND_RULE: &str = "skill-shorthand";

/// A body-text convention from Claude Code with a known Droid rewrite or caveat.
#[derive(Debug, Clone)]
pub struct LegacyPatternRule {
    pub id: String,
    pub pattern: Regex,
    pub warning: String,
    pub suggestion: Option<String>,
}

impl LegacyPatternRule {
    pub fn new(
        id: &str,
        pattern: &str,
        warning: &str,
        suggestion: Option<&str>,
    ) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| {
            DroidPortError::InvalidConfig(format!("Invalid pattern for rule '{}': {}", id, e))
        })?;
        Ok(Self {
            id: id.to_string(),
            pattern,
            warning: warning.to_string(),
            suggestion: suggestion.map(str::to_string),
        })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

static BUILTIN_PATTERNS: Lazy<Vec<LegacyPatternRule>> = Lazy::new(|| {
    let rules = [
        (
            ASK_USER_RULE,
            r"(?i)\bAskUserQuestion\b",
            "References AskUserQuestion, which Droids do not provide",
            Some("Ask the user directly in conversation instead of calling AskUserQuestion"),
        ),
        (
            AGENT_SHORTHAND_RULE,
            r"(?m)^[ \t]*agent[ \t]+\S+",
            "Uses the legacy `agent <name>` invocation shorthand",
            Some("Delegate with the Task tool and name the target droid"),
        ),
        (
            SKILL_SHORTHAND_RULE,
            r"(?m)^[ \t]*skill[ \t]+\S+",
            "Uses the legacy `skill <name>` invocation shorthand",
            Some("Invoke the skill through the Skill tool"),
        ),
        (
            "plugin-root",
            r"\$\{?CLAUDE_PLUGIN_ROOT\}?",
            "References CLAUDE_PLUGIN_ROOT, which Droid does not set",
            Some("Replace plugin-root paths with paths under .factory/"),
        ),
        (
            "claude-dir",
            r#"(?:^|[\s`'"(])(?:~/)?\.claude/"#,
            "References .claude/ paths",
            Some("Point at the equivalent .factory/ location"),
        ),
    ];

    rules
        .iter()
        .map(|(id, pattern, warning, suggestion)| {
            LegacyPatternRule::new(id, pattern, warning, *suggestion)
                .expect("built-in legacy patterns compile")
        })
        .collect()
});

#[derive(Debug, Clone)]
pub struct Catalog {
    pub native: BTreeSet<String>,
    pub mapping: BTreeMap<String, Option<String>>,
    pub restricted: BTreeSet<String>,
    pub passthrough_prefix: String,
    pub soft_unmapped: String,
    pub models: BTreeMap<String, String>,
    pub skill_main_files: Vec<String>,
    pub legacy_patterns: Vec<LegacyPatternRule>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// The catalog matching current Claude Code and Droid tool sets.
    pub fn builtin() -> Self {
        Self {
            native: DROID_TOOLS.iter().map(|t| t.to_string()).collect(),
            mapping: TOOL_MAPPING
                .iter()
                .map(|(from, to)| (from.to_string(), to.map(str::to_string)))
                .collect(),
            restricted: RESTRICTED_TOOLS.iter().map(|t| t.to_string()).collect(),
            passthrough_prefix: MCP_PREFIX.to_string(),
            soft_unmapped: SOFT_UNMAPPED_TOOL.to_string(),
            models: MODEL_ALIASES
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
            skill_main_files: SKILL_MAIN_FILES.iter().map(|f| f.to_string()).collect(),
            legacy_patterns: BUILTIN_PATTERNS.clone(),
        }
    }

    /// Layer configuration on top of this catalog.
    pub fn with_overrides(mut self, config: &CatalogConfig) -> Result<Self> {
        for tool in &config.native {
            self.native.insert(tool.clone());
        }
        for (from, to) in &config.mapping {
            let to = to.trim();
            if to.is_empty() {
                return Err(DroidPortError::InvalidConfig(format!(
                    "Mapping for '{}' is empty; list it under catalog.unmapped instead",
                    from
                )));
            }
            self.mapping.insert(from.clone(), Some(to.to_string()));
        }
        for tool in &config.unmapped {
            self.mapping.insert(tool.clone(), None);
        }
        for tool in &config.restricted {
            self.restricted.insert(tool.clone());
        }
        for (alias, model) in &config.models {
            self.models.insert(alias.clone(), model.clone());
        }
        for rule in &config.patterns {
            self.legacy_patterns.push(LegacyPatternRule::new(
                &rule.id,
                &rule.pattern,
                &rule.warning,
                rule.suggestion.as_deref(),
            )?);
        }
        Ok(self)
    }

    pub fn is_native(&self, tool: &str) -> bool {
        self.native.contains(tool)
    }

    pub fn is_restricted(&self, tool: &str) -> bool {
        self.restricted.contains(tool)
    }

    /// `None` when the tool is absent; `Some(None)` when mapped to nothing.
    pub fn lookup(&self, tool: &str) -> Option<Option<&str>> {
        self.mapping.get(tool).map(|target| target.as_deref())
    }

    pub fn is_soft_unmapped(&self, tool: &str) -> bool {
        self.soft_unmapped == tool
    }

    /// Droid model for a Claude Code model value, if it is a known alias.
    pub fn map_model(&self, model: &str) -> Option<&str> {
        self.models.get(model).map(String::as_str)
    }

    pub fn has_legacy_rule(&self, id: &str) -> bool {
        self.legacy_patterns.iter().any(|rule| rule.id == id)
    }

    pub fn is_skill_main_file(&self, file_name: &str) -> bool {
        self.skill_main_files
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(file_name))
    }
}
