//! Rewrites Claude Code body conventions into Droid phrasing.
//!
//! Three rewrites run in a fixed order:
//!
//! 1. `AskUserQuestion` usage becomes a plain instruction to ask the user.
//! 2. Line-leading `agent <name> ...` becomes Task tool delegation.
//! 3. Line-leading `skill <name> ...` becomes a Skill tool invocation.
//!
//! Each rewrite runs only while the catalog still carries the matching
//! legacy rule (`ask-user`, `agent-shorthand`, `skill-shorthand`), and the
//! ask-user rewrite targets the catalog's soft-unmapped tool name, so a
//! substituted catalog drives the normalizer and the analyzer alike.
//!
//! None of the rewritten forms matches any source pattern, so normalizing
//! twice changes nothing the second time. A marker comment can be prepended
//! to record that the body was touched.

use crate::artifact::ArtifactKind;
use crate::catalog::{Catalog, AGENT_SHORTHAND_RULE, ASK_USER_RULE, SKILL_SHORTHAND_RULE};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeSet;

pub const MARKER_PREFIX: &str = "<!-- droid-port: normalized";

static AGENT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([ \t]*)agent[ \t]+(\S+)(.*)$").unwrap());
static SKILL_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([ \t]*)skill[ \t]+(\S+)(.*)$").unwrap());
static WELL_FORMED_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9_-]+$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rewrite {
    AskUser,
    TaskDelegation,
    SkillInvocation,
}

impl Rewrite {
    fn label(&self) -> &'static str {
        match self {
            Rewrite::AskUser => "ask-user",
            Rewrite::TaskDelegation => "task-delegation",
            Rewrite::SkillInvocation => "skill-invocation",
        }
    }

    fn note(&self) -> &'static str {
        match self {
            Rewrite::AskUser => "Replaced AskUserQuestion usage with direct questions to the user",
            Rewrite::TaskDelegation => "Rewrote `agent <name>` shorthand as Task tool delegation",
            Rewrite::SkillInvocation => "Rewrote `skill <name>` shorthand as Skill tool invocation",
        }
    }
}

#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    pub kind: ArtifactKind,
    pub add_marker: bool,
    /// Droids known to exist at the destination
    pub known_droids: BTreeSet<String>,
    /// Skills known to exist at the destination
    pub known_skills: BTreeSet<String>,
}

impl NormalizeOptions {
    pub fn new(kind: ArtifactKind) -> Self {
        Self {
            kind,
            add_marker: true,
            known_droids: BTreeSet::new(),
            known_skills: BTreeSet::new(),
        }
    }

    pub fn without_marker(mut self) -> Self {
        self.add_marker = false;
        self
    }

    pub fn with_known_droids<I: IntoIterator<Item = String>>(mut self, droids: I) -> Self {
        self.known_droids.extend(droids);
        self
    }

    pub fn with_known_skills<I: IntoIterator<Item = String>>(mut self, skills: I) -> Self {
        self.known_skills.extend(skills);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeResult {
    pub text: String,
    pub changed: bool,
    pub notes: Vec<String>,
    pub referenced_droids: Vec<String>,
    pub unresolved_droids: Vec<String>,
    pub referenced_skills: Vec<String>,
    pub unresolved_skills: Vec<String>,
}

/// Rewrite legacy conventions in `text` using the built-in catalog.
pub fn normalize(text: &str, options: &NormalizeOptions) -> NormalizeResult {
    normalize_with(&Catalog::builtin(), text, options)
}

/// Rewrite legacy conventions in `text` as described by `catalog`.
pub fn normalize_with(catalog: &Catalog, text: &str, options: &NormalizeOptions) -> NormalizeResult {
    let mut result = NormalizeResult::default();
    let mut applied: Vec<Rewrite> = Vec::new();
    let mut current = text.to_string();

    if catalog.has_legacy_rule(ASK_USER_RULE) {
        if let Some(rewritten) = rewrite_ask_user(&catalog.soft_unmapped, &current) {
            current = rewritten;
            applied.push(Rewrite::AskUser);
        }
    }

    if catalog.has_legacy_rule(AGENT_SHORTHAND_RULE) {
        current = rewrite_agent_lines(&current, options, &mut result, &mut applied);
    }

    if catalog.has_legacy_rule(SKILL_SHORTHAND_RULE) {
        current = rewrite_skill_lines(&current, options, &mut result, &mut applied);
    }

    if !applied.is_empty() && options.add_marker && !current.contains(MARKER_PREFIX) {
        let labels: Vec<_> = applied.iter().map(Rewrite::label).collect();
        current = format!(
            "{} {} ({}) -->\n{}",
            MARKER_PREFIX,
            options.kind,
            labels.join(", "),
            current
        );
    }

    for rewrite in &applied {
        push_unique(&mut result.notes, rewrite.note());
    }

    if !applied.is_empty() {
        tracing::debug!(
            kind = %options.kind,
            rewrites = applied.len(),
            unresolved_droids = result.unresolved_droids.len(),
            unresolved_skills = result.unresolved_skills.len(),
            "normalized legacy patterns"
        );
    }

    result.changed = current != text;
    result.text = current;
    result
}

fn rewrite_agent_lines(
    text: &str,
    options: &NormalizeOptions,
    result: &mut NormalizeResult,
    applied: &mut Vec<Rewrite>,
) -> String {
    let rewritten = AGENT_LINE.replace_all(text, |caps: &Captures| {
        let name = &caps[2];
        push_unique(&mut result.referenced_droids, name);

        let qualifier = if options.known_droids.contains(name) {
            ""
        } else {
            push_unique(&mut result.unresolved_droids, name);
            if WELL_FORMED_NAME.is_match(name) {
                " (if available)"
            } else {
                " (legacy name)"
            }
        };

        format!(
            "{}Use the Task tool to delegate to the `{}` droid{}{}",
            &caps[1], name, qualifier, &caps[3]
        )
    });
    match rewritten {
        Cow::Owned(rewritten) => {
            applied.push(Rewrite::TaskDelegation);
            rewritten
        }
        Cow::Borrowed(_) => text.to_string(),
    }
}

fn rewrite_skill_lines(
    text: &str,
    options: &NormalizeOptions,
    result: &mut NormalizeResult,
    applied: &mut Vec<Rewrite>,
) -> String {
    let rewritten = SKILL_LINE.replace_all(text, |caps: &Captures| {
        let name = &caps[2];
        push_unique(&mut result.referenced_skills, name);

        let qualifier = if options.known_skills.contains(name) {
            ""
        } else {
            push_unique(&mut result.unresolved_skills, name);
            " (if available)"
        };

        format!(
            "{}Use the Skill tool to invoke the `{}` skill{}{}",
            &caps[1], name, qualifier, &caps[3]
        )
    });
    match rewritten {
        Cow::Owned(rewritten) => {
            applied.push(Rewrite::SkillInvocation);
            rewritten
        }
        Cow::Borrowed(_) => text.to_string(),
    }
}

/// `use <tool>` → `ask the user`, then any leftover mention of `<tool>`.
fn rewrite_ask_user(tool: &str, text: &str) -> Option<String> {
    if tool.is_empty() {
        return None;
    }
    let tool = regex::escape(tool);
    let (use_tool, mention) = match (
        Regex::new(&format!(r"(?i)\buse\s+(?:the\s+)?{}(?:\s+tool)?\b", tool)),
        Regex::new(&format!(r"(?i)\b(?:the\s+)?{}(?:\s+tool)?\b", tool)),
    ) {
        (Ok(use_tool), Ok(mention)) => (use_tool, mention),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(tool = %tool, error = %e, "ask-user rewrite skipped");
            return None;
        }
    };

    let step = use_tool.replace_all(text, |caps: &Captures| {
        if caps[0].starts_with('U') {
            "Ask the user"
        } else {
            "ask the user"
        }
    });
    let rewritten = mention
        .replace_all(&step, "a direct question to the user")
        .into_owned();

    (rewritten != text).then_some(rewritten)
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|existing| existing == value) {
        list.push(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> NormalizeOptions {
        NormalizeOptions::new(ArtifactKind::Command)
    }

    #[test]
    fn test_untouched_text() {
        let result = normalize("Plain body\nwith an agent mid-line\n", &opts());
        assert!(!result.changed);
        assert!(result.notes.is_empty());
        assert_eq!(result.text, "Plain body\nwith an agent mid-line\n");
    }

    #[test]
    fn test_ask_user_rewrites() {
        let result = normalize(
            "Use the AskUserQuestion tool to confirm.\nThen use askuserquestion again.\nVia AskUserQuestion.\n",
            &opts().without_marker(),
        );

        assert_eq!(
            result.text,
            "Ask the user to confirm.\nThen ask the user again.\nVia a direct question to the user.\n"
        );
        assert_eq!(result.notes.len(), 1);
    }

    #[test]
    fn test_agent_shorthand_unknown() {
        let result = normalize("  agent reviewer --strict\n", &opts().without_marker());

        assert_eq!(
            result.text,
            "  Use the Task tool to delegate to the `reviewer` droid (if available) --strict\n"
        );
        assert_eq!(result.referenced_droids, vec!["reviewer"]);
        assert_eq!(result.unresolved_droids, vec!["reviewer"]);
    }

    #[test]
    fn test_agent_shorthand_known_and_legacy() {
        let options = opts()
            .without_marker()
            .with_known_droids(["reviewer".to_string()]);
        let result = normalize(
            "agent reviewer now\nagent Code.Reviewer later\nagent reviewer again\n",
            &options,
        );

        assert_eq!(
            result.text,
            "Use the Task tool to delegate to the `reviewer` droid now\n\
             Use the Task tool to delegate to the `Code.Reviewer` droid (legacy name) later\n\
             Use the Task tool to delegate to the `reviewer` droid again\n"
        );
        assert_eq!(result.referenced_droids, vec!["reviewer", "Code.Reviewer"]);
        assert_eq!(result.unresolved_droids, vec!["Code.Reviewer"]);
    }

    #[test]
    fn test_skill_shorthand() {
        let options = opts().without_marker().with_known_skills(["pdf".to_string()]);
        let result = normalize("skill pdf extract tables\n\tskill charts\n", &options);

        assert_eq!(
            result.text,
            "Use the Skill tool to invoke the `pdf` skill extract tables\n\
             \tUse the Skill tool to invoke the `charts` skill (if available)\n"
        );
        assert_eq!(result.referenced_skills, vec!["pdf", "charts"]);
        assert_eq!(result.unresolved_skills, vec!["charts"]);
    }

    #[test]
    fn test_marker_lists_categories() {
        let result = normalize("agent a\nskill b\n", &opts());
        assert!(result.text.starts_with(
            "<!-- droid-port: normalized command (task-delegation, skill-invocation) -->\n"
        ));
        assert_eq!(result.notes.len(), 2);
    }

    #[test]
    fn test_marker_not_duplicated() {
        let text = "<!-- droid-port: normalized command (ask-user) -->\nagent a\n";
        let result = normalize(text, &opts());
        assert_eq!(result.text.matches(MARKER_PREFIX).count(), 1);
    }

    #[test]
    fn test_no_marker_without_rewrites() {
        let result = normalize("nothing here\n", &opts());
        assert_eq!(result.text, "nothing here\n");
    }

    #[test]
    fn test_rewrites_follow_catalog_rules() {
        let mut catalog = Catalog::builtin();
        catalog
            .legacy_patterns
            .retain(|rule| rule.id != AGENT_SHORTHAND_RULE);

        let body = "agent reviewer x\nskill pdf go\n";
        let result = normalize_with(&catalog, body, &opts().without_marker());

        assert!(result.text.starts_with("agent reviewer x\n"));
        assert!(result.text.contains("Use the Skill tool to invoke the `pdf` skill"));
        assert!(result.referenced_droids.is_empty());

        catalog.legacy_patterns.clear();
        let untouched = normalize_with(&catalog, body, &opts());
        assert_eq!(untouched.text, body);
        assert!(!untouched.changed);
    }

    #[test]
    fn test_ask_user_follows_soft_unmapped_name() {
        let mut catalog = Catalog::builtin();
        catalog.soft_unmapped = "PromptUser".to_string();

        let result = normalize_with(
            &catalog,
            "Use the PromptUser tool to confirm.\nAskUserQuestion stays.\n",
            &opts().without_marker(),
        );

        assert_eq!(
            result.text,
            "Ask the user to confirm.\nAskUserQuestion stays.\n"
        );
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "Use AskUserQuestion.\nagent reviewer --strict\n  skill pdf go\n",
            "agent Weird.Name x\r\nskill s\r\n",
            "no patterns at all",
            "use the AskUserQuestion tool\nagent AskUserQuestion\n",
        ];

        for input in inputs {
            for add_marker in [true, false] {
                let mut options = opts();
                options.add_marker = add_marker;
                let once = normalize(input, &options);
                let twice = normalize(&once.text, &options);
                assert_eq!(twice.text, once.text, "input: {:?}", input);
                assert!(!twice.changed);
            }
        }
    }
}
