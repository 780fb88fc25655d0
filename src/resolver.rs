//! Claude Code tool token → Droid tool token resolution.

use crate::catalog::Catalog;
use serde::Serialize;

/// How a token was resolved. Classes are tested in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolClass {
    /// Already a Droid tool
    Native,
    /// `mcp__server[__tool]`, kept verbatim
    Passthrough,
    /// `Bash(git *)` style restriction, collapsed to the bare tool
    Restricted,
    /// Found in the mapping table
    Mapped,
    /// No Droid equivalent
    Unmapped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub token: String,
    pub target: Option<String>,
    pub class: ToolClass,
    /// MCP server the token depends on
    pub dependency: Option<String>,
}

impl Resolution {
    fn new(token: &str, target: Option<&str>, class: ToolClass) -> Self {
        Self {
            token: token.to_string(),
            target: target.map(str::to_string),
            class,
            dependency: None,
        }
    }
}

/// Aggregate of resolving a whole tool list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedTools {
    /// Droid tokens, deduplicated in first-seen order
    pub tools: Vec<String>,
    /// Source tokens without an equivalent, deduplicated
    pub unmapped: Vec<String>,
    /// MCP servers required by passthrough tokens, deduplicated
    pub dependencies: Vec<String>,
    pub resolutions: Vec<Resolution>,
}

impl ResolvedTools {
    /// Tokens that had a `Name(pattern)` restriction dropped.
    pub fn restricted(&self) -> impl Iterator<Item = &Resolution> {
        self.resolutions
            .iter()
            .filter(|r| r.class == ToolClass::Restricted)
    }
}

pub struct ToolResolver<'a> {
    catalog: &'a Catalog,
}

impl<'a> ToolResolver<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Resolve one token.
    pub fn resolve(&self, token: &str) -> Resolution {
        let token = token.trim();

        if self.catalog.is_native(token) {
            return Resolution::new(token, Some(token), ToolClass::Native);
        }

        if let Some(server) = self.passthrough_server(token) {
            let mut resolution = Resolution::new(token, Some(token), ToolClass::Passthrough);
            resolution.dependency = Some(server.to_string());
            return resolution;
        }

        if let Some(target) = self.restricted_target(token) {
            // The restriction text has no Droid counterpart and is dropped
            return Resolution::new(token, Some(target), ToolClass::Restricted);
        }

        match self.catalog.lookup(token) {
            Some(Some(target)) => Resolution::new(token, Some(target), ToolClass::Mapped),
            _ => {
                tracing::debug!(token, "no Droid equivalent");
                Resolution::new(token, None, ToolClass::Unmapped)
            }
        }
    }

    /// Resolve a token list. Output is stable and deduplicated.
    pub fn resolve_all<I, S>(&self, tokens: I) -> ResolvedTools
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut resolved = ResolvedTools::default();

        for token in tokens {
            let token = token.as_ref().trim();
            if token.is_empty() {
                continue;
            }

            let resolution = self.resolve(token);
            match &resolution.target {
                Some(target) => push_unique(&mut resolved.tools, target),
                None => push_unique(&mut resolved.unmapped, &resolution.token),
            }
            if let Some(server) = &resolution.dependency {
                push_unique(&mut resolved.dependencies, server);
            }
            resolved.resolutions.push(resolution);
        }

        resolved
    }

    pub fn is_soft_unmapped(&self, token: &str) -> bool {
        self.catalog.is_soft_unmapped(token)
    }

    /// Server name for `prefix__server` or `prefix__server__tool`.
    fn passthrough_server<'t>(&self, token: &'t str) -> Option<&'t str> {
        let rest = token
            .strip_prefix(self.catalog.passthrough_prefix.as_str())?
            .strip_prefix("__")?;

        let (server, tool) = match rest.split_once("__") {
            Some((server, tool)) => (server, Some(tool)),
            None => (rest, None),
        };

        let valid_server = !server.is_empty()
            && server
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        let valid_tool = tool.map_or(true, |t| !t.is_empty());

        (valid_server && valid_tool).then_some(server)
    }

    /// Droid tool for `Name(restriction)` when `Name` is pattern-restricted.
    fn restricted_target(&self, token: &str) -> Option<&'a str> {
        let (base, rest) = token.split_once('(')?;
        if !rest.ends_with(')') {
            return None;
        }

        let base = base.trim();
        if !self.catalog.is_restricted(base) {
            return None;
        }

        if let Some(native) = self.catalog.native.get(base) {
            return Some(native.as_str());
        }
        self.catalog.lookup(base).flatten()
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|existing| existing == value) {
        list.push(value.to_string());
    }
}
