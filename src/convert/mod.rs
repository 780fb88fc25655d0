//! Artifact converters: Claude Code text in, Droid text out.
//!
//! Each kind keeps only the frontmatter keys Droid understands, in a fixed
//! order, with tool lists passed through the resolver. Bodies optionally go
//! through the legacy pattern normalizer. Conversion never makes things worse:
//! commands and skills whose frontmatter cannot be parsed come back untouched.

mod command;
mod droid;
mod skill;

pub use droid::normalize_description;

use crate::artifact::ArtifactKind;
use crate::catalog::Catalog;
use crate::metadata::MetadataBlock;
use crate::normalize::{normalize_with, NormalizeOptions, NormalizeResult};
use crate::resolver::{ResolvedTools, ToolResolver};
use serde_yaml::Value;
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Run the legacy pattern normalizer over bodies
    pub normalize: bool,
    /// Prepend the normalizer marker when something was rewritten
    pub add_marker: bool,
    pub known_droids: BTreeSet<String>,
    pub known_skills: BTreeSet<String>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            normalize: true,
            add_marker: true,
            known_droids: BTreeSet::new(),
            known_skills: BTreeSet::new(),
        }
    }
}

/// Result of converting one artifact.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub text: String,
    /// `false` when the source was returned unchanged
    pub converted: bool,
    pub tools: ResolvedTools,
    pub normalized: Option<NormalizeResult>,
}

impl Conversion {
    fn unchanged(text: &str) -> Self {
        Self {
            text: text.to_string(),
            converted: false,
            tools: ResolvedTools::default(),
            normalized: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Converter {
    catalog: Catalog,
    options: ConvertOptions,
}

impl Converter {
    pub fn new(catalog: Catalog, options: ConvertOptions) -> Self {
        Self { catalog, options }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert `text`, dispatching on `kind`. `name` is the artifact name used
    /// when the frontmatter does not carry one.
    pub fn convert(&self, kind: ArtifactKind, name: &str, text: &str) -> Conversion {
        match kind {
            ArtifactKind::Droid => self.convert_droid(name, text),
            ArtifactKind::Command => self.convert_command(text),
            ArtifactKind::Skill => self.convert_skill(name, text),
        }
    }

    fn resolve_tools(&self, kind: ArtifactKind, block: &MetadataBlock) -> ResolvedTools {
        ToolResolver::new(&self.catalog).resolve_all(block.token_list(kind.tools_field()))
    }

    fn normalize_body(&self, kind: ArtifactKind, body: &str) -> (String, Option<NormalizeResult>) {
        if !self.options.normalize {
            return (body.to_string(), None);
        }

        let options = NormalizeOptions {
            kind,
            add_marker: self.options.add_marker,
            known_droids: self.options.known_droids.clone(),
            known_skills: self.options.known_skills.clone(),
        };
        let result = normalize_with(&self.catalog, body, &options);
        (result.text.clone(), Some(result))
    }
}

/// Re-emit resolved tools in the shape the source used: a sequence stays a
/// sequence, anything else becomes a comma-separated string.
fn tools_value(original: &Value, tools: &[String]) -> Value {
    match original {
        Value::Sequence(_) => Value::Sequence(tools.iter().cloned().map(Value::String).collect()),
        _ => Value::String(tools.join(", ")),
    }
}
