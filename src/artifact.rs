//! Artifacts handed to the engine and the single fetch seam it depends on.
//!
//! Discovery (walking marketplaces, cloning repositories) happens elsewhere.
//! The engine only sees an [`Artifact`] that says where its bytes live, and a
//! [`ContentFetcher`] that knows how to get them.

use crate::error::{DroidPortError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// The three kinds of plugin content that can be ported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// A Claude Code agent, installed as a Droid
    Droid,
    /// A slash command
    Command,
    /// A skill directory built around SKILL.md
    Skill,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Droid => "droid",
            ArtifactKind::Command => "command",
            ArtifactKind::Skill => "skill",
        }
    }

    /// Frontmatter field that declares capability tokens for this kind.
    pub fn tools_field(&self) -> &'static str {
        match self {
            ArtifactKind::Droid => "tools",
            ArtifactKind::Command | ArtifactKind::Skill => "allowed-tools",
        }
    }

    /// Guess the kind from the conventional plugin layout.
    ///
    /// `agents/*.md` is a droid, `commands/**/*.md` is a command, and a
    /// directory (or a file inside `skills/`) is a skill.
    pub fn infer(path: &Path) -> Option<Self> {
        if path.is_dir() {
            return Some(ArtifactKind::Skill);
        }

        let file_name = path.file_name()?.to_str()?;
        if file_name.eq_ignore_ascii_case("SKILL.md") {
            return Some(ArtifactKind::Skill);
        }

        for ancestor in path.ancestors().skip(1) {
            match ancestor.file_name().and_then(|n| n.to_str()) {
                Some("agents") | Some("droids") => return Some(ArtifactKind::Droid),
                Some("commands") => return Some(ArtifactKind::Command),
                Some("skills") => return Some(ArtifactKind::Skill),
                _ => {}
            }
        }

        None
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an artifact's bytes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Local,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSource {
    pub origin: Origin,
    /// Filesystem path for local sources, URL for remote ones
    pub locator: String,
}

impl ArtifactSource {
    pub fn local(path: impl AsRef<Path>) -> Self {
        Self {
            origin: Origin::Local,
            locator: path.as_ref().to_string_lossy().to_string(),
        }
    }

    pub fn remote(url: impl Into<String>) -> Self {
        Self {
            origin: Origin::Remote,
            locator: url.into(),
        }
    }
}

/// One file belonging to a skill directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillFile {
    /// Path relative to the skill directory
    pub path: String,
    pub source: ArtifactSource,
}

impl SkillFile {
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// A named unit of plugin content awaiting analysis and conversion.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub name: String,
    pub kind: ArtifactKind,
    /// Name of the plugin the artifact was discovered in
    pub plugin: String,
    pub source: ArtifactSource,
    /// Skill file set; empty for droids and commands
    pub files: Vec<SkillFile>,
}

impl Artifact {
    pub fn new(
        name: impl Into<String>,
        kind: ArtifactKind,
        plugin: impl Into<String>,
        source: ArtifactSource,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            plugin: plugin.into(),
            source,
            files: Vec::new(),
        }
    }

    pub fn with_files(mut self, files: Vec<SkillFile>) -> Self {
        self.files = files;
        self
    }
}

/// Supplies artifact bytes. The only I/O the engine performs goes through here.
pub trait ContentFetcher {
    fn fetch(&self, source: &ArtifactSource) -> Result<String>;
}

impl<F> ContentFetcher for F
where
    F: Fn(&ArtifactSource) -> Result<String>,
{
    fn fetch(&self, source: &ArtifactSource) -> Result<String> {
        self(source)
    }
}

/// Reads local files. Remote sources are reported as fetch failures; retrieving
/// them is the job of whatever discovered them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFetcher;

impl ContentFetcher for LocalFetcher {
    fn fetch(&self, source: &ArtifactSource) -> Result<String> {
        match source.origin {
            Origin::Local => {
                std::fs::read_to_string(&source.locator).map_err(|e| DroidPortError::Fetch {
                    locator: source.locator.clone(),
                    reason: e.to_string(),
                })
            }
            Origin::Remote => Err(DroidPortError::RemoteUnsupported(source.locator.clone())),
        }
    }
}
