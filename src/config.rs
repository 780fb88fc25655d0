use crate::catalog::Catalog;
use crate::cli::ConvertFlags;
use crate::convert::ConvertOptions;
use crate::error::{DroidPortError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = ".droid-port.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub convert: ConvertConfig,

    #[serde(default)]
    pub targets: TargetsConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Verbose logging (not stored in config file)
    #[serde(skip)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// Rewrite legacy body patterns during conversion
    #[serde(default = "default_true")]
    pub normalize: bool,

    /// Prepend a marker comment to normalized bodies
    #[serde(default = "default_true")]
    pub add_marker: bool,

    /// Install artifacts even when analysis marks them incompatible
    #[serde(default)]
    pub include_incompatible: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            normalize: true,
            add_marker: true,
            include_incompatible: false,
        }
    }
}

/// Droids and skills known to exist at the destination.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TargetsConfig {
    #[serde(default)]
    pub droids: Vec<String>,

    #[serde(default)]
    pub skills: Vec<String>,
}

/// Additions to the built-in tool catalog.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    /// Extra tool names Droid provides natively
    #[serde(default)]
    pub native: Vec<String>,

    /// Claude tool name -> Droid tool name
    #[serde(default)]
    pub mapping: BTreeMap<String, String>,

    /// Claude tools with no Droid equivalent
    #[serde(default)]
    pub unmapped: Vec<String>,

    /// Tool names that accept a `Name(pattern)` restriction
    #[serde(default)]
    pub restricted: Vec<String>,

    /// Model alias -> Droid model
    #[serde(default)]
    pub models: BTreeMap<String, String>,

    #[serde(default)]
    pub patterns: Vec<LegacyPatternConfig>,
}

/// An extra advisory legacy-pattern rule.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LegacyPatternConfig {
    pub id: String,
    pub pattern: String,
    pub warning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration with precedence:
    /// 1. CLI flags (applied later via the `with_*_overrides` methods)
    /// 2. Environment variables
    /// 3. Project config (.droid-port.toml in the working directory)
    /// 4. Global config (~/.droid-port.toml)
    /// 5. Built-in defaults
    pub fn load(project_root: &Path) -> Result<Self> {
        let mut config = Self::default();

        if let Some(global_config) = global_config_path() {
            if global_config.exists() {
                tracing::debug!(path = %global_config.display(), "loading global config");
                config = config.merge(Self::from_file(&global_config)?);
            }
        }

        let project_config = project_root.join(CONFIG_FILE_NAME);
        if project_config.exists() {
            tracing::debug!(path = %project_config.display(), "loading project config");
            config = config.merge(Self::from_file(&project_config)?);
        }

        Ok(config.merge_env())
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(mut self, other: Self) -> Self {
        // Convert flags: a non-default value wins
        if !other.convert.normalize {
            self.convert.normalize = false;
        }
        if !other.convert.add_marker {
            self.convert.add_marker = false;
        }
        self.convert.include_incompatible =
            self.convert.include_incompatible || other.convert.include_incompatible;

        // Targets (append)
        extend_unique(&mut self.targets.droids, other.targets.droids);
        extend_unique(&mut self.targets.skills, other.targets.skills);

        // Catalog lists (append), maps (other wins per key)
        extend_unique(&mut self.catalog.native, other.catalog.native);
        extend_unique(&mut self.catalog.unmapped, other.catalog.unmapped);
        extend_unique(&mut self.catalog.restricted, other.catalog.restricted);
        self.catalog.mapping.extend(other.catalog.mapping);
        self.catalog.models.extend(other.catalog.models);
        self.catalog.patterns.extend(other.catalog.patterns);

        self
    }

    /// Apply environment variable overrides
    fn merge_env(mut self) -> Self {
        if let Some(include) = env_flag("DROID_PORT_INCLUDE_INCOMPATIBLE") {
            self.convert.include_incompatible = include;
        }

        if let Some(no_marker) = env_flag("DROID_PORT_NO_MARKER") {
            self.convert.add_marker = !no_marker;
        }

        self
    }

    /// Apply `convert` command flags (highest precedence)
    pub fn with_convert_overrides(mut self, flags: &ConvertFlags, verbose: bool) -> Self {
        self.verbose = verbose;

        if flags.no_normalize {
            self.convert.normalize = false;
        }
        if flags.no_marker {
            self.convert.add_marker = false;
        }
        extend_unique(&mut self.targets.droids, flags.droids.iter().cloned());
        extend_unique(&mut self.targets.skills, flags.skills.iter().cloned());

        self
    }

    /// Apply `plan` command flags (highest precedence)
    pub fn with_plan_overrides(mut self, include_incompatible: bool, verbose: bool) -> Self {
        self.verbose = verbose;
        if include_incompatible {
            self.convert.include_incompatible = true;
        }
        self
    }

    /// Built-in catalog with this configuration's additions applied.
    pub fn catalog(&self) -> Result<Catalog> {
        Catalog::builtin().with_overrides(&self.catalog)
    }

    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            normalize: self.convert.normalize,
            add_marker: self.convert.add_marker,
            known_droids: self.targets.droids.iter().cloned().collect(),
            known_skills: self.targets.skills.iter().cloned().collect(),
        }
    }

    /// Check values that parse but cannot be used.
    pub fn validate(&self) -> Result<()> {
        for name in self
            .targets
            .droids
            .iter()
            .chain(&self.targets.skills)
            .chain(&self.catalog.native)
            .chain(&self.catalog.unmapped)
            .chain(&self.catalog.restricted)
        {
            if name.trim().is_empty() {
                return Err(DroidPortError::InvalidConfig(
                    "Empty name in targets or catalog list".to_string(),
                ));
            }
        }

        for rule in &self.catalog.patterns {
            if rule.id.trim().is_empty() || rule.warning.trim().is_empty() {
                return Err(DroidPortError::InvalidConfig(format!(
                    "Pattern rule '{}' needs both an id and a warning",
                    rule.pattern
                )));
            }
        }

        // Builds the catalog to surface bad regexes and empty mappings
        self.catalog().map(|_| ())
    }
}

/// Path of the global config file, if a home directory is known
pub fn global_config_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(CONFIG_FILE_NAME))
}

fn extend_unique<I: IntoIterator<Item = String>>(list: &mut Vec<String>, items: I) {
    for item in items {
        if !list.contains(&item) {
            list.push(item);
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    let value = std::env::var(name).ok()?;
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        other => {
            tracing::warn!(variable = name, value = other, "ignoring unrecognised boolean");
            None
        }
    }
}
