use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DroidPortError {
    #[error("Failed to fetch {locator}: {reason}")]
    Fetch { locator: String, reason: String },

    #[error("Remote content is not available offline: {0}")]
    RemoteUnsupported(String),

    #[error("Cannot tell whether {0} is an agent, command or skill. Pass --kind explicitly.")]
    UnknownKind(PathBuf),

    #[error("Not a plugin directory (no agents/, commands/ or skills/): {0}")]
    NotAPlugin(PathBuf),

    #[error("Skill has no SKILL.md: {0}")]
    MissingSkillFile(PathBuf),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DroidPortError>;
