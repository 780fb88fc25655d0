use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod flags;
pub use flags::ConvertFlags;

use crate::artifact::ArtifactKind;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration files
    Validate {
        /// Optional path to a specific config file to validate
        file: Option<PathBuf>,
    },

    /// Show effective configuration after merging all sources
    Show,
}

/// Artifact kind as accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindArg {
    Droid,
    /// Alias for droid
    Agent,
    Command,
    Skill,
}

impl From<KindArg> for ArtifactKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Droid | KindArg::Agent => ArtifactKind::Droid,
            KindArg::Command => ArtifactKind::Command,
            KindArg::Skill => ArtifactKind::Skill,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "droid-port")]
#[command(about = "Port Claude Code plugins to Factory Droid", long_about = None)]
#[command(version = env!("DROID_PORT_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show debug logging
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check agents, commands and skills for Droid compatibility
    Analyze {
        /// Artifact files or skill directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Artifact kind (inferred from the path when omitted)
        #[arg(long, value_enum)]
        kind: Option<KindArg>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert one artifact to Droid format
    Convert {
        /// Artifact file or skill directory
        path: PathBuf,

        /// Artifact kind (inferred from the path when omitted)
        #[arg(long, value_enum)]
        kind: Option<KindArg>,

        #[command(flatten)]
        flags: ConvertFlags,

        /// Write the result to a file instead of stdout
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },

    /// Analyse whole plugins and show what would be installed
    Plan {
        /// Plugin directories
        #[arg(required = true)]
        plugins: Vec<PathBuf>,

        /// Select incompatible artifacts too
        #[arg(long = "include-incompatible")]
        include_incompatible: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}
