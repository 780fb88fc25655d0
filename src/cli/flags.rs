use clap::Parser;

/// Flags for the convert command.
/// These override the `[convert]` and `[targets]` config sections.
#[derive(Parser, Debug, Clone, Default)]
pub struct ConvertFlags {
    /// Leave the body as written
    #[arg(long = "no-normalize")]
    pub no_normalize: bool,

    /// Don't prepend the normalization marker comment
    #[arg(long = "no-marker")]
    pub no_marker: bool,

    /// Droid known to exist at the destination (repeatable)
    #[arg(long = "droid")]
    pub droids: Vec<String>,

    /// Skill known to exist at the destination (repeatable)
    #[arg(long = "skill")]
    pub skills: Vec<String>,
}
