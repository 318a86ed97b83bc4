use clap::Args;
use std::path::PathBuf;

/// Options shared by every tool.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to the TOML configuration file
    #[arg(long, env = "TJTOOLS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    pub log_json: bool,
}
