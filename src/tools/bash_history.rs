use crate::config::{CommonArgs, ToolboxConfig};
use crate::utils::error::{Result, ToolError};
use clap::Parser;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Parser)]
#[command(name = "clean-bashhistory", about = "Remove duplicate lines from the bash history")]
pub struct BashHistoryArgs {
    /// History file (defaults to ~/.bash_history)
    #[arg(long)]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Keep only the most recent occurrence of each line, oldest first.
pub fn dedup_keep_last<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    let mut kept: Vec<&str> = lines
        .iter()
        .rev()
        .filter(|line| seen.insert(**line))
        .copied()
        .collect();
    kept.reverse();
    kept
}

pub fn clean_history(path: &Path) -> Result<usize> {
    let content = std::fs::read_to_string(path)?;
    let lines: Vec<&str> = content.lines().collect();
    let kept = dedup_keep_last(&lines);

    let mut output = kept.join("\n");
    if !kept.is_empty() {
        output.push('\n');
    }
    std::fs::write(path, output)?;
    Ok(lines.len() - kept.len())
}

pub async fn run(args: BashHistoryArgs, _config: ToolboxConfig) -> Result<()> {
    let path = match args.file {
        Some(path) => path,
        None => dirs::home_dir()
            .map(|home| home.join(".bash_history"))
            .ok_or_else(|| ToolError::not_found("home directory"))?,
    };

    let removed = clean_history(&path)?;
    tracing::info!("Removed {} duplicate lines from {}", removed, path.display());
    Ok(())
}
