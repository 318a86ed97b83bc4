//! Find link-list lines whose media has already been downloaded.

use crate::config::{CommonArgs, ToolboxConfig};
use crate::utils::error::Result;
use crate::utils::fs::walk_files;
use crate::utils::validation::{require_dir, require_file};
use clap::Parser;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

const MEDIA_EXTENSIONS: [&str; 5] = ["jpeg", "mkv", "mp4", "wmv", "avi"];

#[derive(Debug, Clone, Parser)]
#[command(name = "linklist-analyse", about = "Analyse a link list against downloaded files")]
pub struct LinklistArgs {
    /// Path to the link list file
    #[arg(short, long)]
    pub link_list: PathBuf,

    /// Path to the working directory
    #[arg(short, long)]
    pub directory: PathBuf,

    /// Remove matching lines from the link list
    #[arg(short, long)]
    pub remove_lines: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Stems of the media files below `dir`.
pub fn collect_stems(dir: &Path) -> Result<BTreeSet<String>> {
    let mut stems = BTreeSet::new();
    for file in walk_files(dir)? {
        let ext = file.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !MEDIA_EXTENSIONS.contains(&ext) {
            tracing::warn!(
                "Skipping file with unknown extension: {}",
                file.file_name().unwrap_or_default().to_string_lossy()
            );
            continue;
        }
        if let Some(stem) = file.file_stem() {
            stems.insert(stem.to_string_lossy().into_owned());
        }
    }
    Ok(stems)
}

fn matches_any(line: &str, stems: &BTreeSet<String>) -> bool {
    stems.iter().any(|stem| line.contains(stem.as_str()))
}

/// `(line number, line)` of every line that mentions a stem, 1-based.
pub fn removable_lines<'a>(content: &'a str, stems: &BTreeSet<String>) -> Vec<(usize, &'a str)> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| matches_any(line, stems))
        .map(|(idx, line)| (idx + 1, line.trim()))
        .collect()
}

pub fn remaining_lines<'a>(content: &'a str, stems: &BTreeSet<String>) -> Vec<&'a str> {
    content.lines().filter(|line| !matches_any(line, stems)).collect()
}

pub async fn run(args: LinklistArgs, _config: ToolboxConfig) -> Result<()> {
    require_file(&args.link_list)?;
    require_dir(&args.directory)?;

    let stems = collect_stems(&args.directory)?;
    let content = std::fs::read_to_string(&args.link_list)?;

    if args.remove_lines {
        let remaining = remaining_lines(&content, &stems);
        let removed = content.lines().count() - remaining.len();
        let mut output = remaining.join("\n");
        if !remaining.is_empty() {
            output.push('\n');
        }
        std::fs::write(&args.link_list, output)?;
        tracing::info!("Removed {} lines from {}", removed, args.link_list.display());
    } else {
        println!("info: the following lines can be removed from the link-list:");
        for (lineno, line) in removable_lines(&content, &stems) {
            println!("{}: {}", lineno, line);
        }
    }
    Ok(())
}
