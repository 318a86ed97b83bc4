//! Rename files so their names are valid on VFAT filesystems.

use crate::config::{CommonArgs, ToolboxConfig};
use crate::utils::error::{Result, ToolError};
use crate::utils::fs::{file_name_string, walk_files};
use crate::utils::validation::require_dir;
use clap::Parser;
use std::path::{Path, PathBuf};

const RESERVED: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
const REPLACEMENT: char = '_';

#[derive(Debug, Clone, Parser)]
#[command(name = "rename-vfat", about = "Make file names VFAT compatible")]
pub struct RenameVfatArgs {
    /// Directories to process recursively
    #[arg(required = true)]
    pub directories: Vec<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    Unchanged,
    Renamed(PathBuf),
    /// The sanitized name is already taken.
    Skipped,
}

pub fn sanitize_vfat(name: &str) -> String {
    name.chars()
        .map(|c| if RESERVED.contains(&c) { REPLACEMENT } else { c })
        .collect()
}

pub fn rename_file(path: &Path) -> Result<RenameOutcome> {
    if !path.is_file() {
        return Err(ToolError::invalid_input(format!(
            "path is not a file: {}",
            path.display()
        )));
    }

    let original = file_name_string(path);
    let sanitized = sanitize_vfat(&original);
    if original == sanitized {
        return Ok(RenameOutcome::Unchanged);
    }

    let target = path.with_file_name(&sanitized);
    if target.exists() {
        tracing::warn!("Sanitized version exists: {}", original);
        return Ok(RenameOutcome::Skipped);
    }

    println!("info: sanitizing: {} -> {}", original, sanitized);
    std::fs::rename(path, &target)?;
    Ok(RenameOutcome::Renamed(target))
}

pub fn rename_dir(dir: &Path) -> Result<Vec<RenameOutcome>> {
    require_dir(dir)?;
    walk_files(dir)?.iter().map(|f| rename_file(f)).collect()
}

pub async fn run(args: RenameVfatArgs, _config: ToolboxConfig) -> Result<()> {
    let mut failed = 0;
    for dir in &args.directories {
        if let Err(e) = rename_dir(dir) {
            tracing::warn!("Error while renaming {}: {}", dir.display(), e);
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(ToolError::invalid_input(format!(
            "{} of {} directories failed",
            failed,
            args.directories.len()
        )));
    }
    Ok(())
}
