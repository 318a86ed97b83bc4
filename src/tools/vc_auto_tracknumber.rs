//! Number the FLAC files of a directory in name order.

use crate::config::{CommonArgs, ToolboxConfig};
use crate::core::tags::{flac_files, TagEntry};
use crate::tools::vc_addtag::vc_addtag;
use crate::utils::error::Result;
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Parser)]
#[command(name = "vc-auto-tracknumber", about = "Set tracknumber/tracktotal on FLAC files")]
pub struct VcAutoTracknumberArgs {
    /// Directory to process (defaults to the current directory)
    pub directory: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub async fn run(args: VcAutoTracknumberArgs, _config: ToolboxConfig) -> Result<()> {
    let dir = match args.directory {
        Some(dir) => dir,
        None => {
            let cwd = std::env::current_dir()?;
            tracing::info!("Using current directory: {}", cwd.display());
            cwd
        }
    };
    let count = vc_auto_tracknumber(&dir)?;
    tracing::info!("Numbered {} files", count);
    Ok(())
}

/// Track number zero-padded to the width of the total.
pub fn pad_tracknumber(index: usize, total: usize) -> String {
    let width = total.to_string().len();
    format!("{:0width$}", index, width = width)
}

pub fn vc_auto_tracknumber(dir: &Path) -> Result<usize> {
    let files = flac_files(dir)?;
    let total = files.len();
    let total_tag = TagEntry::new("tracktotal", total.to_string());

    for (index, file) in files.iter().enumerate() {
        let number = TagEntry::new("tracknumber", pad_tracknumber(index + 1, total));
        vc_addtag(file, &[number, total_tag.clone()])?;
    }
    Ok(total)
}
