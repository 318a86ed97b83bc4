//! Add, replace or remove VorbisComment tags of a FLAC or Ogg Vorbis file.

use crate::config::{CommonArgs, ToolboxConfig};
use crate::core::tags::{
    apply_vorbis, parse_entries, read_vorbis, vorbis_lines, write_vorbis, TagEntry, VORBIS_TYPES,
};
use crate::utils::error::Result;
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Parser)]
#[command(name = "vc-addtag", about = "Add VorbisComment tags to a file")]
pub struct VcAddtagArgs {
    /// File to edit
    #[arg(short, long)]
    pub file: PathBuf,

    /// Tag in the format key:value (an empty value removes the key); without
    /// any tag the existing tags are printed
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub async fn run(args: VcAddtagArgs, _config: ToolboxConfig) -> Result<()> {
    let entries = parse_entries(&args.tags)?;
    if entries.is_empty() {
        for line in list_tags(&args.file)? {
            println!("{}", line);
        }
        return Ok(());
    }
    vc_addtag(&args.file, &entries)
}

pub fn list_tags(path: &Path) -> Result<Vec<String>> {
    let comments = read_vorbis(path, &VORBIS_TYPES)?;
    let lines = vorbis_lines(&comments);
    if lines.is_empty() {
        tracing::info!("No tags found: {}", path.display());
    }
    Ok(lines)
}

pub fn vc_addtag(path: &Path, entries: &[TagEntry]) -> Result<()> {
    let mut comments = read_vorbis(path, &VORBIS_TYPES)?;
    apply_vorbis(&mut comments, entries);
    write_vorbis(path, &comments)?;
    tracing::debug!("Applied {} tags to {}", entries.len(), path.display());
    Ok(())
}
