//! Copy VorbisComment tags and pictures from one FLAC file to another.

use crate::config::{CommonArgs, ToolboxConfig};
use crate::core::tags::{read_vorbis, write_vorbis};
use crate::utils::error::Result;
use clap::Parser;
use lofty::file::FileType;
use lofty::ogg::OggPictureStorage;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Parser)]
#[command(name = "vc-copytags", about = "Copy VorbisComment and picture metadata")]
pub struct VcCopytagsArgs {
    /// Source path
    #[arg(short, long)]
    pub source: PathBuf,

    /// Destination path
    #[arg(short, long)]
    pub destination: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub async fn run(args: VcCopytagsArgs, _config: ToolboxConfig) -> Result<()> {
    vc_copytags(&args.source, &args.destination)
}

/// Append every comment of `src` to `dst`. Pictures replace a destination
/// picture of the same type.
pub fn vc_copytags(src: &Path, dst: &Path) -> Result<()> {
    let source = read_vorbis(src, &[FileType::Flac])?;
    let mut destination = read_vorbis(dst, &[FileType::Flac])?;

    for (key, value) in source.items() {
        destination.push(key.to_string(), value.to_string());
    }
    for (picture, info) in source.pictures() {
        destination.insert_picture(picture.clone(), Some(info.clone()))?;
    }

    write_vorbis(dst, &destination)?;
    tracing::info!(
        "Copied {} tags and {} pictures to {}",
        source.items().count(),
        source.pictures().len(),
        dst.display()
    );
    Ok(())
}
