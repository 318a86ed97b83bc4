//! Show the ID3v2 text fields of an MP3 re-decoded from a legacy encoding.
//!
//! Taggers often stored e.g. Shift_JIS bytes in a latin1 frame. The frame
//! text is turned back into its raw bytes and decoded again with the
//! encoding given on the command line.

use crate::config::{CommonArgs, ToolboxConfig};
use crate::tools::id3_addtag::read_id3;
use crate::utils::error::{Result, ToolError};
use clap::Parser;
use encoding_rs::Encoding;
use id3::TagLike;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Parser)]
#[command(name = "id3-fixenc", about = "Helper to fix tag encoding issues")]
pub struct Id3FixencArgs {
    /// Source character encoding (a WHATWG label, e.g. shift_jis)
    #[arg(short, long)]
    pub encoding: String,

    /// Input file
    #[arg(short, long)]
    pub file: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub async fn run(args: Id3FixencArgs, _config: ToolboxConfig) -> Result<()> {
    let lines = fixed_fields(&args.file, &args.encoding)?;
    if lines.is_empty() {
        tracing::info!("No tags found in input: {}", args.file.display());
    }
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

/// Re-decode `text` (whose chars are all below U+0100) as `label`.
pub fn refix_encoding(text: &str, label: &str) -> Result<String> {
    let encoding = Encoding::for_label(label.as_bytes())
        .ok_or_else(|| ToolError::invalid_input(format!("unknown encoding: {}", label)))?;

    let bytes = text
        .chars()
        .map(|c| u8::try_from(u32::from(c)))
        .collect::<std::result::Result<Vec<u8>, _>>()
        .map_err(|_| ToolError::invalid_input(format!("text is not latin1: {}", text)))?;

    encoding
        .decode_without_bom_handling_and_without_replacement(&bytes)
        .map(|s| s.into_owned())
        .ok_or_else(|| {
            ToolError::invalid_input(format!("text is not valid {}: {}", encoding.name(), text))
        })
}

/// `name: fixed value` for title, album, artist and album artist.
pub fn fixed_fields(path: &Path, label: &str) -> Result<Vec<String>> {
    let tag = read_id3(path)?.ok_or_else(|| {
        ToolError::invalid_input(format!("input does not contain ID3v2: {}", path.display()))
    })?;

    let fields = [
        ("title", tag.title()),
        ("album", tag.album()),
        ("artist", tag.artist()),
        ("album artist", tag.album_artist()),
    ];

    fields
        .into_iter()
        .filter_map(|(name, value)| value.filter(|v| !v.is_empty()).map(|v| (name, v)))
        .map(|(name, value)| Ok(format!("{}: {}", name, refix_encoding(value, label)?)))
        .collect()
}
