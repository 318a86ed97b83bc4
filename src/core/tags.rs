//! Shared helpers for the tag tools: `key:value` arguments, file type
//! detection and VorbisComment access through lofty.

use crate::utils::error::{Result, ToolError};
use crate::utils::validation::require_file;
use lofty::config::WriteOptions;
use lofty::file::{FileType, TaggedFile, TaggedFileExt};
use lofty::ogg::VorbisComments;
use lofty::probe::Probe;
use lofty::tag::{TagExt, TagType};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

pub const REPLAYGAIN_KEYS: [&str; 8] = [
    "replaygain_algorithm",
    "replaygain_reference_loudness",
    "replaygain_track_gain",
    "replaygain_track_peak",
    "replaygain_track_range",
    "replaygain_album_gain",
    "replaygain_album_peak",
    "replaygain_album_range",
];

/// A tag given on the command line. An empty value removes the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    pub key: String,
    pub value: String,
}

impl TagEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Parse `key:value`; the value may itself contain colons.
    pub fn parse(arg: &str) -> Result<Self> {
        match arg.split_once(':') {
            Some((key, value)) if !key.is_empty() => Ok(Self::new(key, value)),
            _ => Err(ToolError::invalid_input(format!(
                "invalid tag argument (expected key:value): {}",
                arg
            ))),
        }
    }

    pub fn is_replaygain(&self) -> bool {
        REPLAYGAIN_KEYS.contains(&self.key.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

pub fn parse_entries(args: &[String]) -> Result<Vec<TagEntry>> {
    args.iter().map(|a| TagEntry::parse(a)).collect()
}

/// Guess the type of `path` from its content; error unless it is one of
/// `accepted`.
pub fn open_tagged_type(path: &Path, accepted: &[FileType]) -> Result<Probe<BufReader<File>>> {
    require_file(path)?;
    let detected = Probe::open(path)?.guess_file_type()?;
    match detected.file_type() {
        Some(file_type) if accepted.contains(&file_type) => Ok(detected),
        other => Err(ToolError::invalid_input(format!(
            "input has unsupported type ({}): {}",
            other.map(|t| format!("{:?}", t)).unwrap_or_else(|| "unknown".to_string()),
            path.display()
        ))),
    }
}

/// Like [`open_tagged_type`], then read the tags.
pub fn open_tagged(path: &Path, accepted: &[FileType]) -> Result<TaggedFile> {
    Ok(open_tagged_type(path, accepted)?.read()?)
}

pub const VORBIS_TYPES: [FileType; 2] = [FileType::Flac, FileType::Vorbis];

/// VorbisComments of a FLAC or Ogg Vorbis file, including FLAC pictures.
/// A file without comments yields an empty set.
pub fn read_vorbis(path: &Path, accepted: &[FileType]) -> Result<VorbisComments> {
    let tagged = open_tagged(path, accepted)?;
    Ok(tagged
        .tag(TagType::VorbisComments)
        .cloned()
        .map(VorbisComments::from)
        .unwrap_or_default())
}

pub fn write_vorbis(path: &Path, comments: &VorbisComments) -> Result<()> {
    comments.save_to_path(path, WriteOptions::default())?;
    Ok(())
}

/// Set each entry, replacing existing values; empty entries remove the key.
pub fn apply_vorbis(comments: &mut VorbisComments, entries: &[TagEntry]) {
    for entry in entries {
        if entry.is_empty() {
            comments.remove(&entry.key).for_each(drop);
        } else {
            comments.insert(entry.key.clone(), entry.value.clone());
        }
    }
}

/// `key = value` lines with lowercased keys.
pub fn vorbis_lines(comments: &VorbisComments) -> Vec<String> {
    comments
        .items()
        .map(|(key, value)| format!("{} = {}", key.to_lowercase(), value))
        .collect()
}

/// `*.flac` files directly inside `dir`, sorted by name.
pub fn flac_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ToolError::invalid_input(format!(
            "path is not a directory: {}",
            dir.display()
        )));
    }
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "flac"))
        .collect();
    files.sort();
    Ok(files)
}
