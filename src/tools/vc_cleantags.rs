//! Remove VorbisComment keys from a FLAC or Ogg Vorbis file.

use crate::config::{CommonArgs, ToolboxConfig};
use crate::core::tags::{read_vorbis, write_vorbis, VORBIS_TYPES};
use crate::utils::error::Result;
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Parser)]
#[command(name = "vc-cleantags", about = "Remove VorbisComment tags from a file")]
pub struct VcCleantagsArgs {
    pub file: PathBuf,

    /// Tag keys to remove (case-insensitive)
    pub keys: Vec<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub async fn run(args: VcCleantagsArgs, _config: ToolboxConfig) -> Result<()> {
    let removed = vc_cleantags(&args.file, &args.keys)?;
    tracing::info!("Removed {} values from {}", removed, args.file.display());
    Ok(())
}

/// Returns the number of removed values. The file is left untouched when
/// nothing matched.
pub fn vc_cleantags(path: &Path, keys: &[String]) -> Result<usize> {
    let mut comments = read_vorbis(path, &VORBIS_TYPES)?;
    if keys.is_empty() {
        return Ok(0);
    }

    let removed: usize = keys
        .iter()
        .map(|key| comments.remove(&key.to_lowercase()).count())
        .sum();
    if removed > 0 {
        write_vorbis(path, &comments)?;
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tags::testing::flac_bytes;
    use crate::core::tags::{apply_vorbis, TagEntry};

    #[test]
    fn test_removes_keys_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.flac");
        std::fs::write(&path, flac_bytes()).unwrap();

        let mut comments = read_vorbis(&path, &VORBIS_TYPES).unwrap();
        apply_vorbis(
            &mut comments,
            &[
                TagEntry::new("comment", "ripped by someone"),
                TagEntry::new("ripper", "eac"),
                TagEntry::new("title", "Keep me"),
            ],
        );
        write_vorbis(&path, &comments).unwrap();

        let keys = vec!["COMMENT".to_string(), "Ripper".to_string(), "missing".to_string()];
        assert_eq!(vc_cleantags(&path, &keys).unwrap(), 2);

        let comments = read_vorbis(&path, &VORBIS_TYPES).unwrap();
        assert_eq!(comments.get("comment"), None);
        assert_eq!(comments.get("ripper"), None);
        assert_eq!(comments.get("title"), Some("Keep me"));
    }

    #[test]
    fn test_no_keys_is_noop_but_checks_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.flac");
        std::fs::write(&path, flac_bytes()).unwrap();
        assert_eq!(vc_cleantags(&path, &[]).unwrap(), 0);

        assert!(vc_cleantags(&dir.path().join("missing.flac"), &[]).is_err());
    }
}
