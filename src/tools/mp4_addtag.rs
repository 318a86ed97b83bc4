//! Set or list ReplayGain freeform atoms of an MP4/M4A file.

use crate::config::{CommonArgs, ToolboxConfig};
use crate::core::tags::{open_tagged_type, parse_entries, TagEntry};
use crate::utils::error::{Result, ToolError};
use clap::Parser;
use lofty::config::{ParseOptions, WriteOptions};
use lofty::file::{AudioFile, FileType};
use lofty::mp4::{Atom, AtomData, AtomIdent, Ilst, Mp4File};
use lofty::tag::TagExt;
use std::borrow::Cow;
use std::fs::File;
use std::path::{Path, PathBuf};

const ITUNES_MEAN: &str = "com.apple.iTunes";

const CANONICAL_KEYS: [(&str, &str); 15] = [
    ("\u{a9}alb", "album"),
    ("\u{a9}nam", "title"),
    ("\u{a9}ART", "artist"),
    ("aART", "album artist"),
    ("\u{a9}wrt", "composer"),
    ("\u{a9}day", "year"),
    ("\u{a9}cmt", "comment"),
    ("\u{a9}gen", "genre"),
    ("\u{a9}des", "description"),
    ("\u{a9}too", "encoded by"),
    ("disk", "disknumber"),
    ("trkn", "tracknumber"),
    ("pgap", "part of gapless album"),
    ("tmpo", "tempo/BPM"),
    ("cpil", "part of a compilation"),
];

#[derive(Debug, Clone, Parser)]
#[command(name = "mp4-addtag", about = "Add MP4 tags to a file")]
pub struct Mp4AddtagArgs {
    /// File to edit
    #[arg(short, long)]
    pub file: PathBuf,

    /// Tag in the format key:value; only ReplayGain keys are accepted
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub async fn run(args: Mp4AddtagArgs, _config: ToolboxConfig) -> Result<()> {
    let entries = parse_entries(&args.tags)?;
    let mut ilst = read_ilst(&args.file)?;

    if entries.is_empty() {
        if ilst.is_empty() {
            tracing::info!("No tags found: {}", args.file.display());
        }
        for line in ilst_lines(&ilst) {
            println!("{}", line);
        }
        return Ok(());
    }

    for entry in apply_replaygain(&mut ilst, &entries) {
        tracing::warn!("Skipping invalid entry: {}", entry.key);
    }
    ilst.save_to_path(&args.file, WriteOptions::default())?;
    Ok(())
}

/// The `ilst` atom list of an MP4 file; empty if the file has none.
pub fn read_ilst(path: &Path) -> Result<Ilst> {
    require_mp4(path)?;
    let mut reader = File::open(path)?;
    let mp4 = Mp4File::read_from(&mut reader, ParseOptions::new())?;
    Ok(mp4.ilst().cloned().unwrap_or_default())
}

fn freeform(key: &str) -> AtomIdent<'static> {
    AtomIdent::Freeform {
        mean: Cow::Borrowed(ITUNES_MEAN),
        name: Cow::Owned(key.to_string()),
    }
}

/// Set or remove the ReplayGain entries as iTunes freeform atoms. Returns
/// the entries that were skipped.
pub fn apply_replaygain(ilst: &mut Ilst, entries: &[TagEntry]) -> Vec<TagEntry> {
    let mut skipped = Vec::new();
    for entry in entries {
        if !entry.is_replaygain() {
            skipped.push(entry.clone());
            continue;
        }
        let ident = freeform(&entry.key);
        ilst.remove(&ident).for_each(drop);
        if !entry.is_empty() {
            ilst.insert(Atom::new(ident, AtomData::UTF8(entry.value.clone())));
        }
    }
    skipped
}

/// Human readable name of an atom identifier.
pub fn canonical_key(ident: &AtomIdent<'_>) -> String {
    match ident {
        AtomIdent::Fourcc(code) => {
            let code: String = code.iter().map(|&b| char::from(b)).collect();
            CANONICAL_KEYS
                .iter()
                .find(|(fourcc, _)| *fourcc == code)
                .map(|(_, name)| name.to_string())
                .unwrap_or_else(|| format!("unknown tag key: {}", code))
        }
        AtomIdent::Freeform { mean, name } if mean == ITUNES_MEAN => name.to_string(),
        AtomIdent::Freeform { mean, name } => {
            format!("unknown freeform key: ----:{}:{}", mean, name)
        }
    }
}

/// Printable form of an atom value; `None` for pictures and binary data.
pub fn value_to_string(data: &AtomData) -> Option<String> {
    match data {
        AtomData::UTF8(s) | AtomData::UTF16(s) => Some(s.clone()),
        AtomData::SignedInteger(i) => Some(i.to_string()),
        AtomData::UnsignedInteger(u) => Some(u.to_string()),
        AtomData::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
        _ => None,
    }
}

/// Number pair atoms (`trkn`, `disk`) hold big endian `current/total`.
fn pair_to_string(data: &AtomData) -> Option<String> {
    match data {
        AtomData::Unknown { data, .. } if data.len() >= 6 => {
            let current = u16::from_be_bytes([data[2], data[3]]);
            let total = u16::from_be_bytes([data[4], data[5]]);
            Some(format!("{}/{}", current, total))
        }
        _ => None,
    }
}

/// `key = value` lines; unprintable atoms are skipped with a warning.
pub fn ilst_lines(ilst: &Ilst) -> Vec<String> {
    let mut lines = Vec::new();
    for atom in ilst {
        let key = canonical_key(atom.ident());
        let values: Vec<String> = atom
            .data()
            .filter_map(|d| value_to_string(d).or_else(|| pair_to_string(d)))
            .collect();
        if values.is_empty() {
            tracing::warn!("Skipping tag with key: {}", key);
            continue;
        }
        lines.push(format!("{} = {}", key, values.join(", ")));
    }
    lines
}

/// Error unless `path` is an MP4 container.
pub fn require_mp4(path: &Path) -> Result<()> {
    open_tagged_type(path, &[FileType::Mp4]).map(|_| ()).map_err(|e| match e {
        ToolError::TagError(_) => ToolError::invalid_input(format!(
            "input file has unsupported type: {}",
            path.display()
        )),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_key() {
        assert_eq!(canonical_key(&AtomIdent::Fourcc(*b"\xa9alb")), "album");
        assert_eq!(canonical_key(&AtomIdent::Fourcc(*b"trkn")), "tracknumber");
        assert_eq!(canonical_key(&AtomIdent::Fourcc(*b"xxxx")), "unknown tag key: xxxx");
        assert_eq!(canonical_key(&freeform("replaygain_track_gain")), "replaygain_track_gain");
        assert_eq!(
            canonical_key(&AtomIdent::Freeform {
                mean: Cow::Borrowed("org.example"),
                name: Cow::Borrowed("x"),
            }),
            "unknown freeform key: ----:org.example:x"
        );
    }

    #[test]
    fn test_apply_and_print() {
        let mut ilst = Ilst::default();
        ilst.insert(Atom::new(
            AtomIdent::Fourcc(*b"\xa9nam"),
            AtomData::UTF8("Overture".to_string()),
        ));
        ilst.insert(Atom::new(
            AtomIdent::Fourcc(*b"trkn"),
            AtomData::Unknown {
                code: 0.into(),
                data: vec![0, 0, 0, 3, 0, 12, 0, 0],
            },
        ));

        let skipped = apply_replaygain(
            &mut ilst,
            &[
                TagEntry::new("replaygain_album_gain", "-8.00 dB"),
                TagEntry::new("comment", "nope"),
            ],
        );
        assert_eq!(skipped, vec![TagEntry::new("comment", "nope")]);

        apply_replaygain(&mut ilst, &[TagEntry::new("replaygain_album_gain", "-9.00 dB")]);

        let lines = ilst_lines(&ilst);
        assert!(lines.contains(&"title = Overture".to_string()));
        assert!(lines.contains(&"tracknumber = 3/12".to_string()));
        assert!(lines.contains(&"replaygain_album_gain = -9.00 dB".to_string()));
        assert_eq!(lines.len(), 3);

        apply_replaygain(&mut ilst, &[TagEntry::new("replaygain_album_gain", "")]);
        assert!(!ilst_lines(&ilst).iter().any(|l| l.starts_with("replaygain")));
    }

    #[test]
    fn test_rejects_non_mp4() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.m4a");
        std::fs::write(&path, b"not a container").unwrap();
        assert!(require_mp4(&path).is_err());
        assert!(read_ilst(&path).is_err());
    }
}
