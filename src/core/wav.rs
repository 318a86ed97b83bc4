//! Minimal RIFF/WAVE reader: header detection and hashing of the PCM `data` chunk.

use crate::utils::error::{Result, ToolError};
use sha2::{Digest, Sha512};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

const RIFF: &[u8; 4] = b"RIFF";
const WAVE: &[u8; 4] = b"WAVE";
const DATA: &[u8; 4] = b"data";

pub fn has_wav_header(header: &[u8]) -> bool {
    header.len() >= 12 && &header[0..4] == RIFF && &header[8..12] == WAVE
}

/// `.wav` suffix and a RIFF/WAVE header.
pub fn is_wav(path: &Path) -> bool {
    if path.extension().and_then(|e| e.to_str()) != Some("wav") {
        return false;
    }
    let mut header = [0u8; 12];
    match File::open(path).and_then(|mut f| f.read_exact(&mut header)) {
        Ok(()) => has_wav_header(&header),
        Err(_) => false,
    }
}

/// SHA-512 over the samples of the `data` chunk. Container metadata (format
/// extensions, LIST chunks) does not affect the result.
pub fn data_chunk_digest(path: &Path) -> Result<Vec<u8>> {
    let invalid = |reason: &str| ToolError::mismatch(format!("{}: {}", path.display(), reason));

    let mut reader = BufReader::new(File::open(path)?);
    let mut header = [0u8; 12];
    reader.read_exact(&mut header)?;
    if !has_wav_header(&header) {
        return Err(invalid("not a RIFF/WAVE file"));
    }

    loop {
        let mut chunk = [0u8; 8];
        if reader.read_exact(&mut chunk).is_err() {
            return Err(invalid("no data chunk"));
        }
        let size = u32::from_le_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]) as u64;

        if &chunk[0..4] == DATA {
            // Streamed files may carry a bogus size; take() stops at EOF.
            let mut hasher = Sha512::new();
            std::io::copy(&mut (&mut reader).take(size), &mut hasher)?;
            return Ok(hasher.finalize().to_vec());
        }

        // Chunks are padded to an even length.
        let skip = size + (size & 1);
        reader.seek(SeekFrom::Current(skip as i64))?;
    }
}


#[cfg(test)]
mod tests {
    use super::testing::wav_bytes;
    use super::*;

    #[test]
    fn test_header_detection() {
        assert!(has_wav_header(&wav_bytes(&[0, 1], None)));
        assert!(!has_wav_header(b"fLaC\0\0\0\"\x10\0\x10\0"));
        assert!(!has_wav_header(b"RIFF"));
    }

    #[test]
    fn test_is_wav_requires_suffix_and_header() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("a.wav");
        let renamed = dir.path().join("a.raw");
        let fake = dir.path().join("b.wav");
        std::fs::write(&good, wav_bytes(&[1, 2, 3, 4], None)).unwrap();
        std::fs::write(&renamed, wav_bytes(&[1, 2, 3, 4], None)).unwrap();
        std::fs::write(&fake, b"ID3 not really a wave file").unwrap();

        assert!(is_wav(&good));
        assert!(!is_wav(&renamed));
        assert!(!is_wav(&fake));
    }

    #[test]
    fn test_digest_ignores_extra_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("plain.wav");
        let tagged = dir.path().join("tagged.wav");
        let other = dir.path().join("other.wav");
        std::fs::write(&plain, wav_bytes(&[1, 2, 3, 4], None)).unwrap();
        std::fs::write(&tagged, wav_bytes(&[1, 2, 3, 4], Some((b"LIST", b"odd")))).unwrap();
        std::fs::write(&other, wav_bytes(&[1, 2, 3, 5], None)).unwrap();

        let a = data_chunk_digest(&plain).unwrap();
        assert_eq!(a.len(), 64);
        assert_eq!(a, data_chunk_digest(&tagged).unwrap());
        assert_ne!(a, data_chunk_digest(&other).unwrap());
    }

    #[test]
    fn test_missing_data_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.wav");
        let mut bytes = wav_bytes(&[], None);
        bytes.truncate(bytes.len() - 8);
        std::fs::write(&path, bytes).unwrap();

        assert!(matches!(data_chunk_digest(&path), Err(ToolError::Mismatch { .. })));
    }
}
