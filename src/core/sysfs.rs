use crate::utils::error::{Result, ToolError};
use std::path::{Path, PathBuf};

fn is_parent_device(path: &Path) -> bool {
    ["class", "vendor", "device"]
        .iter()
        .all(|attr| path.join(attr).is_file())
}

/// Follow `device` links upwards until a node exposing `class`, `vendor` and
/// `device` attributes is found.
pub fn get_parent_device(path: &Path) -> Option<PathBuf> {
    let mut current = path.to_path_buf();

    loop {
        if is_parent_device(&current) {
            return Some(current);
        }

        let next = current.join("device");
        if !next.is_symlink() {
            return None;
        }
        current = next;
    }
}

/// Read an attribute, trimming the trailing newline. `None` on any failure.
pub fn read_sysfs(path: &Path) -> Option<String> {
    std::fs::read_to_string(path)
        .ok()
        .map(|data| data.trim_end().to_string())
}

/// Read an integer attribute. Values with a `0x` prefix are parsed as hex.
pub fn read_sysfs_int(path: &Path) -> Result<i64> {
    let raw = read_sysfs(path).ok_or_else(|| ToolError::SysfsError {
        path: path.to_path_buf(),
        message: "attribute not readable".to_string(),
    })?;

    let parsed = match raw.strip_prefix("0x") {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => raw.parse::<i64>(),
    };

    parsed.map_err(|e| ToolError::SysfsError {
        path: path.to_path_buf(),
        message: format!("malformed value '{}': {}", raw, e),
    })
}

pub fn read_sysfs_bool(path: &Path) -> Option<bool> {
    read_sysfs(path).map(|value| value == "1")
}

pub fn write_sysfs(path: &Path, value: impl std::fmt::Display) -> Result<()> {
    std::fs::write(path, value.to_string()).map_err(|e| ToolError::SysfsError {
        path: path.to_path_buf(),
        message: format!("write failed: {}", e),
    })
}

pub fn write_sysfs_bool(path: &Path, value: bool) -> Result<()> {
    write_sysfs(path, if value { "1" } else { "0" })
}

/// Encode as the minimal number of little-endian bytes (zero encodes as no bytes).
pub fn encode_le_minimal(value: u64) -> Vec<u8> {
    let bytes = value.to_le_bytes();
    let len = 8 - (value.leading_zeros() as usize / 8);
    bytes[..len].to_vec()
}

pub fn decode_le(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .take(8)
        .enumerate()
        .fold(0, |acc, (i, b)| acc | (u64::from(*b) << (8 * i)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_device_via_symlinks() {
        let root = tempfile::tempdir().unwrap();
        let pci = root.path().join("pci0000");
        std::fs::create_dir(&pci).unwrap();
        for (attr, value) in [("class", "0x030000"), ("vendor", "0x1002"), ("device", "0x15bf")] {
            std::fs::write(pci.join(attr), format!("{}\n", value)).unwrap();
        }

        let node = root.path().join("amdgpu_bl0");
        std::fs::create_dir(&node).unwrap();
        std::os::unix::fs::symlink(&pci, node.join("device")).unwrap();

        let parent = get_parent_device(&node).unwrap();
        assert_eq!(read_sysfs_int(&parent.join("vendor")).unwrap(), 0x1002);
    }

    #[test]
    fn test_parent_device_missing() {
        let root = tempfile::tempdir().unwrap();
        assert!(get_parent_device(root.path()).is_none());
    }

    #[test]
    fn test_read_and_write() {
        let root = tempfile::tempdir().unwrap();
        let attr = root.path().join("brightness");
        write_sysfs(&attr, 42).unwrap();

        assert_eq!(read_sysfs(&attr).as_deref(), Some("42"));
        assert_eq!(read_sysfs_int(&attr).unwrap(), 42);
        assert!(read_sysfs(&root.path().join("missing")).is_none());

        std::fs::write(&attr, "garbage\n").unwrap();
        assert!(read_sysfs_int(&attr).is_err());
    }

    #[test]
    fn test_le_encoding() {
        assert_eq!(encode_le_minimal(0), Vec::<u8>::new());
        assert_eq!(encode_le_minimal(112), vec![112]);
        assert_eq!(encode_le_minimal(0x1234), vec![0x34, 0x12]);
        assert_eq!(decode_le(&[0x34, 0x12]), 0x1234);
        assert_eq!(decode_le(&[]), 0);
        assert_eq!(decode_le(&[1]), 1);
    }
}
