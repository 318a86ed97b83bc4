use anyhow::Result;
use tempfile::TempDir;
use tjtools::tools::checksum::{self, ShaEntry};
use tjtools::ToolError;

fn album(temp_dir: &TempDir) -> Result<std::path::PathBuf> {
    let dir = temp_dir.path().join("Some Album");
    std::fs::create_dir(&dir)?;
    for (idx, len) in [(1, 10_000usize), (2, 1), (3, 70_000)] {
        let data: Vec<u8> = (0..len).map(|i| (i * idx) as u8).collect();
        std::fs::write(dir.join(format!("{:02} - Track.flac", idx)), data)?;
    }
    std::fs::write(dir.join("old.md5"), "ignored")?;
    Ok(dir)
}

#[tokio::test]
async fn test_manifest_without_m3u() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = album(&temp_dir)?;

    let manifest = checksum::sha_scan(&dir).await?;
    assert_eq!(
        manifest.file_name().and_then(|n| n.to_str()),
        Some("00 Some Album (1).sha")
    );

    let entries: Vec<ShaEntry> = std::fs::read_to_string(&manifest)?
        .lines()
        .map(ShaEntry::parse)
        .collect::<Result<_, _>>()?;
    let names: Vec<&str> = entries.iter().map(|e| e.filename.as_str()).collect();
    assert_eq!(names, vec!["01 - Track.flac", "02 - Track.flac", "03 - Track.flac"]);
    assert_eq!(entries[2].size, 70_000);

    let summary = checksum::sha_check(&manifest).await?;
    assert_eq!(summary.files, 3);
    assert_eq!(summary.bytes, 80_001);
    Ok(())
}

#[tokio::test]
async fn test_truncated_file_is_detected() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = album(&temp_dir)?;
    let manifest = checksum::sha_scan(&dir).await?;

    std::fs::write(dir.join("03 - Track.flac"), b"")?;

    let err = checksum::sha_check(&manifest).await.unwrap_err();
    assert!(matches!(err, ToolError::Mismatch { .. }));
    assert_eq!(err.exit_code(), 5);
    Ok(())
}

#[tokio::test]
async fn test_malformed_manifest() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let manifest = temp_dir.path().join("broken.sha");
    std::fs::write(&manifest, "twelve deadbeef file.flac\n")?;

    assert!(checksum::sha_check(&manifest).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_subdirectories_are_ignored() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = album(&temp_dir)?;
    std::fs::create_dir(dir.join("Scans"))?;
    std::fs::write(dir.join("Scans/front.jpg"), "jpeg")?;

    let manifest = checksum::sha_scan(&dir).await?;
    let summary = checksum::sha_check(&manifest).await?;
    assert_eq!(summary.files, 3);
    Ok(())
}
