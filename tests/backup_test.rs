use anyhow::Result;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::TempDir;
use tjtools::config::BackupConfig;
use tjtools::tools::backup::{find_archives, Archive, BackupManager, TrackingConfig};
use tjtools::SystemRunner;

const DAY: i64 = 86_400;

struct Fixture {
    _temp_dir: TempDir,
    cfg: BackupConfig,
    data: std::path::PathBuf,
}

fn fixture() -> Result<Fixture> {
    let temp_dir = TempDir::new()?;
    let prefix = temp_dir.path().join("backup");
    let archive_dir = temp_dir.path().join("archive");
    let data = temp_dir.path().join("data");
    std::fs::create_dir_all(&archive_dir)?;
    std::fs::create_dir_all(data.join("etc"))?;
    std::fs::write(data.join("etc/fstab"), "/dev/sda1 / ext4 defaults 0 1\n")?;
    std::fs::write(data.join("etc/hosts"), "127.0.0.1 localhost\n")?;

    let cfg = BackupConfig {
        prefix,
        archive_dir,
        archive_script: "archive.sh".into(),
        min_clean_age_days: 5,
        sync_program: "true".to_string(),
    };

    Ok(Fixture {
        _temp_dir: temp_dir,
        cfg,
        data,
    })
}

fn write_script(path: &Path) -> Result<()> {
    std::fs::write(path, "#!/bin/sh\nexec tar -cf - -T \"$1\" 2>/dev/null\n")?;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[tokio::test]
async fn test_track_and_archive() -> Result<()> {
    let fx = fixture()?;
    let manager = BackupManager::new(fx.cfg.clone(), "testhost".to_string());
    manager.init()?;
    assert!(manager.init().is_err(), "init must not overwrite");
    write_script(&fx.cfg.archive_script_path())?;

    let mut tracking = TrackingConfig::load(&fx.cfg.tracking_file())?;
    tracking.prefix = fx.data.to_string_lossy().into_owned();
    tracking.add(&fx.data.join("etc/fstab"))?;
    tracking.add(&fx.data.join("etc/hosts"))?;
    tracking.save(&fx.cfg.tracking_file())?;

    let archive = manager.backup_files(&SystemRunner, 1_700_000_000).await?;

    assert_eq!(
        archive.file_name().and_then(|n| n.to_str()),
        Some("testhost_1700000000-data.tar.xz.gpg")
    );
    let meta = std::fs::metadata(&archive)?;
    assert!(meta.len() >= 1024);
    assert_eq!(meta.permissions().mode() & 0o777, 0o640);

    let tracking = TrackingConfig::load(&fx.cfg.tracking_file())?;
    assert_eq!(tracking.timestamp, 1_700_000_000);
    assert_eq!(tracking.files, vec!["etc/fstab", "etc/hosts"]);
    Ok(())
}

#[tokio::test]
async fn test_failed_script_leaves_no_archive() -> Result<()> {
    let fx = fixture()?;
    let manager = BackupManager::new(fx.cfg.clone(), "testhost".to_string());
    manager.init()?;
    std::fs::write(fx.cfg.archive_script_path(), "#!/bin/sh\nexit 2\n")?;
    std::fs::set_permissions(
        fx.cfg.archive_script_path(),
        std::fs::Permissions::from_mode(0o755),
    )?;

    assert!(manager.backup_files(&SystemRunner, 42).await.is_err());
    assert!(std::fs::read_dir(&fx.cfg.archive_dir)?.next().is_none());
    Ok(())
}

#[tokio::test]
async fn test_clean_keeps_newest() -> Result<()> {
    let fx = fixture()?;
    let now = 1_700_000_000;
    for days in [40, 12, 6, 1] {
        let name = Archive::file_name("testhost", now - days * DAY);
        std::fs::write(fx.cfg.archive_dir.join(name), "x")?;
    }
    std::fs::write(fx.cfg.archive_dir.join(Archive::file_name("other", 0)), "x")?;

    let manager = BackupManager::new(fx.cfg.clone(), "testhost".to_string());
    assert!(manager.backup_clean(3, now).is_err(), "below minimum age");

    let removed = manager.backup_clean(10, now)?;
    assert_eq!(removed.len(), 2);

    let names: Vec<String> = std::fs::read_dir(&fx.cfg.archive_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    let left = find_archives("testhost", &names)?;
    assert_eq!(left.len(), 2);
    assert_eq!(left[0].timestamp, now - DAY);
    assert!(names.iter().any(|n| n.starts_with("other_")));
    Ok(())
}

#[tokio::test]
async fn test_clean_requires_two_archives() -> Result<()> {
    let fx = fixture()?;
    std::fs::write(
        fx.cfg.archive_dir.join(Archive::file_name("testhost", 0)),
        "x",
    )?;

    let manager = BackupManager::new(fx.cfg.clone(), "testhost".to_string());
    assert!(manager.backup_clean(5, 100 * DAY).is_err());
    assert!(fx.cfg.archive_dir.join(Archive::file_name("testhost", 0)).exists());
    Ok(())
}

#[tokio::test]
async fn test_sync_runs_program() -> Result<()> {
    let fx = fixture()?;
    let manager = BackupManager::new(fx.cfg.clone(), "testhost".to_string());
    manager.sync(&SystemRunner).await?;

    let failing = BackupConfig {
        sync_program: "false".to_string(),
        ..fx.cfg.clone()
    };
    let manager = BackupManager::new(failing, "testhost".to_string());
    assert!(manager.sync(&SystemRunner).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_existing_archive_is_never_removed() -> Result<()> {
    let fx = fixture()?;
    let manager = BackupManager::new(fx.cfg.clone(), "testhost".to_string());
    manager.init()?;
    write_script(&fx.cfg.archive_script_path())?;

    let existing = fx.cfg.archive_dir.join(Archive::file_name("testhost", 1000));
    std::fs::write(&existing, "previous archive")?;

    assert!(manager.backup_files(&SystemRunner, 1000).await.is_err());
    assert_eq!(std::fs::read_to_string(&existing)?, "previous archive");
    Ok(())
}
