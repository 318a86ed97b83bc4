//! Tracked-file backups: maintain the file list, create encrypted archives
//! and expire old ones.

use crate::config::{BackupConfig, CommonArgs, ToolboxConfig};
use crate::core::process::SystemRunner;
use crate::domain::model::CommandSpec;
use crate::domain::ports::CommandRunner;
use crate::utils::error::{Result, ToolError};
use crate::utils::fs::normalize_lexically;
use chrono::{Local, TimeZone, Utc};
use clap::{ArgGroup, Parser};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, Parser)]
#[command(name = "backup-manage", about = "Manage tracked files and backup archives")]
#[command(group(ArgGroup::new("operation").required(true)))]
pub struct BackupArgs {
    /// Write an empty tracking configuration
    #[arg(long, group = "operation")]
    pub init: bool,

    /// Start tracking a file
    #[arg(long, group = "operation", value_name = "FILE")]
    pub add_file: Option<PathBuf>,

    /// Stop tracking a file
    #[arg(long, group = "operation", value_name = "FILE")]
    pub remove_file: Option<PathBuf>,

    /// Show whether a file is tracked
    #[arg(long, group = "operation", value_name = "FILE")]
    pub status: Option<PathBuf>,

    /// List the tracked files
    #[arg(long, group = "operation")]
    pub dump_files: bool,

    /// Drop tracked files that no longer exist
    #[arg(long, group = "operation")]
    pub clean_files: bool,

    /// Create an encrypted archive of the tracked files
    #[arg(long, group = "operation")]
    pub backup_files: bool,

    /// List the archives of this host
    #[arg(long, group = "operation")]
    pub backup_status: bool,

    /// Remove archives older than DAYS, always keeping the newest
    #[arg(long, group = "operation", value_name = "DAYS")]
    pub backup_clean: Option<u64>,

    /// Synchronize the archive directory
    #[arg(long, group = "operation")]
    pub sync: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// The tracking file (`config.json` in the backup prefix).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackingConfig {
    pub files: Vec<String>,
    pub prefix: String,
    pub timestamp: i64,
    pub includes: Vec<String>,
}

/// Tracking file of another user/root referenced through `includes`.
#[derive(Debug, Clone, Deserialize)]
pub struct IncludeConfig {
    pub files: Vec<String>,
    pub prefix: String,
}

impl TrackingConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        // Missing keys surface as a verification failure rather than a parse error.
        serde_json::from_str(&data).map_err(|e| {
            ToolError::mismatch(format!("config verify failed for {}: {}", path.display(), e))
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    fn normalized_prefix(&self) -> String {
        if self.prefix.ends_with('/') {
            self.prefix.clone()
        } else {
            format!("{}/", self.prefix)
        }
    }

    /// Path relative to the prefix, or an error if the file lies outside it.
    pub fn track_path(&self, path: &Path) -> Result<String> {
        let absolute = normalize_lexically(&std::path::absolute(path)?);
        let absolute = absolute.to_string_lossy();
        absolute
            .strip_prefix(&self.normalized_prefix())
            .map(str::to_string)
            .ok_or_else(|| ToolError::invalid_input(format!("file not in prefix: {}", absolute)))
    }

    pub fn is_tracked(&self, path: &Path) -> Result<bool> {
        let track = self.track_path(path)?;
        Ok(self.files.contains(&track))
    }

    pub fn add(&mut self, path: &Path) -> Result<String> {
        if !path.is_file() {
            return Err(ToolError::invalid_input(format!(
                "file not found: {}",
                path.display()
            )));
        }
        let track = self.track_path(path)?;
        if self.files.contains(&track) {
            return Err(ToolError::invalid_input(format!(
                "file already tracked: {}",
                track
            )));
        }
        self.files.push(track.clone());
        Ok(track)
    }

    pub fn remove(&mut self, path: &Path) -> Result<String> {
        let track = self.track_path(path)?;
        let Some(pos) = self.files.iter().position(|f| *f == track) else {
            return Err(ToolError::invalid_input(format!("file not tracked: {}", track)));
        };
        self.files.remove(pos);
        Ok(track)
    }

    /// Remove entries whose file is gone, returning them.
    pub fn clean(&mut self) -> Vec<String> {
        let prefix = self.prefix.clone();
        let (keep, removed): (Vec<String>, Vec<String>) = self
            .files
            .drain(..)
            .partition(|f| Path::new(&format!("{}/{}", prefix, f)).exists());
        self.files = keep;
        removed
    }

    /// Absolute paths of tracked files plus those of every include.
    pub fn archive_list(&self) -> Result<Vec<String>> {
        let mut list: Vec<String> = self
            .files
            .iter()
            .map(|f| format!("{}/{}", self.prefix, f))
            .collect();

        for include in &self.includes {
            let path = Path::new(include).join("local/backup/config.json");
            let data = std::fs::read_to_string(&path)?;
            let inc: IncludeConfig = serde_json::from_str(&data).map_err(|e| {
                ToolError::mismatch(format!("include verify failed for {}: {}", path.display(), e))
            })?;
            list.extend(inc.files.iter().map(|f| format!("{}/{}", inc.prefix, f)));
        }

        Ok(list)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    pub name: String,
    pub timestamp: i64,
}

impl Archive {
    pub fn file_name(hostname: &str, timestamp: i64) -> String {
        format!("{}_{}-data.tar.xz.gpg", hostname, timestamp)
    }

    pub fn age_days(&self, now: i64) -> i64 {
        (now - self.timestamp) / SECONDS_PER_DAY
    }

    pub fn local_date(&self) -> String {
        match Local.timestamp_opt(self.timestamp, 0).single() {
            Some(dt) => dt.format("%a %b %e %H:%M:%S %Y").to_string(),
            None => self.timestamp.to_string(),
        }
    }
}

/// Archives of `hostname` in `names`, newest first.
pub fn find_archives<I, S>(hostname: &str, names: I) -> Result<Vec<Archive>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let re = Regex::new(&format!(
        r"^{}_([0-9]+)-data\.tar\.xz\.gpg$",
        regex::escape(hostname)
    ))?;

    let mut archives: Vec<Archive> = names
        .into_iter()
        .filter_map(|name| {
            let name = name.as_ref();
            let ts = re.captures(name)?.get(1)?.as_str().parse().ok()?;
            Some(Archive {
                name: name.to_string(),
                timestamp: ts,
            })
        })
        .collect();

    archives.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(archives)
}

/// Archives to delete: never the newest, only those strictly older than `max_age` days.
pub fn expired_archives(archives: &[Archive], max_age: u64, now: i64) -> Vec<Archive> {
    archives
        .iter()
        .skip(1)
        .filter(|a| a.age_days(now) > max_age as i64)
        .cloned()
        .collect()
}

pub fn hostname() -> Result<String> {
    sysinfo::System::host_name().ok_or_else(|| ToolError::not_found("hostname"))
}

fn list_archive_dir(dir: &Path) -> Result<Vec<String>> {
    Ok(std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect())
}

pub async fn run(args: BackupArgs, config: ToolboxConfig) -> Result<()> {
    let manager = BackupManager::new(config.backup, hostname()?);
    manager.dispatch(args, &SystemRunner).await
}

pub struct BackupManager {
    cfg: BackupConfig,
    hostname: String,
}

impl BackupManager {
    pub fn new(cfg: BackupConfig, hostname: String) -> Self {
        Self { cfg, hostname }
    }

    fn tracking(&self) -> Result<TrackingConfig> {
        TrackingConfig::load(&self.cfg.tracking_file())
    }

    pub async fn dispatch<R: CommandRunner>(&self, args: BackupArgs, runner: &R) -> Result<()> {
        if args.init {
            self.init()
        } else if let Some(path) = args.add_file {
            let mut tracking = self.tracking()?;
            let track = tracking.add(&path)?;
            tracking.save(&self.cfg.tracking_file())?;
            println!("info: add-file: now tracking: {}", track);
            Ok(())
        } else if let Some(path) = args.remove_file {
            let mut tracking = self.tracking()?;
            let track = tracking.remove(&path)?;
            tracking.save(&self.cfg.tracking_file())?;
            println!("info: remove-file: stopped tracking: {}", track);
            Ok(())
        } else if let Some(path) = args.status {
            let tracked = self.tracking()?.is_tracked(&path)?;
            println!(
                "info: status: file {} tracked",
                if tracked { "is" } else { "is not" }
            );
            Ok(())
        } else if args.dump_files {
            println!("info: dump-files: tracking the following files:");
            for file in &self.tracking()?.files {
                println!("  {}", file);
            }
            Ok(())
        } else if args.clean_files {
            let mut tracking = self.tracking()?;
            for file in tracking.clean() {
                println!("info: clean-files: removing: {}", file);
            }
            tracking.save(&self.cfg.tracking_file())
        } else if args.backup_files {
            self.backup_files(runner, Utc::now().timestamp()).await.map(|_| ())
        } else if args.backup_status {
            self.backup_status(Utc::now().timestamp())
        } else if let Some(days) = args.backup_clean {
            self.backup_clean(days, Utc::now().timestamp()).map(|_| ())
        } else if args.sync {
            self.sync(runner).await
        } else {
            Err(ToolError::invalid_input("no operation selected"))
        }
    }

    pub fn init(&self) -> Result<()> {
        let path = self.cfg.tracking_file();
        if path.exists() {
            return Err(ToolError::invalid_input(format!(
                "tracking config already exists: {}",
                path.display()
            )));
        }
        std::fs::create_dir_all(&self.cfg.prefix)?;
        println!("info: writing (empty) standard config");
        TrackingConfig::default().save(&path)
    }

    /// Returns the path of the new archive.
    pub async fn backup_files<R: CommandRunner>(&self, runner: &R, timestamp: i64) -> Result<PathBuf> {
        let mut tracking = self.tracking()?;
        println!("info: backup-files: timestamp = {}", timestamp);

        let mut list = tempfile::NamedTempFile::new()?;
        for entry in tracking.archive_list()? {
            writeln!(list, "{}", entry)?;
        }
        list.flush()?;

        let archive = self
            .cfg
            .archive_dir
            .join(Archive::file_name(&self.hostname, timestamp));
        if archive.exists() {
            return Err(ToolError::invalid_input(format!(
                "archive already exists: {}",
                archive.display()
            )));
        }
        let spec = CommandSpec::new(self.cfg.archive_script_path().to_string_lossy())
            .arg(list.path().to_string_lossy())
            .stdout_to(&archive);

        match runner.run_checked(&spec).await {
            Ok(_) => {}
            // Lost a race against another writer; the file is not ours.
            Err(ToolError::IoError(e)) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(ToolError::IoError(e));
            }
            Err(e) => {
                // Don't leave a truncated archive behind.
                let _ = std::fs::remove_file(&archive);
                return Err(e);
            }
        }

        tracking.timestamp = timestamp;
        tracking.save(&self.cfg.tracking_file())?;
        tracing::info!("Created archive {}", archive.display());
        Ok(archive)
    }

    pub fn backup_status(&self, now: i64) -> Result<()> {
        let archives = find_archives(&self.hostname, list_archive_dir(&self.cfg.archive_dir)?)?;
        if archives.is_empty() {
            tracing::warn!("backup-status: no backups present");
            return Ok(());
        }

        println!("info: backup-status: listing backup dates:");
        for archive in &archives {
            println!("\t{} ({} days ago)", archive.local_date(), archive.age_days(now));
        }
        Ok(())
    }

    /// Returns the removed archives.
    pub fn backup_clean(&self, max_age: u64, now: i64) -> Result<Vec<Archive>> {
        if max_age < self.cfg.min_clean_age_days {
            return Err(ToolError::invalid_input(format!(
                "age has to be {} or greater",
                self.cfg.min_clean_age_days
            )));
        }

        let archives = find_archives(&self.hostname, list_archive_dir(&self.cfg.archive_dir)?)?;
        if archives.len() <= 1 {
            return Err(ToolError::invalid_input(
                "only one backup (or less) available",
            ));
        }

        let expired = expired_archives(&archives, max_age, now);
        println!("info: backup-clean: removing following backups:");
        for archive in &expired {
            println!("\t{} ({} days ago)", archive.local_date(), archive.age_days(now));
            std::fs::remove_file(self.cfg.archive_dir.join(&archive.name))?;
        }
        Ok(expired)
    }

    pub async fn sync<R: CommandRunner>(&self, runner: &R) -> Result<()> {
        println!("info: sync: syncing archive directory");
        let spec = CommandSpec::new(&self.cfg.sync_program)
            .arg("--path")
            .arg(self.cfg.archive_dir.to_string_lossy());
        runner.run_checked(&spec).await.map(|_| ())
    }
}
