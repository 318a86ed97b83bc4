use crate::utils::error::{Result, ToolError};
use crate::utils::fs::expand_home;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolboxConfig {
    pub backlight: BacklightConfig,
    pub battery: BatteryConfig,
    pub cpufreq: CpufreqConfig,
    pub backup: BackupConfig,
    pub media: MediaConfig,
    pub dosbox: DosboxConfig,
    pub compress: CompressConfig,
    pub audio: AudioConfig,
    pub tags: TagsConfig,
    pub sway: SwayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BacklightConfig {
    pub sysfs_base: PathBuf,
    /// Name prefix of the backlight node, e.g. `amdgpu_bl`.
    pub prefix: String,
    pub vendor_id: u32,
    pub device_id: u32,
    pub state_file: PathBuf,
    pub powersave_value: u64,
}

impl Default for BacklightConfig {
    fn default() -> Self {
        Self {
            sysfs_base: PathBuf::from("/sys/class/backlight"),
            prefix: "amdgpu_bl".to_string(),
            vendor_id: 0x1002,
            device_id: 0x15bf,
            state_file: PathBuf::from("/run/acpi_backlight"),
            powersave_value: 112,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatteryConfig {
    pub sysfs_base: PathBuf,
    pub ac_state_file: PathBuf,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            sysfs_base: PathBuf::from("/sys/class/power_supply/BAT0"),
            ac_state_file: PathBuf::from("/run/acpi_acadapter"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuProfile {
    /// Physical core ids that stay online.
    pub cores: Vec<u32>,
    pub boost: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CpufreqConfig {
    pub sysfs_base: PathBuf,
    pub map_file: PathBuf,
    pub state_file: PathBuf,
    pub profiles: BTreeMap<String, CpuProfile>,
}

impl Default for CpufreqConfig {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            "low".to_string(),
            CpuProfile {
                cores: vec![0, 1, 2, 3],
                boost: false,
            },
        );
        profiles.insert(
            "mid".to_string(),
            CpuProfile {
                cores: vec![0, 1, 2, 3],
                boost: true,
            },
        );
        profiles.insert(
            "high".to_string(),
            CpuProfile {
                cores: (0..8).collect(),
                boost: true,
            },
        );

        Self {
            sysfs_base: PathBuf::from("/sys/devices/system/cpu"),
            map_file: PathBuf::from("/run/core_map"),
            state_file: PathBuf::from("/run/cpufreq_config"),
            profiles,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    pub prefix: PathBuf,
    pub archive_dir: PathBuf,
    /// Script receiving the file list path, writing the encrypted archive to stdout.
    pub archive_script: PathBuf,
    pub min_clean_age_days: u64,
    pub sync_program: String,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            prefix: PathBuf::from("~/local/backup"),
            archive_dir: PathBuf::from("~/local/gdrive"),
            archive_script: PathBuf::from("tar_and_encrypt.sh"),
            min_clean_age_days: 5,
            sync_program: "grive".to_string(),
        }
    }
}

impl BackupConfig {
    pub fn tracking_file(&self) -> PathBuf {
        self.prefix.join("config.json")
    }

    pub fn archive_script_path(&self) -> PathBuf {
        self.prefix.join(&self.archive_script)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub mpv_socket: PathBuf,
    pub mpd_host: String,
    pub mpd_port: u16,
    pub refresh_secs: u64,
    /// Multiplier applied to the refresh delay while MPD is unreachable.
    pub offline_backoff: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            mpv_socket: PathBuf::from("/tmp/mpv.control"),
            mpd_host: "localhost".to_string(),
            mpd_port: 6600,
            refresh_secs: 10,
            offline_backoff: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DosboxConfig {
    pub soundfont: PathBuf,
    pub library_path: PathBuf,
}

impl Default for DosboxConfig {
    fn default() -> Self {
        Self {
            soundfont: PathBuf::from("/usr/share/sounds/sf2/FluidR3_GM.sf2"),
            library_path: PathBuf::from("~/local/lib"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressConfig {
    pub threads: u64,
    pub level: u32,
}

impl Default for CompressConfig {
    fn default() -> Self {
        Self {
            threads: 4,
            level: 22,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub seekpoint_seconds: u64,
    pub jobs: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            seekpoint_seconds: 25,
            jobs: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TagsConfig {
    /// Editor used to collect one tag value per line.
    pub editor: String,
    /// Arguments placed before the file path; the editor must block until closed.
    pub editor_args: Vec<String>,
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self {
            editor: "featherpad".to_string(),
            editor_args: vec!["--standalone".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SwayConfig {
    /// Output switched off by `blank-screen`.
    pub blank_output: String,
    /// Per-user runtime directories (`<run_dir>/<uid>`) holding the IPC sockets.
    pub run_dir: PathBuf,
    pub screenshot_dir: PathBuf,
    pub mpc_program: String,
}

impl Default for SwayConfig {
    fn default() -> Self {
        Self {
            blank_output: "eDP-1".to_string(),
            run_dir: PathBuf::from("/run/user"),
            screenshot_dir: PathBuf::from("~"),
            mpc_program: "mpc".to_string(),
        }
    }
}

impl ToolboxConfig {
    /// Default location: `$XDG_CONFIG_HOME/tjtools/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tjtools").join("config.toml"))
    }

    /// Load the configuration. An explicit path must exist; a missing default
    /// file falls back to the built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => {
                    tracing::debug!("No configuration file found, using defaults");
                    Ok(Self::default().resolved())
                }
            },
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| ToolError::ConfigError {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        let config: Self =
            toml::from_str(&processed_content).map_err(|e| ToolError::ConfigError {
                message: format!("TOML parsing error: {}", e),
            })?;

        Ok(config.resolved())
    }

    /// Replace `${VAR}` with the environment value; unknown variables stay as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}")?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    fn resolved(mut self) -> Self {
        for path in [
            &mut self.backlight.sysfs_base,
            &mut self.backlight.state_file,
            &mut self.battery.sysfs_base,
            &mut self.battery.ac_state_file,
            &mut self.cpufreq.sysfs_base,
            &mut self.cpufreq.map_file,
            &mut self.cpufreq.state_file,
            &mut self.backup.prefix,
            &mut self.backup.archive_dir,
            &mut self.media.mpv_socket,
            &mut self.dosbox.soundfont,
            &mut self.dosbox.library_path,
            &mut self.sway.run_dir,
            &mut self.sway.screenshot_dir,
        ] {
            *path = expand_home(path);
        }
        self
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ToolError::ConfigError {
            message: format!("TOML serialization error: {}", e),
        })
    }
}

impl Validate for ToolboxConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("backlight.sysfs_base", &self.backlight.sysfs_base)?;
        validation::validate_path("backlight.state_file", &self.backlight.state_file)?;
        validation::validate_non_empty_string("backlight.prefix", &self.backlight.prefix)?;

        validation::validate_path("battery.sysfs_base", &self.battery.sysfs_base)?;
        validation::validate_path("battery.ac_state_file", &self.battery.ac_state_file)?;

        validation::validate_path("cpufreq.sysfs_base", &self.cpufreq.sysfs_base)?;
        validation::validate_path("cpufreq.map_file", &self.cpufreq.map_file)?;
        validation::validate_path("cpufreq.state_file", &self.cpufreq.state_file)?;
        for (name, profile) in &self.cpufreq.profiles {
            if profile.cores.is_empty() {
                return Err(ToolError::InvalidConfigValueError {
                    field: format!("cpufreq.profiles.{}.cores", name),
                    value: "[]".to_string(),
                    reason: "At least one core must stay online".to_string(),
                });
            }
        }

        validation::validate_path("backup.prefix", &self.backup.prefix)?;
        validation::validate_path("backup.archive_dir", &self.backup.archive_dir)?;
        validation::validate_path("backup.archive_script", &self.backup.archive_script)?;
        validation::validate_non_empty_string("backup.sync_program", &self.backup.sync_program)?;

        validation::validate_path("media.mpv_socket", &self.media.mpv_socket)?;
        validation::validate_non_empty_string("media.mpd_host", &self.media.mpd_host)?;
        validation::validate_positive_number("media.mpd_port", u64::from(self.media.mpd_port), 1)?;
        validation::validate_positive_number("media.refresh_secs", self.media.refresh_secs, 1)?;
        validation::validate_positive_number("media.offline_backoff", self.media.offline_backoff, 1)?;

        validation::validate_positive_number("compress.threads", self.compress.threads, 1)?;
        validation::validate_range("compress.level", self.compress.level, 1, 22)?;

        validation::validate_positive_number("audio.jobs", self.audio.jobs as u64, 1)?;
        validation::validate_positive_number(
            "audio.seekpoint_seconds",
            self.audio.seekpoint_seconds,
            1,
        )?;

        validation::validate_non_empty_string("tags.editor", &self.tags.editor)?;

        validation::validate_non_empty_string("sway.blank_output", &self.sway.blank_output)?;
        validation::validate_path("sway.run_dir", &self.sway.run_dir)?;
        validation::validate_path("sway.screenshot_dir", &self.sway.screenshot_dir)?;
        validation::validate_non_empty_string("sway.mpc_program", &self.sway.mpc_program)?;

        Ok(())
    }
}
