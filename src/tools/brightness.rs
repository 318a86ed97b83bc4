//! Backlight brightness control through sysfs.

use crate::config::{BacklightConfig, CommonArgs, ToolboxConfig};
use crate::core::sysfs::{
    decode_le, encode_le_minimal, get_parent_device, read_sysfs_int, write_sysfs,
};
use crate::utils::error::{Result, ToolError};
use clap::{ArgGroup, Parser};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Parser)]
#[command(name = "brightness", about = "Save, restore and modify the backlight brightness")]
#[command(group(ArgGroup::new("operation").required(true)))]
pub struct BrightnessArgs {
    /// Save the current brightness to the state file
    #[arg(long, group = "operation")]
    pub save: bool,

    /// Restore the brightness from the state file
    #[arg(long, group = "operation")]
    pub restore: bool,

    /// Modify the brightness by a signed value
    #[arg(long, group = "operation", value_name = "VALUE", allow_hyphen_values = true)]
    pub modify: Option<i64>,

    /// Set the powersave brightness
    #[arg(long, group = "operation")]
    pub powersave: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Save,
    Restore,
    Modify(i64),
    Powersave,
}

impl BrightnessArgs {
    pub fn operation(&self) -> Operation {
        if let Some(delta) = self.modify {
            Operation::Modify(delta)
        } else if self.save {
            Operation::Save
        } else if self.restore {
            Operation::Restore
        } else {
            Operation::Powersave
        }
    }
}

pub async fn run(args: BrightnessArgs, config: ToolboxConfig) -> Result<()> {
    let backlight = Backlight::lookup(&config.backlight)?;
    backlight.apply(args.operation(), &config.backlight)
}

/// A located backlight node.
#[derive(Debug, Clone)]
pub struct Backlight {
    node: PathBuf,
}

impl Backlight {
    /// Find the node under the sysfs base whose name starts with the prefix
    /// and whose parent device matches the configured vendor/device ids.
    pub fn lookup(cfg: &BacklightConfig) -> Result<Self> {
        let not_found = || ToolError::not_found(format!("backlight node '{}*'", cfg.prefix));

        if !cfg.sysfs_base.is_dir() {
            return Err(not_found());
        }

        let mut entries: Vec<PathBuf> = std::fs::read_dir(&cfg.sysfs_base)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect();
        entries.sort();

        for path in entries {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if !name.starts_with(&cfg.prefix) || !path.is_symlink() {
                continue;
            }

            let Some(parent) = get_parent_device(&path) else {
                continue;
            };

            if identify(&parent, cfg) {
                tracing::debug!("Using backlight node {}", path.display());
                return Ok(Self { node: path });
            }
        }

        Err(not_found())
    }

    pub fn brightness(&self) -> Result<u64> {
        Ok(read_sysfs_int(&self.node.join("brightness"))?.max(0) as u64)
    }

    pub fn max_brightness(&self) -> Result<u64> {
        Ok(read_sysfs_int(&self.node.join("max_brightness"))?.max(0) as u64)
    }

    pub fn set_brightness(&self, value: u64) -> Result<()> {
        write_sysfs(&self.node.join("brightness"), value)
    }

    pub fn apply(&self, op: Operation, cfg: &BacklightConfig) -> Result<()> {
        match op {
            Operation::Modify(delta) => self.modify(delta),
            Operation::Save => self.save(&cfg.state_file),
            Operation::Restore => self.restore(&cfg.state_file),
            Operation::Powersave => {
                tracing::info!("Setting powersave brightness {}", cfg.powersave_value);
                self.set_brightness(cfg.powersave_value)
            }
        }
    }

    fn modify(&self, delta: i64) -> Result<()> {
        let state = self.brightness()?;
        let max_state = self.max_brightness()?;
        let target = clamp_brightness((state as i64).saturating_add(delta), max_state);

        tracing::debug!("Brightness {} -> {} (max {})", state, target, max_state);
        self.set_brightness(target)
    }

    fn save(&self, state_file: &Path) -> Result<()> {
        let state = self.brightness()?;
        std::fs::write(state_file, encode_le_minimal(state))?;
        tracing::info!("Saved brightness {} to {}", state, state_file.display());
        Ok(())
    }

    fn restore(&self, state_file: &Path) -> Result<()> {
        if !state_file.is_file() {
            tracing::debug!("No saved brightness at {}", state_file.display());
            return Ok(());
        }

        let state = decode_le(&std::fs::read(state_file)?);
        std::fs::remove_file(state_file)?;

        let max_state = self.max_brightness()?;
        let target = clamp_brightness(state.min(i64::MAX as u64) as i64, max_state);
        tracing::info!("Restoring brightness {}", target);
        self.set_brightness(target)
    }
}

fn identify(parent: &Path, cfg: &BacklightConfig) -> bool {
    let vendor = read_sysfs_int(&parent.join("vendor"));
    let device = read_sysfs_int(&parent.join("device"));

    match (vendor, device) {
        (Ok(vendor), Ok(device)) => {
            vendor == i64::from(cfg.vendor_id) && device == i64::from(cfg.device_id)
        }
        _ => false,
    }
}

pub fn clamp_brightness(value: i64, max_state: u64) -> u64 {
    if value < 0 {
        0
    } else {
        (value as u64).min(max_state)
    }
}
