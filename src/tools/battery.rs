use crate::config::{BatteryConfig, CommonArgs, ToolboxConfig};
use crate::core::sysfs::{decode_le, read_sysfs_int};
use crate::utils::error::{Result, ToolError};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "sway-battery", about = "Print the battery charge and AC adapter state")]
pub struct BatteryArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryStatus {
    pub percent: u64,
    pub plugged_in: bool,
}

impl std::fmt::Display for BatteryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = if self.plugged_in { "plugged in" } else { "unplugged" };
        write!(f, "{}% ({})", self.percent, state)
    }
}

pub async fn run(_args: BatteryArgs, config: ToolboxConfig) -> Result<()> {
    let status = read_battery(&config.battery)?;
    println!("Battery: {}", status);
    Ok(())
}

/// Prefer `charge_*` attributes, fall back to `energy_*`.
pub fn read_battery(cfg: &BatteryConfig) -> Result<BatteryStatus> {
    let not_found = || ToolError::not_found("battery");
    let base = &cfg.sysfs_base;

    let (now, full) = if base.join("charge_now").is_file() {
        (
            read_sysfs_int(&base.join("charge_now")),
            read_sysfs_int(&base.join("charge_full")),
        )
    } else if base.join("energy_now").is_file() {
        (
            read_sysfs_int(&base.join("energy_now")),
            read_sysfs_int(&base.join("energy_full")),
        )
    } else {
        return Err(not_found());
    };

    let (now, full) = match (now, full) {
        (Ok(now), Ok(full)) if full > 0 => (now.max(0) as u64, full as u64),
        _ => return Err(not_found()),
    };

    let ac_state = std::fs::read(&cfg.ac_state_file).map_err(|e| {
        tracing::debug!("Cannot read AC state {}: {}", cfg.ac_state_file.display(), e);
        not_found()
    })?;

    Ok(BatteryStatus {
        percent: now * 100 / full,
        plugged_in: decode_le(&ac_state) != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_battery(root: &std::path::Path, kind: &str, now: u64, full: u64, ac: &[u8]) -> BatteryConfig {
        let base = root.join("BAT0");
        std::fs::create_dir_all(&base).unwrap();
        std::fs::write(base.join(format!("{}_now", kind)), format!("{}\n", now)).unwrap();
        std::fs::write(base.join(format!("{}_full", kind)), format!("{}\n", full)).unwrap();
        std::fs::write(root.join("acpi_acadapter"), ac).unwrap();

        BatteryConfig {
            sysfs_base: base,
            ac_state_file: root.join("acpi_acadapter"),
        }
    }

    #[test]
    fn test_charge_based_reading() {
        let root = tempfile::tempdir().unwrap();
        let cfg = fake_battery(root.path(), "charge", 2500, 5000, &[1]);

        let status = read_battery(&cfg).unwrap();
        assert_eq!(status.to_string(), "50% (plugged in)");
    }

    #[test]
    fn test_energy_based_reading_unplugged() {
        let root = tempfile::tempdir().unwrap();
        let cfg = fake_battery(root.path(), "energy", 41_999, 42_000, &[]);

        let status = read_battery(&cfg).unwrap();
        assert_eq!(status.percent, 99);
        assert!(!status.plugged_in);
        assert_eq!(status.to_string(), "99% (unplugged)");
    }

    #[test]
    fn test_missing_battery() {
        let root = tempfile::tempdir().unwrap();
        let cfg = BatteryConfig {
            sysfs_base: root.path().join("BAT9"),
            ac_state_file: root.path().join("ac"),
        };
        assert!(matches!(read_battery(&cfg), Err(ToolError::NotFound { .. })));
    }

    #[test]
    fn test_missing_ac_state() {
        let root = tempfile::tempdir().unwrap();
        let mut cfg = fake_battery(root.path(), "charge", 1, 2, &[0]);
        cfg.ac_state_file = root.path().join("missing");
        assert!(read_battery(&cfg).is_err());
    }
}
