//! CPU core onlining and boost profiles.

use crate::config::{CommonArgs, CpuProfile, CpufreqConfig, ToolboxConfig};
use crate::core::sysfs::{read_sysfs, read_sysfs_bool, write_sysfs_bool};
use crate::utils::error::{Result, ToolError};
use clap::{ArgGroup, Parser};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Parser)]
#[command(name = "cpufreq-perf", about = "Switch CPU core/boost performance profiles")]
#[command(group(ArgGroup::new("operation").required(true)))]
pub struct CpufreqArgs {
    /// Initialize the core map used for cpufreq control
    #[arg(long, group = "operation")]
    pub init: bool,

    /// Save the current online/boost state
    #[arg(long, group = "operation")]
    pub save: bool,

    /// Restore the saved online/boost state
    #[arg(long, group = "operation")]
    pub restore: bool,

    /// Apply a named profile (e.g. low, mid, high)
    #[arg(long, group = "operation", value_name = "PROFILE")]
    pub set: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// `cpuN -> (online, core_id)`, serialized as a JSON object of 2-element arrays.
pub type CoreMap = BTreeMap<String, (bool, u32)>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedState {
    pub online_status: BTreeMap<String, bool>,
    pub boost_status: bool,
}

pub async fn run(args: CpufreqArgs, config: ToolboxConfig) -> Result<()> {
    let cfg = &config.cpufreq;

    if args.init {
        let map = scan_core_map(&cfg.sysfs_base)?;
        tracing::info!("Found {} CPUs", map.len());
        write_json(&cfg.map_file, &map)
    } else if args.save {
        save_state(cfg)
    } else if args.restore {
        restore_state(cfg)
    } else if let Some(profile) = args.set.as_deref() {
        set_profile(cfg, profile)
    } else {
        Err(ToolError::invalid_input("no operation selected"))
    }
}

pub fn is_cpu_name(name: &str) -> bool {
    name.strip_prefix("cpu")
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

fn cpu_dirs(base: &Path) -> Result<Vec<String>> {
    let mut names: Vec<String> = std::fs::read_dir(base)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| is_cpu_name(name))
        .collect();
    names.sort();
    Ok(names)
}

/// Collect every CPU exposing both `online` and `topology/core_id`.
pub fn scan_core_map(base: &Path) -> Result<CoreMap> {
    let mut map = CoreMap::new();

    for name in cpu_dirs(base)? {
        let dir = base.join(&name);
        let online = read_sysfs_bool(&dir.join("online"));
        let core_id = read_sysfs(&dir.join("topology/core_id")).and_then(|v| v.parse().ok());

        if let (Some(online), Some(core_id)) = (online, core_id) {
            map.insert(name, (online, core_id));
        }
    }

    Ok(map)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let data = std::fs::read_to_string(path).map_err(|e| {
        ToolError::invalid_input(format!("failed to read {} {}: {}", what, path.display(), e))
    })?;
    Ok(serde_json::from_str(&data)?)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    std::fs::write(path, serde_json::to_string(value)?)?;
    Ok(())
}

fn boost_path(cfg: &CpufreqConfig) -> std::path::PathBuf {
    cfg.sysfs_base.join("cpufreq/boost")
}

pub fn save_state(cfg: &CpufreqConfig) -> Result<()> {
    let core_map: CoreMap = read_json(&cfg.map_file, "core map")?;

    let mut online_status = BTreeMap::new();
    for name in cpu_dirs(&cfg.sysfs_base)? {
        if !core_map.contains_key(&name) {
            continue;
        }
        if let Some(online) = read_sysfs_bool(&cfg.sysfs_base.join(&name).join("online")) {
            online_status.insert(name, online);
        }
    }

    let boost_status = read_sysfs_bool(&boost_path(cfg))
        .ok_or_else(|| ToolError::not_found("cpufreq boost attribute"))?;

    write_json(
        &cfg.state_file,
        &SavedState {
            online_status,
            boost_status,
        },
    )
}

pub fn restore_state(cfg: &CpufreqConfig) -> Result<()> {
    let core_map: CoreMap = read_json(&cfg.map_file, "core map")?;
    let state: SavedState = read_json(&cfg.state_file, "saved state")?;

    for name in core_map.keys() {
        let Some(online) = state.online_status.get(name) else {
            tracing::warn!("CPU {} missing in online status", name);
            continue;
        };

        if let Err(e) = config_cpu(&cfg.sysfs_base, name, *online) {
            tracing::warn!("Skipping CPU {} (failed to config: {})", name, e);
        }
    }

    write_sysfs_bool(&boost_path(cfg), state.boost_status)
}

fn config_cpu(base: &Path, cpu: &str, online: bool) -> Result<()> {
    let dir = base.join(cpu);
    if !dir.is_dir() {
        return Err(ToolError::not_found(format!("CPU {}", cpu)));
    }
    write_sysfs_bool(&dir.join("online"), online)
}

pub fn set_profile(cfg: &CpufreqConfig, profile_name: &str) -> Result<()> {
    let core_map: CoreMap = read_json(&cfg.map_file, "core map")?;

    let profile = cfg.profiles.get(profile_name).ok_or_else(|| {
        let known: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
        ToolError::invalid_input(format!(
            "invalid profile selected: {} (known: {})",
            profile_name,
            known.join(", ")
        ))
    })?;

    apply_profile(&cfg.sysfs_base, &core_map, profile)?;
    write_sysfs_bool(&boost_path(cfg), profile.boost)?;

    tracing::info!("Applied profile {}", profile_name);
    Ok(())
}

fn apply_profile(base: &Path, core_map: &CoreMap, profile: &CpuProfile) -> Result<()> {
    for (cpu, (_, core_id)) in core_map {
        let online = profile.cores.contains(core_id);
        config_cpu(base, cpu, online)?;
    }
    Ok(())
}
