pub mod cli;
pub mod toml_config;

pub use cli::CommonArgs;
pub use toml_config::{
    AudioConfig, BacklightConfig, BackupConfig, BatteryConfig, CompressConfig, CpuProfile,
    CpufreqConfig, DosboxConfig, MediaConfig, SwayConfig, TagsConfig, ToolboxConfig,
};
