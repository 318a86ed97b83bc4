pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod tools;
pub mod utils;

pub use config::{CommonArgs, ToolboxConfig};
pub use core::process::SystemRunner;
pub use domain::ports::CommandRunner;
pub use utils::error::{Result, ToolError};
