//! Screenshots under sway with grim, either of the focused output or of an
//! area picked with slurp.

use crate::config::{CommonArgs, ToolboxConfig};
use crate::core::process::SystemRunner;
use crate::core::sway::{connect, focused_output};
use crate::domain::model::CommandSpec;
use crate::domain::ports::CommandRunner;
use crate::utils::error::{Result, ToolError};
use chrono::{DateTime, Local};
use clap::{ArgGroup, Parser};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Parser)]
#[command(name = "swayshot", about = "Take a screenshot under sway")]
#[command(group(ArgGroup::new("mode").required(true)))]
pub struct SwayshotArgs {
    /// Capture the focused output
    #[arg(long, group = "mode")]
    pub full: bool,

    /// Capture an area selected with the mouse
    #[arg(long, group = "mode")]
    pub select: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub async fn run(args: SwayshotArgs, config: ToolboxConfig) -> Result<()> {
    let path = save_path(&config.sway.screenshot_dir, Local::now());
    let runner = SystemRunner;

    if args.full {
        let focused = tokio::task::spawn_blocking(|| {
            let mut conn = connect()?;
            focused_output(&mut conn)
        })
        .await??;
        runner
            .run_checked(&full_spec(focused.as_deref(), &path))
            .await?;
    } else {
        select_shot(&runner, &path).await?;
    }
    println!("{}", path.display());
    Ok(())
}

pub fn save_path(dir: &Path, now: DateTime<Local>) -> PathBuf {
    dir.join(now.format("screenshot_%Y-%m-%d-%H%M%S.png").to_string())
}

/// grim on the focused output, or on all outputs if none is focused.
pub fn full_spec(focused: Option<&str>, path: &Path) -> CommandSpec {
    let spec = CommandSpec::new("grim");
    let spec = match focused {
        Some(name) => spec.args(["-o", name]),
        None => spec,
    };
    spec.arg(path.to_string_lossy()).capture()
}

pub async fn select_shot<R: CommandRunner>(runner: &R, path: &Path) -> Result<()> {
    let output = runner
        .run_checked(&CommandSpec::new("slurp").capture())
        .await?;
    let lines = output.stdout_lines();
    let [area] = lines.as_slice() else {
        return Err(ToolError::invalid_input(format!(
            "malformed slurp result ({} lines)",
            lines.len()
        )));
    };

    let grim = CommandSpec::new("grim")
        .args(["-g", area.trim_end()])
        .arg(path.to_string_lossy())
        .capture();
    runner.run_checked(&grim).await?;
    Ok(())
}
