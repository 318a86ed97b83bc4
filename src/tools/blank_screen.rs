//! Switch off the internal panel of a user's sway session, e.g. from an
//! ACPI lid handler running as root.

use crate::config::{CommonArgs, SwayConfig, ToolboxConfig};
use crate::core::sway::{
    active_user, connect_to, current_uid, power_command, sway_socket, uid_for_user,
    OutputControl,
};
use crate::utils::error::Result;
use clap::Parser;
use std::path::Path;

#[derive(Debug, Clone, Parser)]
#[command(name = "blank-screen", about = "Blank the screen of a sway session")]
pub struct BlankScreenArgs {
    /// Blank the session of this user instead of the calling one
    #[arg(long, conflicts_with = "active")]
    pub user: Option<String>,

    /// Blank the session of the user logged in on the active seat
    #[arg(long)]
    pub active: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub async fn run(args: BlankScreenArgs, config: ToolboxConfig) -> Result<()> {
    let uid = match (&args.user, args.active) {
        (Some(name), _) => Some(uid_for_user(name)?),
        (None, true) => active_user().await?,
        (None, false) => Some(current_uid()),
    };
    let Some(uid) = uid else {
        tracing::info!("No active graphical session");
        return Ok(());
    };

    let cfg = config.sway.clone();
    tokio::task::spawn_blocking(move || blank_user(&cfg, uid)).await??;
    Ok(())
}

/// Blank the configured output of `uid`'s sway session. Returns false when
/// the user runs no sway.
pub fn blank_user(cfg: &SwayConfig, uid: u32) -> Result<bool> {
    let Some(socket) = sway_socket(&cfg.run_dir, uid)? else {
        tracing::info!("No sway session for uid {}", uid);
        return Ok(false);
    };
    let mut conn = connect_to(&socket)?;
    blank(&mut conn, &cfg.blank_output, &socket)?;
    Ok(true)
}

pub fn blank<C: OutputControl>(ctl: &mut C, output: &str, socket: &Path) -> Result<()> {
    tracing::debug!("Blanking {} via {}", output, socket.display());
    ctl.command(&power_command(output, false))
}
