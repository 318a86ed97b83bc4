//! Waybar module showing the cmus track.

use crate::config::{CommonArgs, ToolboxConfig};
use crate::core::process::SystemRunner;
use crate::domain::model::CommandSpec;
use crate::domain::ports::CommandRunner;
use crate::tools::waybar::{emit, WaybarStatus};
use crate::utils::error::Result;
use clap::Parser;
use std::time::Duration;

const CLASS: &str = "CMus";

#[derive(Debug, Clone, Parser)]
#[command(name = "waybar-cmus", about = "Emit cmus status lines for waybar")]
pub struct WaybarCmusArgs {
    /// Print a single status line and exit
    #[arg(long)]
    pub once: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CmusQuery {
    pub status: Option<String>,
    pub artist: Option<String>,
    pub title: Option<String>,
    pub album: Option<String>,
}

pub async fn run(args: WaybarCmusArgs, config: ToolboxConfig) -> Result<()> {
    let runner = SystemRunner;
    let delay = Duration::from_secs(config.media.refresh_secs);

    loop {
        let status = refresh(&runner).await;
        if let Err(e) = emit(&mut std::io::stdout().lock(), &status) {
            tracing::info!("Stdout closed ({}), exiting", e);
            return Ok(());
        }

        if args.once {
            return Ok(());
        }
        tokio::time::sleep(delay).await;
    }
}

pub async fn refresh<R: CommandRunner>(runner: &R) -> WaybarStatus {
    let spec = CommandSpec::new("cmus-remote").arg("-Q").capture();

    let query = match runner.run(&spec).await {
        Ok(output) if output.success() && !output.stdout.is_empty() => {
            Some(parse_query(&output.stdout_text()))
        }
        Ok(_) => None,
        Err(e) => {
            tracing::debug!("cmus query failed: {}", e);
            None
        }
    };

    format_status(query.as_ref())
}

pub fn parse_query(output: &str) -> CmusQuery {
    let mut query = CmusQuery::default();

    for line in output.lines().map(str::trim_end) {
        if let Some(status) = line.strip_prefix("status ") {
            query.status = Some(status.to_string());
        } else if let Some(artist) = line.strip_prefix("tag artist ") {
            query.artist = Some(artist.to_string());
        } else if let Some(title) = line.strip_prefix("tag title ") {
            query.title = Some(title.to_string());
        } else if let Some(album) = line.strip_prefix("tag album ") {
            query.album = Some(album.to_string());
        }
    }

    query
}

pub fn format_status(query: Option<&CmusQuery>) -> WaybarStatus {
    let fixed = |text: &str| WaybarStatus::new(CLASS, text, Some(text.to_string()));

    let Some(query) = query else {
        return fixed("offline");
    };

    match query.status.as_deref() {
        None => return fixed("offline"),
        Some("paused") => return fixed("silence"),
        Some(_) => {}
    }

    let (Some(artist), Some(title)) = (&query.artist, &query.title) else {
        return fixed("unknown");
    };

    let tooltip = query
        .album
        .as_ref()
        .map(|album| format!("{} - [{}] {}", artist, album, title));

    WaybarStatus::new(CLASS, format!("{} - {}", artist, title), tooltip)
}
