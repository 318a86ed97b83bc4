//! Waybar module showing the current MPD track via `mpc`.

use crate::config::{CommonArgs, MediaConfig, ToolboxConfig};
use crate::core::process::SystemRunner;
use crate::domain::model::CommandSpec;
use crate::domain::ports::CommandRunner;
use crate::tools::waybar::{emit, html_escape, WaybarStatus};
use crate::utils::error::Result;
use clap::Parser;
use std::time::Duration;
use tokio::net::TcpStream;

const CLASS: &str = "MusicPD";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Parser)]
#[command(name = "waybar-musicpd", about = "Emit MPD status lines for waybar")]
pub struct WaybarMusicpdArgs {
    /// Print a single status line and exit
    #[arg(long)]
    pub once: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpdErrorKind {
    Generic,
    Empty,
    Malformed,
    HostUnavailable,
    Unknown,
}

impl MpdErrorKind {
    /// Empty replies and an unreachable host are expected (no playlist, laptop offline).
    pub fn is_critical(self) -> bool {
        !matches!(self, Self::Empty | Self::HostUnavailable)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MpdEndpoint {
    pub host: String,
    pub port: u16,
}

impl MpdEndpoint {
    /// `MPD_HOST` / `MPD_PORT` override the configured values.
    pub fn from_env(cfg: &MediaConfig) -> Self {
        let host = std::env::var("MPD_HOST").unwrap_or_else(|_| cfg.mpd_host.clone());
        let port = std::env::var("MPD_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(cfg.mpd_port);
        Self { host, port }
    }
}

pub async fn run(args: WaybarMusicpdArgs, config: ToolboxConfig) -> Result<()> {
    let runner = SystemRunner;
    let endpoint = MpdEndpoint::from_env(&config.media);
    tracing::debug!("Using MPD at {}:{}", endpoint.host, endpoint.port);

    loop {
        let (status, failed) = refresh(&runner, &endpoint).await;
        if let Err(e) = emit(&mut std::io::stdout().lock(), &status) {
            tracing::info!("Stdout closed ({}), exiting", e);
            return Ok(());
        }

        if args.once {
            return Ok(());
        }

        let delay = refresh_delay(&config.media, failed);
        tokio::time::sleep(Duration::from_secs(delay)).await;
    }
}

/// Seconds until the next refresh.
pub fn refresh_delay(media: &MediaConfig, failed: bool) -> u64 {
    if failed {
        // Most likely lost connectivity to the server.
        media.refresh_secs.saturating_mul(media.offline_backoff)
    } else {
        media.refresh_secs
    }
}

pub async fn is_host_available(endpoint: &MpdEndpoint) -> bool {
    let connect = TcpStream::connect((endpoint.host.as_str(), endpoint.port));
    match tokio::time::timeout(CONNECT_TIMEOUT, connect).await {
        Ok(Ok(_stream)) => true,
        Ok(Err(e)) => {
            tracing::debug!("MPD connect failed: {}", e);
            false
        }
        Err(_) => false,
    }
}

/// Query one format string for the current song.
pub async fn call_mpc<R: CommandRunner>(
    runner: &R,
    format: &str,
) -> std::result::Result<String, MpdErrorKind> {
    let spec = CommandSpec::new("mpc")
        .arg(format!("--format={}", format))
        .arg("current")
        .capture();

    let output = runner.run(&spec).await.map_err(|e| {
        tracing::debug!("mpc failed to run: {}", e);
        MpdErrorKind::Unknown
    })?;

    if !output.success() {
        let stderr = output.stderr_text();
        let first = stderr.lines().next().unwrap_or("").trim_end();
        return Err(if first.starts_with("MPD error:") {
            MpdErrorKind::Generic
        } else {
            MpdErrorKind::Unknown
        });
    }

    let lines = output.stdout_lines();
    match lines.as_slice() {
        [] => Err(MpdErrorKind::Empty),
        [line] => Ok(line.trim_end().to_string()),
        _ => Err(MpdErrorKind::Malformed),
    }
}

/// Returns the status and whether an MPD error occurred.
pub async fn refresh<R: CommandRunner>(runner: &R, endpoint: &MpdEndpoint) -> (WaybarStatus, bool) {
    let result = if is_host_available(endpoint).await {
        query_song(runner).await
    } else {
        Err(MpdErrorKind::HostUnavailable)
    };

    match result {
        Ok(song) => (format_song(&song), false),
        Err(kind) => {
            if kind.is_critical() {
                tracing::error!("Critical MPD error: {:?}", kind);
            }
            (WaybarStatus::new(CLASS, "silence", None), true)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    pub artist: String,
    pub title: Option<String>,
    pub album: Option<String>,
}

pub async fn query_song<R: CommandRunner>(runner: &R) -> std::result::Result<Song, MpdErrorKind> {
    let artist = call_mpc(runner, "%artist%").await?;
    // Title and album are best effort once an artist is known.
    let title = call_mpc(runner, "%title%").await.ok();
    let album = match title {
        Some(_) => call_mpc(runner, "%album%").await.ok(),
        None => None,
    };

    Ok(Song {
        artist,
        title,
        album,
    })
}

pub fn format_song(song: &Song) -> WaybarStatus {
    let Some(title) = &song.title else {
        return WaybarStatus::new(CLASS, "silence", None);
    };

    let tooltip = song
        .album
        .as_ref()
        .map(|album| html_escape(&format!("{} - [{}] {}", song.artist, album, title)));

    WaybarStatus::new(
        CLASS,
        html_escape(&format!("{} - {}", song.artist, title)),
        tooltip,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::process::testing::{failed, ok_stdout, ScriptedRunner};

    #[test]
    fn test_error_criticality() {
        assert!(!MpdErrorKind::Empty.is_critical());
        assert!(!MpdErrorKind::HostUnavailable.is_critical());
        assert!(MpdErrorKind::Generic.is_critical());
        assert!(MpdErrorKind::Malformed.is_critical());
        assert!(MpdErrorKind::Unknown.is_critical());
    }

    #[test]
    fn test_refresh_delay_backs_off_without_overflow() {
        let media = MediaConfig {
            refresh_secs: 2,
            offline_backoff: 5,
            ..MediaConfig::default()
        };
        assert_eq!(refresh_delay(&media, false), 2);
        assert_eq!(refresh_delay(&media, true), 10);

        let media = MediaConfig {
            refresh_secs: u64::MAX / 2,
            offline_backoff: 3,
            ..MediaConfig::default()
        };
        assert_eq!(refresh_delay(&media, true), u64::MAX);
    }

    #[tokio::test]
    async fn test_call_mpc_classification() {
        let runner = ScriptedRunner::with_outputs(vec![
            ok_stdout("Boards of Canada\n"),
            ok_stdout(""),
            ok_stdout("a\nb\n"),
            failed(1, "MPD error: Connection refused\n"),
            failed(1, "segfault\n"),
        ]);

        assert_eq!(call_mpc(&runner, "%artist%").await.unwrap(), "Boards of Canada");
        assert_eq!(call_mpc(&runner, "%artist%").await, Err(MpdErrorKind::Empty));
        assert_eq!(call_mpc(&runner, "%artist%").await, Err(MpdErrorKind::Malformed));
        assert_eq!(call_mpc(&runner, "%artist%").await, Err(MpdErrorKind::Generic));
        assert_eq!(call_mpc(&runner, "%artist%").await, Err(MpdErrorKind::Unknown));

        let calls = runner.calls();
        assert_eq!(calls[0].args, vec!["--format=%artist%", "current"]);
    }

    #[tokio::test]
    async fn test_query_song_tolerates_missing_album() {
        let runner = ScriptedRunner::with_outputs(vec![
            ok_stdout("Artist\n"),
            ok_stdout("Title\n"),
            ok_stdout(""),
        ]);

        let song = query_song(&runner).await.unwrap();
        assert_eq!(song.title.as_deref(), Some("Title"));
        assert_eq!(song.album, None);

        let status = format_song(&song);
        assert_eq!(status.text, "Artist - Title");
        assert_eq!(status.tooltip, None);
    }

    #[test]
    fn test_format_song_escapes_markup() {
        let song = Song {
            artist: "Simon & Garfunkel".to_string(),
            title: Some("<Live>".to_string()),
            album: Some("Central Park".to_string()),
        };

        let status = format_song(&song);
        assert_eq!(status.text, "Simon &amp; Garfunkel - &lt;Live&gt;");
        assert_eq!(
            status.tooltip.as_deref(),
            Some("Simon &amp; Garfunkel - [Central Park] &lt;Live&gt;")
        );
        assert_eq!(status.class, "MusicPD");
    }

    #[test]
    fn test_format_song_without_title() {
        let song = Song {
            artist: "Artist".to_string(),
            title: None,
            album: None,
        };
        assert_eq!(format_song(&song).text, "silence");
    }

    #[tokio::test]
    async fn test_refresh_unreachable_host() {
        let runner = ScriptedRunner::default();
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let endpoint = MpdEndpoint {
            host: "127.0.0.1".to_string(),
            port,
        };
        let (status, failed) = refresh(&runner, &endpoint).await;

        assert!(failed);
        assert_eq!(status.text, "silence");
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_reachable_host() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let _ = listener.accept().await;
        });

        let runner = ScriptedRunner::with_outputs(vec![
            ok_stdout("Artist\n"),
            ok_stdout("Title\n"),
            ok_stdout("Album\n"),
        ]);
        let endpoint = MpdEndpoint {
            host: "127.0.0.1".to_string(),
            port,
        };

        let (status, failed) = refresh(&runner, &endpoint).await;
        assert!(!failed);
        assert_eq!(status.text, "Artist - Title");
        assert_eq!(runner.calls().len(), 3);
    }
}
