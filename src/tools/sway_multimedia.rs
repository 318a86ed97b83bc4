//! Multimedia key handler for sway: forwards the keys to mpd via mpc.

use crate::config::{CommonArgs, ToolboxConfig};
use crate::core::process::SystemRunner;
use crate::domain::model::CommandSpec;
use crate::domain::ports::CommandRunner;
use crate::utils::error::Result;
use clap::{ArgGroup, Parser};

#[derive(Debug, Clone, Parser)]
#[command(name = "sway-multimedia", about = "Wrapper for multimedia keys")]
#[command(group(ArgGroup::new("key").required(true)))]
pub struct SwayMultimediaArgs {
    /// Toggle play/pause
    #[arg(long, group = "key")]
    pub play: bool,

    /// Next track
    #[arg(long, group = "key")]
    pub next: bool,

    /// Previous track
    #[arg(long, group = "key")]
    pub prev: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKey {
    Play,
    Next,
    Prev,
}

impl MediaKey {
    pub fn mpc_command(self) -> &'static str {
        match self {
            Self::Play => "toggle",
            Self::Next => "next",
            Self::Prev => "prev",
        }
    }
}

impl SwayMultimediaArgs {
    pub fn key(&self) -> MediaKey {
        if self.next {
            MediaKey::Next
        } else if self.prev {
            MediaKey::Prev
        } else {
            MediaKey::Play
        }
    }
}

pub async fn run(args: SwayMultimediaArgs, config: ToolboxConfig) -> Result<()> {
    press(&SystemRunner, &config.sway.mpc_program, args.key()).await
}

pub async fn press<R: CommandRunner>(runner: &R, mpc: &str, key: MediaKey) -> Result<()> {
    let spec = CommandSpec::new(mpc)
        .args(["--quiet", key.mpc_command()])
        .capture();
    runner.run_checked(&spec).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::process::testing::{failed, ScriptedRunner};
    use crate::utils::error::ToolError;

    #[tokio::test]
    async fn test_keys_map_to_mpc() {
        let runner = ScriptedRunner::default();
        for key in [MediaKey::Play, MediaKey::Next, MediaKey::Prev] {
            press(&runner, "mpc", key).await.unwrap();
        }
        let calls: Vec<String> = runner.calls().iter().map(|c| c.display()).collect();
        assert_eq!(
            calls,
            vec!["mpc --quiet toggle", "mpc --quiet next", "mpc --quiet prev"]
        );
    }

    #[tokio::test]
    async fn test_mpc_failure_is_reported() {
        let runner = ScriptedRunner::with_outputs(vec![failed(1, "error: Connection refused")]);
        let err = press(&runner, "mpc", MediaKey::Next).await.unwrap_err();
        assert!(matches!(err, ToolError::ProcessError { code: Some(1), .. }));
    }

    #[test]
    fn test_args_select_key() {
        let args = SwayMultimediaArgs::try_parse_from(["sway-multimedia", "--prev"]).unwrap();
        assert_eq!(args.key(), MediaKey::Prev);
        assert!(SwayMultimediaArgs::try_parse_from(["sway-multimedia"]).is_err());
        assert!(SwayMultimediaArgs::try_parse_from(["sway-multimedia", "--play", "--next"]).is_err());
    }
}
