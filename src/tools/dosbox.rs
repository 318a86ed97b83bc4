//! Launch DOSBox with a fluidsynth MIDI backend running alongside.

use crate::config::{CommonArgs, DosboxConfig, ToolboxConfig};
use crate::core::process::{build_command, spawn_error, terminate, SystemRunner};
use crate::domain::model::CommandSpec;
use crate::domain::ports::CommandRunner;
use crate::utils::error::{Result, ToolError};
use crate::utils::validation::require_file;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::Stdio;

#[derive(Debug, Clone, Parser)]
#[command(name = "dosbox-wrap", about = "Run DOSBox with fluidsynth for MIDI")]
pub struct DosboxArgs {
    /// DOSBox configuration file
    pub config: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub fn synth_spec(cfg: &DosboxConfig) -> CommandSpec {
    CommandSpec::new("fluidsynth")
        .args([
            "-a",
            "pulseaudio",
            "-m",
            "alsa_seq",
            "-o",
            "midi.autoconnect=1",
            "-g",
            "1.0",
        ])
        .arg(cfg.soundfont.to_string_lossy())
}

pub fn dosbox_spec(config_file: &Path, cfg: &DosboxConfig) -> CommandSpec {
    CommandSpec::new("dosbox")
        .arg("-conf")
        .arg(config_file.to_string_lossy())
        .env("SDL_AUDIODRIVER", "pulse")
        .env("SDL_VIDEODRIVER", "wayland")
        .env("LD_LIBRARY_PATH", cfg.library_path.to_string_lossy())
}

pub async fn run(args: DosboxArgs, config: ToolboxConfig) -> Result<()> {
    require_file(&args.config)?;
    let output = run_with_synth(
        &synth_spec(&config.dosbox),
        &dosbox_spec(&args.config, &config.dosbox),
        &SystemRunner,
    )
    .await?;

    println!("info: fluidsynth output:");
    for line in output.lines() {
        println!("{}", line);
    }
    Ok(())
}

/// Run `main` while `synth` is alive, then stop the synth and return its stdout.
pub async fn run_with_synth<R: CommandRunner>(
    synth: &CommandSpec,
    main: &CommandSpec,
    runner: &R,
) -> Result<String> {
    let child = build_command(synth)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| spawn_error(&synth.program, e))?;

    let main_result = runner.run(main).await;

    terminate(&child);
    let output = child.wait_with_output().await?;

    let main_output = main_result?;
    if !main_output.success() {
        tracing::warn!("{} exited with {:?}", main.program, main_output.code);
    }

    if output.stdout.is_empty() && !output.stderr.is_empty() {
        tracing::debug!("{} stderr: {}", synth.program, String::from_utf8_lossy(&output.stderr));
    }
    String::from_utf8(output.stdout).map_err(|e| {
        ToolError::invalid_input(format!("{} produced invalid UTF-8: {}", synth.program, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::process::testing::ScriptedRunner;

    #[test]
    fn test_specs() {
        let cfg = DosboxConfig {
            soundfont: PathBuf::from("/usr/share/sounds/sf2/FluidR3_GM.sf2"),
            library_path: PathBuf::from("/home/u/local/lib"),
        };

        assert_eq!(
            synth_spec(&cfg).display(),
            "fluidsynth -a pulseaudio -m alsa_seq -o midi.autoconnect=1 -g 1.0 /usr/share/sounds/sf2/FluidR3_GM.sf2"
        );

        let dosbox = dosbox_spec(Path::new("game.conf"), &cfg);
        assert_eq!(dosbox.args, vec!["-conf", "game.conf"]);
        assert!(dosbox
            .env
            .contains(&("LD_LIBRARY_PATH".to_string(), "/home/u/local/lib".to_string())));
        assert!(dosbox
            .env
            .contains(&("SDL_VIDEODRIVER".to_string(), "wayland".to_string())));
    }

    #[tokio::test]
    async fn test_synth_is_stopped_after_main() {
        let synth = CommandSpec::new("sh").args(["-c", "echo ready; exec sleep 30"]);
        let main = CommandSpec::new("dosbox");
        let runner = ScriptedRunner::default();

        let started = std::time::Instant::now();
        let output = run_with_synth(&synth, &main, &runner).await.unwrap();

        assert!(started.elapsed() < std::time::Duration::from_secs(20));
        assert_eq!(runner.calls().len(), 1);
        // The synth may be terminated before it prints anything.
        assert!(output.is_empty() || output == "ready\n");
    }
}
