//! Subprocess execution on top of `tokio::process`.

use crate::domain::model::{CommandOutput, CommandSpec, OutputMode};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{Result, ToolError};
use async_trait::async_trait;
use std::os::unix::fs::OpenOptionsExt;
use std::process::Stdio;
use tokio::process::Command;

/// Runner that spawns real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

pub fn build_command(spec: &CommandSpec) -> Command {
    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args).stdin(Stdio::null());
    if let Some(dir) = &spec.cwd {
        cmd.current_dir(dir);
    }
    for (key, value) in &spec.env {
        cmd.env(key, value);
    }
    cmd
}

pub fn spawn_error(program: &str, source: std::io::Error) -> ToolError {
    ToolError::SpawnError {
        program: program.to_string(),
        source,
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        tracing::debug!("Running: {}", spec.display());
        let mut cmd = build_command(spec);

        match &spec.output {
            OutputMode::Inherit => {
                let status = cmd
                    .status()
                    .await
                    .map_err(|e| spawn_error(&spec.program, e))?;
                Ok(CommandOutput {
                    code: status.code(),
                    ..CommandOutput::default()
                })
            }
            OutputMode::Capture => {
                let output = cmd
                    .output()
                    .await
                    .map_err(|e| spawn_error(&spec.program, e))?;
                Ok(CommandOutput {
                    code: output.status.code(),
                    stdout: output.stdout,
                    stderr: output.stderr,
                })
            }
            OutputMode::File(path) => {
                let file = std::fs::OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .mode(0o640)
                    .open(path)?;
                let status = cmd
                    .stdout(Stdio::from(file))
                    .status()
                    .await
                    .map_err(|e| spawn_error(&spec.program, e))?;
                Ok(CommandOutput {
                    code: status.code(),
                    ..CommandOutput::default()
                })
            }
        }
    }
}

/// Politely ask a child to exit with SIGTERM.
pub fn terminate(child: &tokio::process::Child) {
    let Some(pid) = child.id() else {
        return;
    };
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return;
    };
    // SAFETY: kill(2) with a pid we spawned and still own; no memory is touched.
    let ret = unsafe { libc::kill(pid, libc::SIGTERM) };
    if ret != 0 {
        tracing::warn!(
            "Failed to send SIGTERM to {}: {}",
            pid,
            std::io::Error::last_os_error()
        );
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_capture_echo() {
        let spec = CommandSpec::new("echo").args(["hello", "world"]).capture();
        let output = SystemRunner.run(&spec).await.unwrap();

        assert!(output.success());
        assert_eq!(output.stdout_lines(), vec!["hello world".to_string()]);
    }

    #[tokio::test]
    async fn test_run_checked_reports_exit_code() {
        let spec = CommandSpec::new("sh").args(["-c", "echo boom >&2; exit 3"]).capture();
        let err = SystemRunner.run_checked(&spec).await.unwrap_err();

        match err {
            ToolError::ProcessError { program, code, stderr } => {
                assert_eq!(program, "sh");
                assert_eq!(code, Some(3));
                assert_eq!(stderr.trim(), "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let spec = CommandSpec::new("tjtools-definitely-not-installed").capture();
        let err = SystemRunner.run(&spec).await.unwrap_err();
        assert!(matches!(err, ToolError::SpawnError { .. }));
    }

    #[tokio::test]
    async fn test_stdout_to_file_with_cwd_and_env() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let spec = CommandSpec::new("sh")
            .args(["-c", "printf '%s' \"$GREETING\"; pwd >/dev/null"])
            .cwd(dir.path())
            .env("GREETING", "hi")
            .stdout_to(&out);

        let output = SystemRunner.run(&spec).await.unwrap();
        assert!(output.success());
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "hi");

        // Existing output files are never overwritten.
        assert!(SystemRunner.run(&spec).await.is_err());
    }

    #[test]
    fn test_display_joins_arguments() {
        let spec = CommandSpec::new("zstd").args(["-z", "-q"]);
        assert_eq!(spec.display(), "zstd -z -q");
    }
}
