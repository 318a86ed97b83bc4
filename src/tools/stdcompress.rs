//! Run an application and compress its stdout/stderr into zstd log files.

use crate::config::{CommonArgs, ToolboxConfig};
use crate::core::process::{build_command, spawn_error, terminate};
use crate::domain::model::CommandSpec;
use crate::utils::error::{Result, ToolError};
use clap::Parser;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tokio::process::{Child, ChildStdin};
use tokio::signal::unix::{signal, SignalKind};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Parser)]
#[command(name = "stdcompress", about = "Capture an application's output into zstd logs")]
pub struct StdcompressArgs {
    /// Application to run
    pub application: String,

    /// Log file base; writes `<base>-stdout.log.zst` and `<base>-stderr.log.zst`
    pub logbase: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub fn compressor_spec(logbase: &str, stream: &str) -> CommandSpec {
    CommandSpec::new("zstd")
        .args(["-z", "-q", "-o"])
        .arg(format!("{}-{}.log.zst", logbase, stream))
}

pub async fn run(args: StdcompressArgs, _config: ToolboxConfig) -> Result<()> {
    let app = CommandSpec::new(&args.application);
    let code = capture(
        &app,
        &compressor_spec(&args.logbase, "stdout"),
        &compressor_spec(&args.logbase, "stderr"),
    )
    .await?;

    println!("info: application exited with return code {:?}", code);
    Ok(())
}

/// Spawn a compressor in its own process group so that terminal signals
/// only reach the application.
fn spawn_compressor(spec: &CommandSpec) -> Result<(Child, ChildStdin)> {
    let mut child = build_command(spec)
        .stdin(Stdio::piped())
        .process_group(0)
        .spawn()
        .map_err(|e| spawn_error(&spec.program, e))?;
    let stdin = child
        .stdin
        .take()
        .ok_or_else(|| ToolError::invalid_input("compressor stdin not captured"))?;
    Ok((child, stdin))
}

fn forward<R>(mut from: R, mut to: ChildStdin) -> JoinHandle<std::io::Result<u64>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let copied = tokio::io::copy(&mut from, &mut to).await?;
        to.shutdown().await?;
        Ok(copied)
    })
}

/// Returns the application's exit code (`None` if killed by a signal).
pub async fn capture(
    app: &CommandSpec,
    stdout_sink: &CommandSpec,
    stderr_sink: &CommandSpec,
) -> Result<Option<i32>> {
    let (mut out_zstd, out_stdin) = spawn_compressor(stdout_sink)?;
    let (mut err_zstd, err_stdin) = spawn_compressor(stderr_sink)?;

    let mut child = build_command(app)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .process_group(0)
        .spawn()
        .map_err(|e| spawn_error(&app.program, e))?;

    let app_stdout = child
        .stdout
        .take()
        .ok_or_else(|| ToolError::invalid_input("application stdout not captured"))?;
    let app_stderr = child
        .stderr
        .take()
        .ok_or_else(|| ToolError::invalid_input("application stderr not captured"))?;

    let out_task = forward(app_stdout, out_stdin);
    let err_task = forward(app_stderr, err_stdin);

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    let status = loop {
        tokio::select! {
            status = child.wait() => break status?,
            _ = sigterm.recv() => {
                println!("info: terminating source application...");
                terminate(&child);
            }
            _ = sigint.recv() => {
                println!("info: terminating source application...");
                terminate(&child);
            }
        }
    };
    println!("info: source application exited...");

    // Keep draining until the pipes close so no output is lost.
    let stdout_bytes = out_task.await??;
    let stderr_bytes = err_task.await??;
    tracing::debug!("Captured {} stdout and {} stderr bytes", stdout_bytes, stderr_bytes);

    for (zstd, spec) in [(&mut out_zstd, stdout_sink), (&mut err_zstd, stderr_sink)] {
        let status = zstd.wait().await?;
        if !status.success() {
            return Err(ToolError::ProcessError {
                program: spec.program.clone(),
                code: status.code(),
                stderr: String::new(),
            });
        }
    }

    Ok(status.code())
}
