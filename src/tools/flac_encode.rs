//! Encode WAV files to FLAC with flake and verify the result against the
//! reference decoder before replacing anything.

use crate::config::{AudioConfig, CommonArgs, ToolboxConfig};
use crate::core::process::SystemRunner;
use crate::core::wav::{data_chunk_digest, is_wav};
use crate::domain::model::CommandSpec;
use crate::domain::ports::CommandRunner;
use crate::utils::error::{Result, ToolError};
use crate::utils::fs::walk_files;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

#[derive(Debug, Clone, Parser)]
#[command(name = "flac-encode", about = "Encode WAV files to verified FLAC")]
pub struct FlacEncodeArgs {
    /// WAV files or directories containing WAV files
    #[arg(required = true)]
    pub items: Vec<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub fn output_path(input: &Path) -> PathBuf {
    input.with_extension("flac")
}

pub fn encode_spec(input: &Path, output: &Path) -> CommandSpec {
    CommandSpec::new("flake")
        .args(["-q", "-12"])
        .arg(input.to_string_lossy())
        .arg("-o")
        .arg(output.to_string_lossy())
        .capture()
}

pub fn decode_spec(input: &Path, output: &Path) -> CommandSpec {
    CommandSpec::new("flac")
        .args(["--decode", "--silent"])
        .arg(format!("--output-name={}", output.display()))
        .arg(input.to_string_lossy())
        .capture()
}

pub fn seekpoint_spec(file: &Path, seconds: u64) -> CommandSpec {
    CommandSpec::new("metaflac")
        .arg(format!("--add-seekpoint={}s", seconds))
        .arg(file.to_string_lossy())
        .capture()
}

/// Encode one WAV file to `<stem>.flac` next to it.
pub async fn encode_file<R: CommandRunner>(runner: &R, input: &Path, cfg: &AudioConfig) -> Result<PathBuf> {
    let output = output_path(input);
    if output.exists() {
        return Err(ToolError::invalid_input(format!(
            "output file already exists: {}",
            output.display()
        )));
    }

    tracing::info!("Processing: {}", input.display());

    // Same filesystem as the target so the final rename is atomic.
    let parent = match input.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let tmp = tempfile::Builder::new()
        .prefix(".flac-encode")
        .tempdir_in(&parent)?;
    let encoded = tmp.path().join("output.flac");
    let reference = tmp.path().join("reference.wav");

    runner.run_checked(&encode_spec(input, &encoded)).await?;
    runner.run_checked(&decode_spec(&encoded, &reference)).await?;

    let (source, reference_path) = (input.to_path_buf(), reference.clone());
    let (source_digest, reference_digest) = tokio::task::spawn_blocking(move || {
        Ok::<_, ToolError>((
            data_chunk_digest(&source)?,
            data_chunk_digest(&reference_path)?,
        ))
    })
    .await??;

    if source_digest != reference_digest {
        return Err(ToolError::mismatch(format!(
            "mismatch between original source and reference decoding: {}",
            input.display()
        )));
    }

    // flake writes no seek table.
    runner
        .run_checked(&seekpoint_spec(&encoded, cfg.seekpoint_seconds))
        .await?;

    std::fs::rename(&encoded, &output)?;
    Ok(output)
}

pub async fn encode_single<R: CommandRunner>(runner: &R, input: &Path, cfg: &AudioConfig) -> Result<PathBuf> {
    if !input.is_file() {
        return Err(ToolError::invalid_input(format!(
            "path is not a file: {}",
            input.display()
        )));
    }
    if !is_wav(input) {
        return Err(ToolError::invalid_input(format!(
            "invalid file content (expected WAV): {}",
            input.display()
        )));
    }
    encode_file(runner, input, cfg).await
}

/// Encode every WAV below `dir` with at most `cfg.jobs` encoders in flight.
/// Returns the encoded files and the failures.
pub async fn encode_dir<R>(
    runner: Arc<R>,
    dir: &Path,
    cfg: &AudioConfig,
) -> Result<(Vec<PathBuf>, Vec<(PathBuf, ToolError)>)>
where
    R: CommandRunner + 'static,
{
    if !dir.is_dir() {
        return Err(ToolError::invalid_input(format!(
            "path is not a directory: {}",
            dir.display()
        )));
    }
    tracing::info!("Encoding directory: {}", dir.display());

    let semaphore = Arc::new(Semaphore::new(cfg.jobs.max(1)));
    let mut set = JoinSet::new();

    for file in walk_files(dir)?.into_iter().filter(|f| is_wav(f)) {
        let runner = Arc::clone(&runner);
        let semaphore = Arc::clone(&semaphore);
        let cfg = cfg.clone();
        set.spawn(async move {
            let result = match semaphore.acquire_owned().await {
                Ok(_permit) => encode_file(runner.as_ref(), &file, &cfg).await,
                Err(e) => Err(ToolError::invalid_input(e.to_string())),
            };
            (file, result)
        });
    }

    let mut encoded = Vec::new();
    let mut failed = Vec::new();
    while let Some(joined) = set.join_next().await {
        match joined? {
            (_, Ok(output)) => encoded.push(output),
            (file, Err(e)) => failed.push((file, e)),
        }
    }
    encoded.sort();
    Ok((encoded, failed))
}

pub async fn run(args: FlacEncodeArgs, config: ToolboxConfig) -> Result<()> {
    let runner = Arc::new(SystemRunner);
    let mut failures = 0usize;

    for item in &args.items {
        if !item.exists() {
            tracing::warn!("Skipping non-existing path: {}", item.display());
            continue;
        }

        let result = if item.is_dir() {
            match encode_dir(Arc::clone(&runner), item, &config.audio).await {
                Ok((_, failed)) if failed.is_empty() => Ok(()),
                Ok((_, failed)) => {
                    for (file, e) in &failed {
                        tracing::warn!("Error while encoding {}: {}", file.display(), e);
                    }
                    Err(ToolError::invalid_input(format!(
                        "{} files failed in {}",
                        failed.len(),
                        item.display()
                    )))
                }
                Err(e) => Err(e),
            }
        } else {
            encode_single(runner.as_ref(), item, &config.audio).await.map(|_| ())
        };

        if let Err(e) = result {
            tracing::warn!("Error while encoding {}: {}", item.display(), e);
            failures += 1;
        }
    }

    if failures > 0 {
        return Err(ToolError::invalid_input(format!(
            "{} of {} items failed to encode",
            failures,
            args.items.len()
        )));
    }
    Ok(())
}
