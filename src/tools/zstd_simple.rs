//! Archive a directory into `<prefix><name>.tar.zst` with a tar | zstd pipeline.

use crate::config::{CommonArgs, CompressConfig, ToolboxConfig};
use crate::core::process::{build_command, spawn_error};
use crate::domain::model::CommandSpec;
use crate::utils::error::{Result, ToolError};
use crate::utils::fs::{directory_size, file_name_string};
use crate::utils::validation::require_dir;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::Stdio;

#[derive(Debug, Clone, Parser)]
#[command(name = "zstd-simple", about = "Compress a directory with tar and zstd")]
pub struct ZstdSimpleArgs {
    /// Run zstd single-threaded
    #[arg(short, long)]
    pub nomt: bool,

    /// Prefix for the output file name
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Output directory (defaults to the current directory)
    #[arg(short, long)]
    pub location: Option<PathBuf>,

    /// Directory to archive
    pub directory: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// The two halves of the pipeline; tar's stdout feeds zstd's stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pub tar: CommandSpec,
    pub zstd: CommandSpec,
    pub output: PathBuf,
}

pub async fn run(args: ZstdSimpleArgs, config: ToolboxConfig) -> Result<()> {
    let directory = trim_trailing_slash(&args.directory);
    require_dir(&directory)?;

    let location = match &args.location {
        Some(dir) => {
            require_dir(dir)?;
            dir.canonicalize()?
        }
        None => std::env::current_dir()?.canonicalize()?,
    };

    let size = directory_size(&directory)?;
    println!("info: estimated uncompressed size is {} bytes", size);

    let pipeline = plan(
        &directory,
        &location,
        args.prefix.as_deref(),
        args.nomt,
        size,
        &config.compress,
    )?;
    execute(&pipeline).await?;

    tracing::info!("Wrote {}", pipeline.output.display());
    Ok(())
}

fn trim_trailing_slash(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    let trimmed = s.trim_end_matches('/');
    if trimmed.is_empty() {
        path.to_path_buf()
    } else {
        PathBuf::from(trimmed)
    }
}

pub fn plan(
    directory: &Path,
    location: &Path,
    prefix: Option<&str>,
    single_thread: bool,
    size_hint: u64,
    cfg: &CompressConfig,
) -> Result<Pipeline> {
    let base = file_name_string(directory);
    if base.is_empty() {
        return Err(ToolError::invalid_input(format!(
            "cannot archive {}",
            directory.display()
        )));
    }
    let parent = match directory.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("./"),
    };

    let output = location.join(format!("{}{}.tar.zst", prefix.unwrap_or(""), base));

    let tar = CommandSpec::new("tar").args([
        "--create".to_string(),
        "--file".to_string(),
        "-".to_string(),
        format!("--directory={}", parent.display()),
        base,
    ]);

    let threads = if single_thread {
        "--single-thread".to_string()
    } else {
        format!("--threads={}", cfg.threads)
    };
    let zstd = CommandSpec::new("zstd").args([
        "--compress".to_string(),
        threads,
        "--ultra".to_string(),
        format!("-{}", cfg.level),
        format!("--size-hint={}", size_hint),
        "-o".to_string(),
        output.to_string_lossy().into_owned(),
    ]);

    Ok(Pipeline { tar, zstd, output })
}

pub async fn execute(pipeline: &Pipeline) -> Result<()> {
    tracing::debug!("Running: {} | {}", pipeline.tar.display(), pipeline.zstd.display());

    let mut tar = build_command(&pipeline.tar)
        .stdout(Stdio::piped())
        .spawn()
        .map_err(|e| spawn_error(&pipeline.tar.program, e))?;

    let tar_stdout = tar
        .stdout
        .take()
        .ok_or_else(|| ToolError::invalid_input("tar stdout not captured"))?;
    let zstd_stdin: Stdio = tar_stdout.try_into()?;

    let mut zstd = build_command(&pipeline.zstd)
        .stdin(zstd_stdin)
        .spawn()
        .map_err(|e| spawn_error(&pipeline.zstd.program, e))?;

    let zstd_status = zstd.wait().await?;
    let tar_status = tar.wait().await?;

    if !zstd_status.success() {
        return Err(ToolError::ProcessError {
            program: pipeline.zstd.program.clone(),
            code: zstd_status.code(),
            stderr: String::new(),
        });
    }
    if !tar_status.success() {
        tracing::warn!("tar exited with {:?}", tar_status.code());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> CompressConfig {
        CompressConfig {
            threads: 4,
            level: 22,
        }
    }

    #[test]
    fn test_plan_arguments() {
        let pipeline = plan(
            Path::new("/data/photos"),
            Path::new("/backup"),
            Some("2024_"),
            false,
            1234,
            &cfg(),
        )
        .unwrap();

        assert_eq!(pipeline.output, PathBuf::from("/backup/2024_photos.tar.zst"));
        assert_eq!(
            pipeline.tar.args,
            vec!["--create", "--file", "-", "--directory=/data", "photos"]
        );
        assert_eq!(
            pipeline.zstd.args,
            vec![
                "--compress",
                "--threads=4",
                "--ultra",
                "-22",
                "--size-hint=1234",
                "-o",
                "/backup/2024_photos.tar.zst"
            ]
        );
    }

    #[test]
    fn test_plan_single_thread_relative_dir() {
        let pipeline = plan(Path::new("photos"), Path::new("/out"), None, true, 0, &cfg()).unwrap();
        assert_eq!(pipeline.tar.args[3], "--directory=./");
        assert_eq!(pipeline.zstd.args[1], "--single-thread");
        assert_eq!(pipeline.output, PathBuf::from("/out/photos.tar.zst"));
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        assert_eq!(trim_trailing_slash(Path::new("dir///")), PathBuf::from("dir"));
        assert_eq!(trim_trailing_slash(Path::new("/")), PathBuf::from("/"));
    }

    #[tokio::test]
    async fn test_execute_pipes_tar_into_consumer() {
        let src = tempfile::tempdir().unwrap();
        std::fs::create_dir(src.path().join("data")).unwrap();
        std::fs::write(src.path().join("data/file.txt"), "payload").unwrap();

        let out = src.path().join("data.tar");
        let mut pipeline = plan(
            &src.path().join("data"),
            src.path(),
            None,
            true,
            7,
            &cfg(),
        )
        .unwrap();
        // Stand-in consumer so the test does not depend on zstd.
        pipeline.zstd = CommandSpec::new("sh").args(["-c", "cat > \"$0\"", out.to_string_lossy().as_ref()]);

        execute(&pipeline).await.unwrap();
        let archive = std::fs::read(&out).unwrap();
        assert!(archive.len() >= 512);
        assert!(String::from_utf8_lossy(&archive).contains("payload"));
    }

    #[tokio::test]
    async fn test_execute_reports_consumer_failure() {
        let src = tempfile::tempdir().unwrap();
        let mut pipeline = plan(src.path(), src.path(), None, true, 0, &cfg()).unwrap();
        pipeline.zstd = CommandSpec::new("sh").args(["-c", "cat >/dev/null; exit 1"]);

        let err = execute(&pipeline).await.unwrap_err();
        assert!(matches!(err, ToolError::ProcessError { code: Some(1), .. }));
    }
}
