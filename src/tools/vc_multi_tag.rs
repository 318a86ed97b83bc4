//! Apply one value per file for the same tag key. The values are entered in
//! an editor, one per line, in the name order of the FLAC files.

use crate::config::{CommonArgs, TagsConfig, ToolboxConfig};
use crate::core::process::SystemRunner;
use crate::core::tags::{flac_files, TagEntry};
use crate::domain::model::CommandSpec;
use crate::domain::ports::CommandRunner;
use crate::tools::vc_addtag::vc_addtag;
use crate::utils::error::{Result, ToolError};
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Parser)]
#[command(name = "vc-multi-tag", about = "Apply tag values (for the same key) to multiple files")]
pub struct VcMultiTagArgs {
    /// Directory where tags should be applied (defaults to the current directory)
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Key of the tag
    #[arg(short, long)]
    pub tag_key: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub async fn run(args: VcMultiTagArgs, config: ToolboxConfig) -> Result<()> {
    let dir = match args.directory {
        Some(dir) => dir,
        None => {
            let cwd = std::env::current_dir()?;
            tracing::info!("Using current directory: {}", cwd.display());
            cwd
        }
    };
    vc_multi_tag(&SystemRunner, &config.tags, &dir, &args.tag_key).await
}

pub fn editor_spec(cfg: &TagsConfig, input: &Path) -> CommandSpec {
    CommandSpec::new(&cfg.editor)
        .args(cfg.editor_args.iter().cloned())
        .arg(input.to_string_lossy())
        .capture()
}

/// Let the user enter the values, one per line.
pub async fn collect_values<R: CommandRunner>(runner: &R, cfg: &TagsConfig) -> Result<Vec<String>> {
    let tmp = tempfile::tempdir()?;
    let input = tmp.path().join("input.txt");
    runner.run_checked(&editor_spec(cfg, &input)).await?;

    let content = std::fs::read_to_string(&input).map_err(|e| {
        ToolError::invalid_input(format!("no values entered ({}): {}", input.display(), e))
    })?;
    Ok(content.lines().map(str::to_string).collect())
}

pub async fn vc_multi_tag<R: CommandRunner>(
    runner: &R,
    cfg: &TagsConfig,
    dir: &Path,
    tag_key: &str,
) -> Result<()> {
    if tag_key.is_empty() {
        return Err(ToolError::invalid_input("invalid tag key: empty"));
    }
    let files = flac_files(dir)?;
    let values = collect_values(runner, cfg).await?;

    if files.len() != values.len() {
        return Err(ToolError::invalid_input(format!(
            "list size mismatch: {} files, {} values",
            files.len(),
            values.len()
        )));
    }

    for (file, value) in files.iter().zip(values) {
        vc_addtag(file, &[TagEntry::new(tag_key, value)])?;
    }
    Ok(())
}
