use crate::config::{CommonArgs, ToolboxConfig};
use crate::utils::error::{Result, ToolError};
use crate::utils::validation::require_file;
use clap::Parser;
use std::path::{Path, PathBuf};

const UTF8_BOM: [u8; 3] = [0xef, 0xbb, 0xbf];

#[derive(Debug, Clone, Parser)]
#[command(name = "strip-utf8bom", about = "Remove the UTF-8 byte order mark from a file")]
pub struct StripBomArgs {
    pub input: PathBuf,

    /// Output file (defaults to `<input>.noBOM`)
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub async fn run(args: StripBomArgs, _config: ToolboxConfig) -> Result<()> {
    let output = strip_utf8_bom(&args.input, args.output.as_deref())?;
    tracing::info!("Wrote {}", output.display());
    Ok(())
}

pub fn default_output(input: &Path) -> PathBuf {
    let mut name = input.file_name().unwrap_or_default().to_os_string();
    name.push(".noBOM");
    input.with_file_name(name)
}

/// Returns the path written. Inputs without a BOM are copied unchanged.
pub fn strip_utf8_bom(input: &Path, output: Option<&Path>) -> Result<PathBuf> {
    require_file(input)?;
    let output = output.map(Path::to_path_buf).unwrap_or_else(|| default_output(input));
    if output.exists() {
        return Err(ToolError::invalid_input(format!(
            "output path already exists: {}",
            output.display()
        )));
    }

    let data = std::fs::read(input)?;
    let body = match data.strip_prefix(&UTF8_BOM) {
        Some(rest) => rest,
        None => {
            if data.len() >= UTF8_BOM.len() {
                tracing::warn!("No UTF-8 byte order mark found in {}", input.display());
            }
            &data[..]
        }
    };

    std::fs::write(&output, body)?;
    Ok(output)
}
