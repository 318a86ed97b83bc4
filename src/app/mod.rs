//! Shared entry point for every binary: logging, configuration and error reporting.

use crate::config::{CommonArgs, ToolboxConfig};
use crate::utils::error::{Result, ToolError};
use crate::utils::logger;
use crate::utils::validation::Validate;
use std::future::Future;

pub fn init_logging(common: &CommonArgs) {
    if common.log_json {
        logger::init_json_logger(common.verbose);
    } else {
        logger::init_cli_logger(common.verbose);
    }
}

pub fn load_config(common: &CommonArgs) -> Result<ToolboxConfig> {
    let config = ToolboxConfig::load(common.config.as_deref())?;
    config.validate()?;
    Ok(config)
}

/// Print the error for humans and return the process exit code.
pub fn report(tool: &str, e: &ToolError) -> i32 {
    tracing::error!(
        "{} failed: {} (category: {:?})",
        tool,
        e,
        e.category()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    e.exit_code()
}

/// Run a tool and map its outcome to an exit code.
pub async fn launch<F, Fut>(tool: &str, common: CommonArgs, run: F) -> i32
where
    F: FnOnce(ToolboxConfig) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    init_logging(&common);
    tracing::debug!("Starting {}", tool);

    let config = match load_config(&common) {
        Ok(config) => config,
        Err(e) => return report(tool, &e),
    };

    match run(config).await {
        Ok(()) => 0,
        Err(e) => report(tool, &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_launch_success_and_failure_codes() {
        let common = CommonArgs::default();
        assert_eq!(launch("ok", common.clone(), |_| async { Ok(()) }).await, 0);

        let code = launch("fails", common, |_| async {
            Err(ToolError::mismatch("hash mismatch for: a.flac"))
        })
        .await;
        assert_eq!(code, 5);
    }

    #[tokio::test]
    async fn test_launch_passes_loaded_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[compress]\nthreads = 8").unwrap();

        let common = CommonArgs {
            config: Some(file.path().to_path_buf()),
            ..CommonArgs::default()
        };
        let code = launch("cfg", common, |config| async move {
            assert_eq!(config.compress.threads, 8);
            Ok(())
        })
        .await;
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_invalid_config_is_configuration_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[compress]\nlevel = 99").unwrap();

        let common = CommonArgs {
            config: Some(file.path().to_path_buf()),
            ..CommonArgs::default()
        };
        let code = launch("cfg", common, |_| async { Ok(()) }).await;
        assert_eq!(code, 3);
    }
}
