use crate::domain::model::{CommandOutput, CommandSpec};
use crate::utils::error::{Result, ToolError};
use async_trait::async_trait;

/// Abstraction over subprocess execution. Tests use scripted runners that
/// return predetermined outputs without spawning processes.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion. A non-zero exit is not an error here.
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;

    /// Run the command and turn a non-zero exit into `ToolError::ProcessError`.
    async fn run_checked(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let output = self.run(spec).await?;
        if !output.success() {
            tracing::warn!("{} exited with {:?}", spec.program, output.code);
            return Err(ToolError::ProcessError {
                program: spec.program.clone(),
                code: output.code,
                stderr: output.stderr_text(),
            });
        }
        Ok(output)
    }
}
