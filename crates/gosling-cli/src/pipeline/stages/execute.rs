//! Stage 3: run a produced binary and capture its output.

use super::super::{run_stage_command, ExecutionResult, Pipeline, StageError, STAGE_EXECUTE};
use std::path::Path;
use tokio::process::Command;
use tracing::info_span;

impl Pipeline {
    /// Run the binary with no arguments and capture exit code, stdout and
    /// stderr. A nonzero program exit is returned as data; only an OS-level
    /// launch failure (or an elapsed timeout) is an error.
    pub async fn execute_and_capture(
        &self,
        executable_path: &Path,
    ) -> Result<ExecutionResult, StageError> {
        let span = info_span!("stage", name = STAGE_EXECUTE);
        let _enter = span.enter();

        let program = executable_path.display().to_string();
        let mut cmd = Command::new(executable_path);
        let output = run_stage_command(&program, &mut cmd, self.options().timeout).await?;

        Ok(ExecutionResult {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
