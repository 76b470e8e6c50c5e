//! Stage 1: compile source text to assembly through the backend compiler.

use super::super::{diagnostics_from_output, run_stage_command, AssemblyArtifact, Pipeline, StageError, STAGE_ASSEMBLY};
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info_span};

impl Pipeline {
    /// Write `source_text` to a scoped temporary file, run the backend in
    /// assembly-only mode (`-s`), and persist captured stdout at
    /// `output_path` on success. The temporary file is deleted on every exit
    /// path; on failure no artifact is left at `output_path`.
    pub async fn compile_to_assembly(
        &self,
        source_text: &str,
        output_path: &Path,
    ) -> Result<AssemblyArtifact, StageError> {
        let span = info_span!("stage", name = STAGE_ASSEMBLY);
        let _enter = span.enter();

        let temp = tempfile::Builder::new()
            .prefix("gosling-src-")
            .suffix(&format!(".{}", self.options().source_ext))
            .tempfile()?;
        std::fs::write(temp.path(), source_text)?;

        let program = self.toolchain().path.display().to_string();
        let mut cmd = Command::new(&self.toolchain().path);
        cmd.arg(temp.path()).arg("-s");

        let result = run_stage_command(&program, &mut cmd, self.options().timeout).await;

        // Scoped source file: removed whatever happened above. Deletion
        // failure is logged and never escalated.
        if let Err(err) = temp.close() {
            debug!(error = %err, "failed to remove temporary source file");
        }

        let output = result?;

        if !output.status.success() {
            remove_partial_artifact(output_path);
            return Err(StageError::Compile {
                diagnostics: diagnostics_from_output(&output, "backend compiler"),
            });
        }

        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let assembly = String::from_utf8_lossy(&output.stdout);
        if let Err(err) = std::fs::write(output_path, assembly.as_bytes()) {
            remove_partial_artifact(output_path);
            return Err(StageError::Io(err));
        }

        Ok(AssemblyArtifact {
            path: output_path.to_path_buf(),
            diagnostics: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Best-effort removal of a half-written artifact.
fn remove_partial_artifact(path: &Path) {
    if path.exists() {
        if let Err(err) = std::fs::remove_file(path) {
            debug!(error = %err, path = %path.display(), "failed to remove partial artifact");
        }
    }
}
