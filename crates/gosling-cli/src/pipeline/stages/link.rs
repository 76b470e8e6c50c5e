//! Stage 2: assemble the textual artifact into a native executable.

use super::super::{diagnostics_from_output, run_stage_command, Pipeline, StageError, STAGE_LINK};
use crate::toolchain::{ensure_executable, Platform};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info_span};

impl Pipeline {
    /// Invoke the assembler/linker driver over `assembly_path`, producing a
    /// binary named `exec_name` next to the assembly input. The binary gets
    /// the platform suffix on Windows and the executable bit on POSIX.
    pub async fn assemble_to_executable(
        &self,
        assembly_path: &Path,
        exec_name: &str,
    ) -> Result<PathBuf, StageError> {
        let span = info_span!("stage", name = STAGE_LINK);
        let _enter = span.enter();

        let platform = Platform::current();
        let file_name = format!("{}{}", exec_name, platform.exe_suffix());
        let binary_path = assembly_path
            .parent()
            .map(|dir| dir.join(&file_name))
            .unwrap_or_else(|| PathBuf::from(&file_name));

        let assembler = self.options().assembler.clone();
        let mut cmd = Command::new(&assembler);
        cmd.args(&self.options().assembler_flags)
            .arg("-o")
            .arg(&binary_path)
            .arg(assembly_path);

        let output = run_stage_command(&assembler, &mut cmd, self.options().timeout).await?;

        if !output.status.success() {
            if binary_path.exists() {
                if let Err(err) = std::fs::remove_file(&binary_path) {
                    debug!(error = %err, path = %binary_path.display(), "failed to remove partial binary");
                }
            }
            return Err(StageError::Assemble {
                diagnostics: diagnostics_from_output(&output, &assembler),
            });
        }

        ensure_executable(&binary_path)?;
        Ok(binary_path)
    }
}
