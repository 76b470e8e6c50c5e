//! Batch driver: run the compile stage over every discovered input program
//! and aggregate the verdicts.

use crate::pipeline::Pipeline;
use crate::utils::file_utils::{numeric_sort_key, FileUtils};
use crate::{CliError, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Success/failure classification for one processed input.
#[derive(Debug, Clone)]
pub struct InputVerdict {
    pub name: String,
    pub success: bool,
    pub diagnostics: String,
}

/// Ordered collection of per-input verdicts plus aggregate counts.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub artifacts: Vec<PathBuf>,
    pub verdicts: Vec<InputVerdict>,
}

impl BatchReport {
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.successful as f64 / self.total as f64 * 100.0
        }
    }
}

pub struct BatchDriver<'a> {
    pipeline: &'a Pipeline,
}

impl<'a> BatchDriver<'a> {
    pub fn new(pipeline: &'a Pipeline) -> Self {
        Self { pipeline }
    }

    /// Inputs under `input_dir`, ordered by the numeric substring of their
    /// file name rather than lexically.
    pub fn discover_inputs(&self, input_dir: &Path) -> Result<Vec<PathBuf>> {
        if !input_dir.is_dir() {
            return Err(CliError::InvalidInput(format!(
                "Input directory does not exist: {}",
                input_dir.display()
            )));
        }

        let mut inputs =
            FileUtils::find_source_files(input_dir, &self.pipeline.options().source_ext)?;
        inputs.sort_by_key(|path| {
            path.file_name()
                .map(|name| numeric_sort_key(&name.to_string_lossy()))
                .unwrap_or(0)
        });
        Ok(inputs)
    }

    /// Run the compile stage over every input, persisting artifacts at
    /// `<output_dir>/<stem>.s`. One failure never aborts the batch.
    pub async fn run_batch(&self, input_dir: &Path, output_dir: &Path) -> Result<BatchReport> {
        let inputs = self.discover_inputs(input_dir)?;
        FileUtils::ensure_dir_exists(output_dir)?;

        let mut report = BatchReport::default();
        report.total = inputs.len();

        for input in &inputs {
            let name = input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| input.display().to_string());
            let target = output_dir.join(Path::new(&name).with_extension("s"));

            let source_text = match std::fs::read_to_string(input) {
                Ok(text) => text,
                Err(e) => {
                    info!(input = %name, "unreadable input: {}", e);
                    report.failed += 1;
                    report.verdicts.push(InputVerdict {
                        name,
                        success: false,
                        diagnostics: e.to_string(),
                    });
                    continue;
                }
            };

            match self.pipeline.compile_to_assembly(&source_text, &target).await {
                Ok(artifact) => {
                    info!(input = %name, artifact = %artifact.path.display(), "generated");
                    report.successful += 1;
                    report.artifacts.push(artifact.path);
                    report.verdicts.push(InputVerdict {
                        name,
                        success: true,
                        diagnostics: artifact.diagnostics,
                    });
                }
                Err(e) => {
                    info!(input = %name, "compile stage failed");
                    report.failed += 1;
                    report.verdicts.push(InputVerdict {
                        name,
                        success: false,
                        diagnostics: e.diagnostics(),
                    });
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate_guards_empty_report() {
        let report = BatchReport::default();
        assert_eq!(report.success_rate(), 0.0);
    }

    #[test]
    fn test_success_rate_percentage() {
        let report = BatchReport {
            total: 4,
            successful: 3,
            failed: 1,
            artifacts: Vec::new(),
            verdicts: Vec::new(),
        };
        assert!((report.success_rate() - 75.0).abs() < f64::EPSILON);
    }
}
