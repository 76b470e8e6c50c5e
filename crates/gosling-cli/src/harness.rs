//! Regression harness over the backend's test corpus.
//!
//! The harness checks the backend frontend only: each test file is fed to
//! the compiler directly (no assembly stage) and the verdict is read out of
//! the diagnostic text the backend prints, not out of the exit code. The
//! backend is known to exit 0 while still reporting a parse failure in its
//! own wording, so the marker classification is authoritative here.

use crate::cli::{HarnessConfig, PipelineConfig, ToolchainConfig};
use crate::pipeline::{run_stage_command, StageError};
use crate::toolchain::{ToolchainHandle, ToolchainResolver};
use crate::utils::file_utils::FileUtils;
use crate::{CliError, Result};
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

/// Tagged outcome of scanning the backend's diagnostic stream for the
/// configured marker strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerOutcome {
    /// Success marker present, failure marker absent
    Accepted,
    /// Failure marker present (regardless of the success marker)
    Rejected,
    /// Neither marker present
    Silent,
}

impl MarkerOutcome {
    /// Only an explicit acceptance counts as a pass.
    pub fn is_pass(self) -> bool {
        matches!(self, MarkerOutcome::Accepted)
    }
}

/// Classify captured stdout against the configured markers.
pub fn classify_output(stdout: &str, config: &HarnessConfig) -> MarkerOutcome {
    if stdout.contains(&config.failure_marker) {
        MarkerOutcome::Rejected
    } else if stdout.contains(&config.success_marker) {
        MarkerOutcome::Accepted
    } else {
        MarkerOutcome::Silent
    }
}

/// Outcome of checking a single test file.
#[derive(Debug, Clone)]
pub struct SingleResult {
    pub passed: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

/// A failing test with its diagnostic context.
#[derive(Debug, Clone)]
pub struct FailedTest {
    pub name: String,
    pub error: String,
    pub output: String,
}

/// Aggregate of one full-suite run.
#[derive(Debug, Default)]
pub struct SuiteReport {
    pub passed: Vec<String>,
    pub failed: Vec<FailedTest>,
}

impl SuiteReport {
    pub fn total(&self) -> usize {
        self.passed.len() + self.failed.len()
    }

    pub fn success_rate(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.passed.len() as f64 / self.total() as f64 * 100.0
        }
    }
}

pub struct TestHarness {
    toolchain: ToolchainConfig,
    pipeline: PipelineConfig,
    config: HarnessConfig,
}

impl TestHarness {
    pub fn new(
        toolchain: ToolchainConfig,
        pipeline: PipelineConfig,
        config: HarnessConfig,
    ) -> Self {
        Self {
            toolchain,
            pipeline,
            config,
        }
    }

    fn tests_dir(&self) -> &Path {
        &self.pipeline.tests_dir
    }

    /// Rebuild the backend unconditionally from the fixed source list. A
    /// build failure or timeout aborts before any test runs.
    pub async fn build_toolchain(&self) -> Result<ToolchainHandle> {
        let mut resolver = ToolchainResolver::new(self.toolchain.clone());
        resolver.force_rebuild().await
    }

    /// Test corpus file names, lexically sorted.
    pub fn list_tests(&self) -> Result<Vec<String>> {
        if !self.tests_dir().is_dir() {
            return Err(CliError::InvalidInput(format!(
                "Tests directory does not exist: {}",
                self.tests_dir().display()
            )));
        }

        let mut names: Vec<String> =
            FileUtils::find_files(self.tests_dir(), &[self.config.test_pattern.clone()], &[])?
                .into_iter()
                .filter_map(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
                .collect();
        names.sort();
        Ok(names)
    }

    /// Feed one test file to the backend and classify the outcome. A
    /// timeout is always a failure with the fixed diagnostic `Timeout`; a
    /// launch failure is a failure verdict, never a crash.
    pub async fn check_file(&self, handle: &ToolchainHandle, test_file: &Path) -> SingleResult {
        let program = handle.path.display().to_string();
        let mut cmd = Command::new(&handle.path);
        cmd.arg(test_file);

        let budget = Duration::from_secs(self.config.test_timeout_secs);
        match run_stage_command(&program, &mut cmd, Some(budget)).await {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
                let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                let passed = classify_output(&stdout, &self.config).is_pass();
                SingleResult {
                    passed,
                    stdout,
                    stderr,
                    exit_code: output.status.code(),
                }
            }
            Err(StageError::Timeout) => SingleResult {
                passed: false,
                stdout: String::new(),
                stderr: "Timeout".to_string(),
                exit_code: None,
            },
            Err(e) => SingleResult {
                passed: false,
                stdout: String::new(),
                stderr: e.to_string(),
                exit_code: None,
            },
        }
    }

    /// Full-suite mode: rebuild, then run every corpus test in lexical
    /// order and collect verdicts.
    pub async fn run_suite(&self) -> Result<SuiteReport> {
        let handle = self.build_toolchain().await?;

        let names = self.list_tests()?;
        if names.is_empty() {
            return Err(CliError::InvalidInput(format!(
                "No test files found in {}",
                self.tests_dir().display()
            )));
        }

        info!(total = names.len(), "running test corpus");
        let mut report = SuiteReport::default();

        for name in names {
            let path = self.tests_dir().join(&name);
            debug!(test = %name, "checking");
            let result = self.check_file(&handle, &path).await;

            if result.passed {
                info!(test = %name, "ok");
                report.passed.push(name);
            } else {
                info!(test = %name, "FAILED");
                report.failed.push(FailedTest {
                    name,
                    error: result.stderr,
                    output: result.stdout,
                });
            }
        }

        Ok(report)
    }

    /// Resolve a test name to its file, auto-appending the source extension
    /// when missing.
    pub fn resolve_test_name(&self, name: &str) -> String {
        let suffix = format!(".{}", self.pipeline.source_ext);
        if name.ends_with(&suffix) {
            name.to_string()
        } else {
            format!("{}{}", name, suffix)
        }
    }

    /// Single-test detail mode: return the raw source and the full,
    /// untruncated check result.
    pub async fn run_single(&self, name: &str) -> Result<(String, SingleResult)> {
        let file_name = self.resolve_test_name(name);
        let path = self.tests_dir().join(&file_name);
        if !path.is_file() {
            return Err(CliError::InvalidInput(format!(
                "Test file not found: {}",
                path.display()
            )));
        }

        let source = std::fs::read_to_string(&path)?;

        let mut resolver = ToolchainResolver::new(self.toolchain.clone());
        let handle = resolver.resolve().await?;

        let result = self.check_file(&handle, &path).await;
        Ok((source, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CliConfig;

    fn harness_config() -> HarnessConfig {
        CliConfig::default().harness
    }

    #[test]
    fn test_classification_truth_table() {
        let config = harness_config();
        let ok = format!("header\n{}\ntrailer", config.success_marker);
        let bad = format!("{}\n", config.failure_marker);
        let both = format!("{}\n{}\n", config.success_marker, config.failure_marker);

        assert_eq!(classify_output(&ok, &config), MarkerOutcome::Accepted);
        assert_eq!(classify_output(&bad, &config), MarkerOutcome::Rejected);
        assert_eq!(classify_output(&both, &config), MarkerOutcome::Rejected);
        assert_eq!(classify_output("nothing relevant", &config), MarkerOutcome::Silent);

        assert!(classify_output(&ok, &config).is_pass());
        assert!(!classify_output(&both, &config).is_pass());
        assert!(!classify_output("", &config).is_pass());
    }

    #[test]
    fn test_resolve_test_name_appends_extension() {
        let config = CliConfig::default();
        let harness = TestHarness::new(config.toolchain, config.pipeline, config.harness);

        assert_eq!(harness.resolve_test_name("test3"), "test3.go");
        assert_eq!(harness.resolve_test_name("test3.go"), "test3.go");
    }

    #[test]
    fn test_suite_report_rates() {
        let mut report = SuiteReport::default();
        assert_eq!(report.success_rate(), 0.0);

        report.passed.push("test1.go".to_string());
        report.failed.push(FailedTest {
            name: "test2.go".to_string(),
            error: String::new(),
            output: String::new(),
        });
        assert_eq!(report.total(), 2);
        assert!((report.success_rate() - 50.0).abs() < f64::EPSILON);
    }
}
