//! The compile → assemble → execute pipeline over the backend toolchain.
//!
//! Each stage is a pure request/response operation: it invokes one external
//! tool, classifies the exit status, and either produces an artifact or a
//! typed [`StageError`]. An artifact exists on disk iff its stage exited 0;
//! a failed stage never leaves a partially written file behind.

use crate::cli::PipelineConfig;
use crate::toolchain::ToolchainHandle;
use crate::CliError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

mod stages;

pub(crate) const STAGE_ASSEMBLY: &str = "compile→asm";
pub(crate) const STAGE_LINK: &str = "asm→binary";
pub(crate) const STAGE_EXECUTE: &str = "execute";

/// Stage-local failure taxonomy. These are recorded per input and never
/// abort a batch on their own.
#[derive(Error, Debug)]
pub enum StageError {
    #[error("compile stage failed: {diagnostics}")]
    Compile { diagnostics: String },

    #[error("assemble stage failed: {diagnostics}")]
    Assemble { diagnostics: String },

    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Timeout")]
    Timeout,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StageError {
    /// Diagnostic text suitable for a verdict record.
    pub fn diagnostics(&self) -> String {
        match self {
            StageError::Compile { diagnostics } | StageError::Assemble { diagnostics } => {
                diagnostics.clone()
            }
            other => other.to_string(),
        }
    }
}

impl From<StageError> for CliError {
    fn from(e: StageError) -> Self {
        match e {
            StageError::Io(io) => CliError::Io(io),
            other => CliError::Compilation(other.diagnostics()),
        }
    }
}

/// Options shared by the pipeline stages.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Extension of the input language source files
    pub source_ext: String,
    /// Assembler/linker driver
    pub assembler: String,
    /// Flags passed before `-o` (position-independent code stays disabled)
    pub assembler_flags: Vec<String>,
    /// Ceiling applied to every stage invocation; `None` blocks until the
    /// child exits
    pub timeout: Option<Duration>,
}

impl From<&PipelineConfig> for PipelineOptions {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            source_ext: config.source_ext.clone(),
            assembler: config.assembler.clone(),
            assembler_flags: config.assembler_flags.clone(),
            timeout: None,
        }
    }
}

/// Textual output of the compile stage: the artifact path plus whatever the
/// backend wrote on standard error.
#[derive(Debug)]
pub struct AssemblyArtifact {
    pub path: PathBuf,
    pub diagnostics: String,
}

/// Captured outcome of running a produced binary. A clean nonzero exit is
/// data, not an error; the caller decides policy.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Pipeline over one resolved toolchain. Stage methods live in the
/// `stages` submodules.
pub struct Pipeline {
    toolchain: ToolchainHandle,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(toolchain: ToolchainHandle, options: PipelineOptions) -> Self {
        Self { toolchain, options }
    }

    pub fn toolchain(&self) -> &ToolchainHandle {
        &self.toolchain
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }
}

/// Run a prepared command, applying the stage timeout. Spawn failure maps to
/// `Launch`, an elapsed ceiling to `Timeout`.
pub(crate) async fn run_stage_command(
    program: &str,
    cmd: &mut Command,
    timeout: Option<Duration>,
) -> Result<std::process::Output, StageError> {
    let fut = cmd.output();
    let result = match timeout {
        Some(budget) => match tokio::time::timeout(budget, fut).await {
            Ok(result) => result,
            Err(_) => return Err(StageError::Timeout),
        },
        None => fut.await,
    };

    result.map_err(|source| StageError::Launch {
        program: program.to_string(),
        source,
    })
}

/// Prefer stderr for diagnostics, fall back to stdout, then to a fixed note.
pub(crate) fn diagnostics_from_output(output: &std::process::Output, tool: &str) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let mut message = stderr.trim().to_string();
    if message.is_empty() {
        message = String::from_utf8_lossy(&output.stdout).trim().to_string();
    }
    if message.is_empty() {
        message = format!("{} failed without diagnostics", tool);
    }
    message
}
