//! Gosling CLI Library
//!
//! This crate drives the gosling Go-subset compiler backend. It resolves or
//! rebuilds the backend executable and pushes source programs through the
//! compile → assemble → execute pipeline; the regression harness batches the
//! test corpus through the same machinery.

pub mod batch;
pub mod cli;
pub mod commands;
pub mod diagnostics;
pub mod harness;
pub mod pipeline;
pub mod toolchain;
pub mod utils;

// CLI-specific error handling
pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum CliError {
        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),

        #[error("Configuration error: {0}")]
        Config(String),

        #[error("Toolchain unavailable: {0}")]
        Toolchain(String),

        #[error("Compilation error: {0}")]
        Compilation(String),

        #[error("Invalid input: {0}")]
        InvalidInput(String),

        #[error("Missing dependency: {0}")]
        MissingDependency(String),
    }

    pub type Result<T> = std::result::Result<T, CliError>;
}

pub use error::{CliError, Result};
