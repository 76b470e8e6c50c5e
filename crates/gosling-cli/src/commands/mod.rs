//! Command implementations for the gosling CLI

pub mod batch;
pub mod compile;
pub mod run;

// Re-export command functions
pub use batch::batch_command;
pub use compile::compile_command;
pub use run::run_command;
pub use test::test_command;

use crate::{CliError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

/// Create a consistently styled progress bar for command loops.
pub fn setup_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "  {spinner:.cyan} {wide_msg}  {bar:40.cyan/blue}  {pos}/{len}",
        )
        .unwrap()
        .progress_chars("#>-"),
    );
    pb
}

/// Validate that all provided paths exist (and optionally are files).
pub fn validate_paths_exist(inputs: &[PathBuf], must_be_files: bool) -> Result<()> {
    for input in inputs {
        if !input.exists() {
            return Err(CliError::InvalidInput(format!(
                "Input path does not exist: {}",
                input.display()
            )));
        }
        if must_be_files && !input.is_file() {
            return Err(CliError::InvalidInput(format!(
                "Input path is not a file: {}",
                input.display()
            )));
        }
    }
    Ok(())
}
