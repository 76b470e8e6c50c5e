//! Batch command implementation

use crate::batch::BatchDriver;
use crate::cli::CliConfig;
use crate::pipeline::{Pipeline, PipelineOptions};
use crate::toolchain::ToolchainResolver;
use crate::Result;
use clap::Args;
use console::style;
use std::path::PathBuf;

/// Arguments for the batch command
#[derive(Debug, Clone, Args)]
pub struct BatchArgs {
    /// Directory holding the input programs
    pub input_dir: Option<PathBuf>,

    /// Directory receiving the generated artifacts
    pub output_dir: Option<PathBuf>,
}

/// Execute the batch command: stage 1 over every discovered input, then an
/// aggregate summary.
pub async fn batch_command(args: BatchArgs, config: &CliConfig) -> Result<()> {
    let input_dir = args
        .input_dir
        .unwrap_or_else(|| config.pipeline.tests_dir.clone());
    let output_dir = args
        .output_dir
        .unwrap_or_else(|| config.pipeline.output_dir.clone());

    if !input_dir.is_dir() {
        return Err(crate::CliError::InvalidInput(format!(
            "Input directory does not exist: {}",
            input_dir.display()
        )));
    }

    let mut resolver = ToolchainResolver::new(config.toolchain.clone());
    let toolchain = resolver.resolve().await?;
    let pipeline = Pipeline::new(toolchain, PipelineOptions::from(&config.pipeline));

    let driver = BatchDriver::new(&pipeline);
    let report = driver.run_batch(&input_dir, &output_dir).await?;

    println!();
    println!("{}", style("Batch summary").bold());
    println!(
        "  Total: {}  Generated: {}  Failed: {}  Success rate: {:.1}%",
        report.total,
        style(report.successful).green(),
        style(report.failed).red(),
        report.success_rate()
    );

    if !report.artifacts.is_empty() {
        println!("\n{} Generated artifacts:", style("✓").green());
        for artifact in &report.artifacts {
            println!("   - {}", artifact.display());
        }
    }

    let failures: Vec<_> = report.verdicts.iter().filter(|v| !v.success).collect();
    if !failures.is_empty() {
        println!("\n{} Failures:", style("✗").red());
        for verdict in failures {
            let first_line = verdict.diagnostics.lines().next().unwrap_or("");
            println!("   - {}: {}", verdict.name, first_line);
        }
    }

    Ok(())
}
