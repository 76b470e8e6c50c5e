//! Compilation command implementation

use crate::cli::CliConfig;
use crate::commands::{setup_progress_bar, validate_paths_exist};
use crate::pipeline::{Pipeline, PipelineOptions};
use crate::toolchain::ToolchainResolver;
use crate::Result;
use clap::Args;
use console::style;
use std::path::{Path, PathBuf};
use tracing::info;

/// Arguments for the compile command
#[derive(Debug, Clone, Args)]
pub struct CompileArgs {
    /// Source files to compile to assembly
    pub input: Vec<PathBuf>,

    /// Directory receiving the generated `.s` artifacts
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

/// Execute the compile command: stage 1 only, one artifact per input.
pub async fn compile_command(args: CompileArgs, config: &CliConfig) -> Result<()> {
    validate_paths_exist(&args.input, true)?;

    let output_dir = args
        .output_dir
        .unwrap_or_else(|| config.pipeline.output_dir.clone());

    let mut resolver = ToolchainResolver::new(config.toolchain.clone());
    let toolchain = resolver.resolve().await?;
    let pipeline = Pipeline::new(toolchain, PipelineOptions::from(&config.pipeline));

    let progress = setup_progress_bar(args.input.len());
    let mut artifacts = Vec::new();

    for input in &args.input {
        progress.set_message(format!("Compiling {}", input.display()));

        let source_text = std::fs::read_to_string(input)?;
        let target = output_dir.join(artifact_name(input));
        let artifact = pipeline.compile_to_assembly(&source_text, &target).await?;

        info!(artifact = %artifact.path.display(), "generated");
        artifacts.push(artifact);
        progress.inc(1);
    }

    progress.finish_with_message(format!(
        "{} Compiled {} file(s) successfully",
        style("✓").green(),
        artifacts.len()
    ));

    for artifact in &artifacts {
        println!("   - {}", artifact.path.display());
    }

    Ok(())
}

fn artifact_name(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "out".to_string());
    PathBuf::from(stem).with_extension("s")
}
