//! Run command implementation: the full compile → assemble → execute
//! pipeline for a single program.

use crate::cli::CliConfig;
use crate::commands::validate_paths_exist;
use crate::pipeline::{Pipeline, PipelineOptions};
use crate::toolchain::ToolchainResolver;
use crate::Result;
use clap::Args;
use console::style;
use std::path::PathBuf;
use tracing::info;

/// Built-in sample used when no file is given.
const SAMPLE_PROGRAM: &str = r#"package main

import "fmt"

func main() {
    fmt.Println("Hello, World!")
}
"#;

/// Arguments for the run command
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Source file to run (a built-in greeting sample when omitted)
    pub file: Option<PathBuf>,

    /// Directory receiving the intermediate artifacts
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Name of the produced executable
    #[arg(long, default_value = "program")]
    pub exec_name: String,
}

pub async fn run_command(args: RunArgs, config: &CliConfig) -> Result<()> {
    let (source_text, stem) = match &args.file {
        Some(file) => {
            validate_paths_exist(std::slice::from_ref(file), true)?;
            let stem = file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "program".to_string());
            (std::fs::read_to_string(file)?, stem)
        }
        None => (SAMPLE_PROGRAM.to_string(), "sample".to_string()),
    };

    let output_dir = args
        .output_dir
        .unwrap_or_else(|| config.pipeline.output_dir.clone());

    let mut resolver = ToolchainResolver::new(config.toolchain.clone());
    let toolchain = resolver.resolve().await?;
    let pipeline = Pipeline::new(toolchain, PipelineOptions::from(&config.pipeline));

    let asm_target = output_dir.join(format!("{}.s", stem));
    let artifact = pipeline.compile_to_assembly(&source_text, &asm_target).await?;
    info!(artifact = %artifact.path.display(), "assembly generated");

    let binary = pipeline
        .assemble_to_executable(&artifact.path, &args.exec_name)
        .await?;
    info!(binary = %binary.display(), "binary linked");

    let result = pipeline.execute_and_capture(&binary).await?;

    if !result.stdout.is_empty() {
        print!("{}", result.stdout);
    }
    if result.success() {
        println!("{} program exited 0", style("✓").green());
    } else {
        if !result.stderr.is_empty() {
            eprint!("{}", result.stderr);
        }
        println!(
            "{} program exited with {}",
            style("✗").red(),
            result
                .exit_code
                .map(|code| code.to_string())
                .unwrap_or_else(|| "signal".to_string())
        );
    }

    Ok(())
}
