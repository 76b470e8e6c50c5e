//! Gosling CLI Binary
//!
//! Drives the external Go-subset compiler backend: programs go through the
//! compile → assemble → execute pipeline, and the regression harness batches
//! the whole test corpus with per-test verdicts.
//!
//! # Usage
//!
//! ```bash
//! # Compile a source file to assembly
//! gosling compile tests/test1.go --output-dir outputs
//!
//! # Run the full pipeline on the built-in greeting sample
//! gosling run
//!
//! # Generate assembly for the whole corpus
//! gosling batch backend/tests outputs
//!
//! # Rebuild the backend and run the regression suite
//! gosling test
//!
//! # Inspect one test in detail
//! gosling test --name test3
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use gosling_cli::{
    cli::CliConfig,
    commands::{
        self, batch::BatchArgs, compile::CompileArgs, run::RunArgs, test::TestArgs,
    },
    diagnostics::setup_error_reporting,
    Result,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "gosling",
    version = env!("CARGO_PKG_VERSION"),
    about = "Driver and regression harness for the gosling compiler backend",
    long_about = r#"
Gosling orchestrates an external Go-subset compiler: it locates (or rebuilds)
the backend executable, turns source programs into assembly and native
binaries, and batches the test corpus through the pipeline.

EXAMPLES:
    gosling run hello.go                  # Compile, link and execute
    gosling compile tests/test1.go        # Assembly only
    gosling batch                         # Whole corpus to outputs/
    gosling test --name test3             # One test, full diagnostics
    "#
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (use multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Set log level (overrides --verbose/--quiet)
    #[arg(long, global = true, value_enum)]
    log: Option<LogLevel>,

    /// Set log output format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    log_format: LogFormat,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    directory: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile source programs to assembly
    Compile(CompileArgs),

    /// Compile, link and execute one program
    Run(RunArgs),

    /// Run the compile stage over the whole input corpus
    Batch(BatchArgs),

    /// Rebuild the backend and run the regression suite
    Test(TestArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up error reporting
    setup_error_reporting()?;

    // Configure logging
    setup_logging(cli.verbose, cli.quiet, cli.log, cli.log_format)?;

    // Change working directory if specified
    if let Some(dir) = &cli.directory {
        std::env::set_current_dir(dir).map_err(gosling_cli::CliError::Io)?;
    }

    // Load configuration
    let config = CliConfig::load(cli.config.as_deref())?;

    // Execute command
    let result = match cli.command {
        Commands::Compile(args) => commands::compile_command(args, &config).await,
        Commands::Run(args) => commands::run_command(args, &config).await,
        Commands::Batch(args) => commands::batch_command(args, &config).await,
        Commands::Test(args) => commands::test_command(args, &config).await,
    };

    match result {
        Ok(_) => {
            if cli.verbose > 0 {
                info!("Command completed successfully");
            }
            Ok(())
        }
        Err(e) => {
            use tracing::error;
            if !gosling_cli::diagnostics::render_cli_error(&e) {
                // Emit via structured logging rather than printing directly
                error!("{}", e);
            }
            if cli.verbose > 0 {
                error!(?e, "detailed error context");
            }
            std::process::exit(1);
        }
    }
}

fn setup_logging(
    verbose: u8,
    quiet: bool,
    log_level: Option<LogLevel>,
    log_format: LogFormat,
) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if let Some(level) = log_level {
        EnvFilter::new(match level {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        })
    } else if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let formatter = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .with_level(true);

    match log_format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(formatter)
                .with(filter)
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(formatter.json())
                .with(filter)
                .init();
        }
    }

    Ok(())
}
