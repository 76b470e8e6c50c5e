//! Diagnostic and error reporting utilities

use crate::{CliError, Result};
use console::style;

/// Set up enhanced error reporting with miette
pub fn setup_error_reporting() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .map_err(|e| CliError::Config(format!("Failed to setup error reporting: {}", e)))?;

    Ok(())
}

/// Render a top-level error for the terminal. Returns false when the caller
/// should fall back to structured logging instead.
pub fn render_cli_error(error: &CliError) -> bool {
    match error {
        CliError::Toolchain(message) => {
            eprintln!("{} {}", style("✗").red(), style("toolchain unavailable").red().bold());
            eprintln!("  {}", message);
            true
        }
        CliError::Compilation(message) => {
            eprintln!("{} {}", style("✗").red(), style("compilation failed").red().bold());
            eprintln!("  {}", message);
            true
        }
        CliError::InvalidInput(message) | CliError::Config(message) => {
            eprintln!("{} {}", style("✗").red(), message);
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_covers_stage_errors() {
        assert!(render_cli_error(&CliError::Toolchain("missing".into())));
        assert!(render_cli_error(&CliError::Compilation("bad token".into())));
        assert!(render_cli_error(&CliError::InvalidInput("no such file".into())));
    }

    #[test]
    fn test_render_defers_io_errors() {
        let io = CliError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert!(!render_cli_error(&io));
    }
}
