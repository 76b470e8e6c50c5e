//! CLI configuration and settings management

use crate::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration loaded from config files and environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Backend toolchain settings
    pub toolchain: ToolchainConfig,

    /// Pipeline settings
    pub pipeline: PipelineConfig,

    /// Regression harness settings
    pub harness: HarnessConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolchainConfig {
    /// Directory holding the backend compiler sources
    pub source_dir: PathBuf,

    /// File name of the backend executable (platform suffix added on Windows)
    pub exe_name: String,

    /// C++ compiler used to rebuild the backend
    pub compiler: String,

    /// Extra flags passed to the C++ compiler
    pub compiler_flags: Vec<String>,

    /// Fixed source-file list used by the harness rebuild; the resolver's
    /// self-heal path collects the sources itself instead
    pub sources: Vec<String>,

    /// Marker file whose presence signals a container environment
    pub container_marker: PathBuf,

    /// Backend source directory when running inside a container
    pub container_source_dir: PathBuf,

    /// Ceiling on a backend rebuild, in seconds
    pub build_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Extension of the input language source files
    pub source_ext: String,

    /// Assembler/linker driver producing native binaries
    pub assembler: String,

    /// Extra flags passed to the assembler driver
    pub assembler_flags: Vec<String>,

    /// Default directory for batch artifacts
    pub output_dir: PathBuf,

    /// Default directory holding the test corpus
    pub tests_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Glob matched against test file names
    pub test_pattern: String,

    /// Substring the backend prints when the frontend accepts a program.
    /// Must match the backend's own wording.
    pub success_marker: String,

    /// Substring the backend prints when the frontend rejects a program
    pub failure_marker: String,

    /// Ceiling on a single test invocation, in seconds
    pub test_timeout_secs: u64,

    /// How many failing tests get a diagnostic excerpt in the summary
    pub max_failure_details: usize,

    /// Prefix length kept when truncating captured stderr
    pub stderr_excerpt_len: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            toolchain: ToolchainConfig {
                source_dir: PathBuf::from("backend"),
                exe_name: "gosc".to_string(),
                compiler: "g++".to_string(),
                compiler_flags: vec!["-std=c++11".to_string()],
                sources: vec![
                    "main.cpp".to_string(),
                    "scanner.cpp".to_string(),
                    "token.cpp".to_string(),
                    "parser.cpp".to_string(),
                    "exp.cpp".to_string(),
                    "visitor.cpp".to_string(),
                    "gencode.cpp".to_string(),
                    "imp_value.cpp".to_string(),
                ],
                container_marker: PathBuf::from("/.dockerenv"),
                container_source_dir: PathBuf::from("/app/backend"),
                build_timeout_secs: 30,
            },
            pipeline: PipelineConfig {
                source_ext: "go".to_string(),
                assembler: "gcc".to_string(),
                assembler_flags: vec!["-no-pie".to_string()],
                output_dir: PathBuf::from("outputs"),
                tests_dir: PathBuf::from("backend/tests"),
            },
            harness: HarnessConfig {
                test_pattern: "test*.go".to_string(),
                success_marker: "Parser exitoso".to_string(),
                failure_marker: "Error en el parser".to_string(),
                test_timeout_secs: 10,
                max_failure_details: 5,
                stderr_excerpt_len: 200,
            },
        }
    }
}

impl CliConfig {
    /// Load configuration from file, falling back to defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = if let Some(path) = config_path {
            Self::load_from_file(path)?
        } else {
            // Try to find config in standard locations
            let mut config = Self::default();

            // Try current directory
            if let Ok(local_config) = Self::load_from_file(Path::new("gosling.toml")) {
                config = config.merge(local_config);
            }

            // Try home directory
            if let Some(home_dir) = dirs::home_dir() {
                let home_config = home_dir.join(".gosling.toml");
                if let Ok(home_config) = Self::load_from_file(&home_config) {
                    config = config.merge(home_config);
                }
            }

            // Try system config directory
            if let Some(config_dir) = dirs::config_dir() {
                let system_config = config_dir.join("gosling").join("config.toml");
                if let Ok(system_config) = Self::load_from_file(&system_config) {
                    config = config.merge(system_config);
                }
            }

            config
        };

        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            CliError::Config(format!("Failed to parse config file {}: {}", path.display(), e))
        })?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CliError::Config(format!("Failed to create config directory: {}", e)))?;
        }

        std::fs::write(path, content)
            .map_err(|e| CliError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Merge this configuration with another, with the other taking precedence
    pub fn merge(self, other: Self) -> Self {
        other
    }

    /// Get the default config file path for the current user
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gosling").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert_eq!(config.toolchain.exe_name, "gosc");
        assert_eq!(config.toolchain.build_timeout_secs, 30);
        assert_eq!(config.pipeline.source_ext, "go");
        assert_eq!(config.harness.test_timeout_secs, 10);
    }

    #[test]
    fn test_config_serialization() {
        let config = CliConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: CliConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.toolchain.exe_name, deserialized.toolchain.exe_name);
        assert_eq!(config.harness.success_marker, deserialized.harness.success_marker);
    }

    #[test]
    fn test_config_file_operations() {
        let config = CliConfig::default();
        let temp_file = NamedTempFile::new().unwrap();

        // Save config
        config.save_to_file(temp_file.path()).unwrap();

        // Load config
        let loaded_config = CliConfig::load_from_file(temp_file.path()).unwrap();

        assert_eq!(config.pipeline.assembler, loaded_config.pipeline.assembler);
    }
}
