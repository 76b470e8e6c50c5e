//! Backend toolchain resolution.
//!
//! The backend compiler is an external executable built from C++ sources. It
//! is located (or lazily rebuilt) here; everything downstream only sees an
//! immutable [`ToolchainHandle`].

use crate::cli::ToolchainConfig;
use crate::{CliError, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

/// Host platform tag carried by a resolved handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Posix,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }

    /// Suffix appended to executables on this platform.
    pub fn exe_suffix(self) -> &'static str {
        match self {
            Platform::Windows => ".exe",
            Platform::Posix => "",
        }
    }
}

/// Resolved path to the backend compiler. Immutable once resolved.
#[derive(Debug, Clone)]
pub struct ToolchainHandle {
    pub path: PathBuf,
    pub platform: Platform,
    pub executable: bool,
}

/// Resolution state machine. The rebuild is the only transition from
/// `Unresolved` to `Resolved`; a second `resolve` on a `Resolved` state
/// returns the cached handle without touching the build tool.
#[derive(Debug, Clone)]
pub enum ResolverState {
    Unresolved,
    Resolving,
    Resolved(ToolchainHandle),
    Failed,
}

pub struct ToolchainResolver {
    config: ToolchainConfig,
    state: ResolverState,
    rebuilds: usize,
}

impl ToolchainResolver {
    pub fn new(config: ToolchainConfig) -> Self {
        Self {
            config,
            state: ResolverState::Unresolved,
            rebuilds: 0,
        }
    }

    /// Whether the process runs inside a container, detected by the marker
    /// file the container image ships.
    pub fn in_container(&self) -> bool {
        self.config.container_marker.exists()
    }

    /// Directory holding the backend sources for the current environment.
    pub fn source_dir(&self) -> &Path {
        if self.in_container() {
            &self.config.container_source_dir
        } else {
            &self.config.source_dir
        }
    }

    /// Expected path of the backend executable for the current platform and
    /// environment.
    pub fn expected_path(&self) -> PathBuf {
        let platform = Platform::current();
        let file_name = format!("{}{}", self.config.exe_name, platform.exe_suffix());
        self.source_dir().join(file_name)
    }

    /// Number of rebuild invocations performed by this resolver.
    pub fn rebuild_count(&self) -> usize {
        self.rebuilds
    }

    pub fn state(&self) -> &ResolverState {
        &self.state
    }

    /// Locate the backend executable, rebuilding it from source when missing.
    /// Resolving twice without external changes yields the same handle and
    /// performs zero additional rebuilds.
    pub async fn resolve(&mut self) -> Result<ToolchainHandle> {
        if let ResolverState::Resolved(handle) = &self.state {
            return Ok(handle.clone());
        }

        self.state = ResolverState::Resolving;
        let expected = self.expected_path();

        if !expected.exists() {
            info!(path = %expected.display(), "backend executable missing, rebuilding");
            let heal = match self.collect_sources() {
                Ok(sources) => self.rebuild(&sources).await,
                Err(e) => Err(e),
            };
            if let Err(e) = heal {
                self.state = ResolverState::Failed;
                return Err(e);
            }

            if !expected.exists() {
                self.state = ResolverState::Failed;
                return Err(CliError::Toolchain(format!(
                    "rebuild succeeded but {} was not produced",
                    expected.display()
                )));
            }
        }

        match ensure_executable(&expected) {
            Ok(()) => {
                let handle = ToolchainHandle {
                    path: expected,
                    platform: Platform::current(),
                    executable: true,
                };
                self.state = ResolverState::Resolved(handle.clone());
                Ok(handle)
            }
            Err(e) => {
                self.state = ResolverState::Failed;
                Err(CliError::Toolchain(format!(
                    "{} is not usable as an executable: {}",
                    expected.display(),
                    e
                )))
            }
        }
    }

    /// Rebuild unconditionally from the configured fixed source-file list
    /// (used by the regression harness), then resolve the fresh executable.
    pub async fn force_rebuild(&mut self) -> Result<ToolchainHandle> {
        self.state = ResolverState::Resolving;

        let sources: Vec<PathBuf> = if self.config.sources.is_empty() {
            match self.collect_sources() {
                Ok(sources) => sources,
                Err(e) => {
                    self.state = ResolverState::Failed;
                    return Err(e);
                }
            }
        } else {
            self.config.sources.iter().map(PathBuf::from).collect()
        };

        match self.rebuild(&sources).await {
            Ok(()) => {}
            Err(e) => {
                self.state = ResolverState::Failed;
                return Err(e);
            }
        }

        let expected = self.expected_path();
        if !expected.exists() {
            self.state = ResolverState::Failed;
            return Err(CliError::Toolchain(format!(
                "rebuild succeeded but {} was not produced",
                expected.display()
            )));
        }

        ensure_executable(&expected).map_err(|e| {
            self.state = ResolverState::Failed;
            CliError::Toolchain(format!("{} is not executable: {}", expected.display(), e))
        })?;

        let handle = ToolchainHandle {
            path: expected,
            platform: Platform::current(),
            executable: true,
        };
        self.state = ResolverState::Resolved(handle.clone());
        Ok(handle)
    }

    /// All backend source files in the source directory, sorted by name.
    fn collect_sources(&self) -> Result<Vec<PathBuf>> {
        let dir = self.source_dir();
        let entries = std::fs::read_dir(dir).map_err(|e| {
            CliError::Toolchain(format!("cannot read backend sources in {}: {}", dir.display(), e))
        })?;

        let mut sources: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().map_or(false, |ext| ext == "cpp"))
            .filter_map(|path| path.file_name().map(PathBuf::from))
            .collect();
        sources.sort();

        if sources.is_empty() {
            return Err(CliError::Toolchain(format!(
                "no backend sources found in {}",
                dir.display()
            )));
        }
        Ok(sources)
    }

    /// Invoke the system C++ compiler in the backend source directory. The
    /// working directory is set on the child only; the orchestrator's own
    /// cwd is never touched.
    async fn rebuild(&mut self, sources: &[PathBuf]) -> Result<()> {
        let platform = Platform::current();
        let exe_file = format!("{}{}", self.config.exe_name, platform.exe_suffix());
        let dir = self.source_dir().to_path_buf();

        let mut cmd = Command::new(&self.config.compiler);
        cmd.current_dir(&dir)
            .arg("-o")
            .arg(&exe_file)
            .args(sources)
            .args(&self.config.compiler_flags);

        debug!(compiler = %self.config.compiler, dir = %dir.display(), "rebuilding backend");
        self.rebuilds += 1;

        let budget = Duration::from_secs(self.config.build_timeout_secs);
        let output = match tokio::time::timeout(budget, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(CliError::Toolchain(format!(
                    "failed to invoke {}: {}",
                    self.config.compiler, e
                )));
            }
            Err(_) => {
                return Err(CliError::Toolchain(format!(
                    "backend rebuild exceeded {}s",
                    self.config.build_timeout_secs
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CliError::Toolchain(format!(
                "{} failed: {}",
                self.config.compiler,
                stderr.trim()
            )));
        }

        info!(exe = %exe_file, "backend rebuilt");
        Ok(())
    }
}

/// Make sure the file carries the executable bit on POSIX platforms.
pub(crate) fn ensure_executable(path: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let metadata = std::fs::metadata(path)?;
        let mut perms = metadata.permissions();
        if perms.mode() & 0o111 == 0 {
            perms.set_mode(0o755);
            std::fs::set_permissions(path, perms)?;
        }
    }
    #[cfg(not(unix))]
    {
        let _ = std::fs::metadata(path)?;
    }
    Ok(())
}
