//! Directory management
//!
//! Platform config location, scoped working-directory changes and scratch
//! build directories.
//!
//! Environment variables can override default directories:
//! - `OPTFORGE_CONFIG_DIR` - Override config directory

use std::env;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::FilesystemError;

/// Environment variable name for the config directory override
pub const ENV_CONFIG_DIR: &str = "OPTFORGE_CONFIG_DIR";

/// Application name used in directory paths
const APP_NAME: &str = "optforge";

/// Prefix for scratch build directory names
const SCRATCH_PREFIX: &str = "optforge-";

/// Platform-specific directory provider for optforge
#[derive(Debug, Clone)]
pub struct ForgeDirs {
    config_dir: PathBuf,
    home_dir: Option<PathBuf>,
}

impl ForgeDirs {
    /// Create a new `ForgeDirs` instance
    ///
    /// Checks environment variables first, then falls back to platform defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config_dir: Self::resolve_config_dir(),
            home_dir: dirs::home_dir(),
        }
    }

    /// Get the config directory path
    ///
    /// - Linux: `$XDG_CONFIG_HOME/optforge` or `~/.config/optforge`
    /// - macOS: `~/Library/Application Support/optforge`
    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }

    /// Get the user's home directory, if known
    #[must_use]
    pub fn home_dir(&self) -> Option<&Path> {
        self.home_dir.as_deref()
    }

    /// Get the global config file path
    #[must_use]
    pub fn global_config_path(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    fn resolve_config_dir() -> PathBuf {
        if let Ok(path) = env::var(ENV_CONFIG_DIR) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .map(|h| h.join(".config").join(APP_NAME))
                    .unwrap_or_else(|| PathBuf::from(".").join(".config").join(APP_NAME))
            })
    }
}

impl Default for ForgeDirs {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped change of the process working directory
///
/// The previous directory is restored when the guard is dropped, on every
/// exit path including `?` propagation and panics.
#[derive(Debug)]
pub struct DirGuard {
    previous: PathBuf,
}

impl DirGuard {
    /// Change into `path`, remembering the current directory
    pub fn enter(path: &Path) -> Result<Self, FilesystemError> {
        let previous = env::current_dir().map_err(|e| FilesystemError::ChangeDir {
            path: path.to_path_buf(),
            error: format!("current directory is unavailable: {e}"),
        })?;

        env::set_current_dir(path).map_err(|e| FilesystemError::ChangeDir {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        tracing::info!("Changed directory to {}", path.display());

        Ok(Self { previous })
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        match env::set_current_dir(&self.previous) {
            Ok(()) => tracing::info!("Changed directory back to {}", self.previous.display()),
            Err(e) => tracing::warn!(
                "Failed to restore working directory {}: {e}",
                self.previous.display()
            ),
        }
    }
}

/// Scratch directory for a single source build
#[derive(Debug)]
pub enum ScratchDir {
    /// Removed when dropped
    Temporary(TempDir),
    /// Left on disk for the user to inspect
    Kept(PathBuf),
}

impl ScratchDir {
    /// Create a fresh scratch directory in the system temp location
    pub fn create(keep: bool) -> Result<Self, FilesystemError> {
        let dir = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir()
            .map_err(|e| FilesystemError::CreateDir {
                path: env::temp_dir(),
                error: e.to_string(),
            })?;

        if keep {
            Ok(Self::Kept(dir.keep()))
        } else {
            Ok(Self::Temporary(dir))
        }
    }

    /// Path of the scratch directory
    pub fn path(&self) -> &Path {
        match self {
            Self::Temporary(dir) => dir.path(),
            Self::Kept(path) => path,
        }
    }

    /// Path left behind after the run, if any
    pub fn kept_path(&self) -> Option<&Path> {
        match self {
            Self::Temporary(_) => None,
            Self::Kept(path) => Some(path),
        }
    }
}
