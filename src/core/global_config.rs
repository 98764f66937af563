//! Global configuration management
//!
//! Reads and manages user defaults from `config.toml` in the config directory:
//! install prefix, linear solver, conda command, build job count, whether to
//! keep build directories, and per-package git ref overrides.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::options::LinearSolver;
use crate::core::package::Package;
use crate::infra::dirs::ForgeDirs;

/// Global configuration error types
#[derive(Error, Debug)]
pub enum GlobalConfigError {
    /// Failed to read config file
    #[error("Failed to read config file '{path}': {error}")]
    ReadError { path: String, error: String },

    /// Failed to parse config file
    #[error("Failed to parse config file '{path}': {error}")]
    ParseError { path: String, error: String },
}

/// Global configuration for optforge
///
/// Every value is optional; command-line flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Install defaults
    #[serde(default)]
    pub install: InstallConfig,

    /// Default build options
    #[serde(default)]
    pub build: BuildConfig,

    /// Git ref overrides keyed by package name
    #[serde(default)]
    pub refs: BTreeMap<Package, String>,
}

/// Install defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstallConfig {
    /// Prefix used when no environment is active
    pub prefix: Option<PathBuf>,

    /// Default linear solver
    pub linear_solver: Option<LinearSolver>,

    /// Conda executable
    pub conda_cmd: Option<String>,
}

/// Default build options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Default number of parallel jobs
    pub jobs: Option<usize>,

    /// Keep scratch build directories by default
    pub keep_build_dir: Option<bool>,
}

impl GlobalConfig {
    /// Load global configuration from the config directory
    ///
    /// If the config file doesn't exist, returns default configuration.
    /// If the config file exists but is invalid, returns an error.
    ///
    /// # Errors
    ///
    /// Returns `GlobalConfigError::ParseError` if the config file exists but
    /// contains invalid TOML.
    pub fn load(dirs: &ForgeDirs) -> Result<Self, GlobalConfigError> {
        Self::load_from_path(&dirs.global_config_path())
    }

    /// Load global configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, GlobalConfigError> {
        if !path.exists() {
            tracing::debug!("No config file at {}", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| GlobalConfigError::ReadError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        tracing::debug!("Loaded config from {}", path.display());
        toml::from_str(&content).map_err(|e| GlobalConfigError::ParseError {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }

    /// Get the effective number of build jobs
    ///
    /// Returns the custom value if set, otherwise half the logical cores.
    #[must_use]
    pub fn build_jobs(&self) -> usize {
        self.build
            .jobs
            .filter(|jobs| *jobs > 0)
            .unwrap_or_else(crate::config::defaults::default_build_jobs)
    }

    /// Get the effective conda command
    #[must_use]
    pub fn conda_cmd(&self) -> &str {
        self.install
            .conda_cmd
            .as_deref()
            .unwrap_or(crate::config::defaults::DEFAULT_CONDA_CMD)
    }

    /// Git ref override for a package, if configured
    #[must_use]
    pub fn git_ref(&self, package: Package) -> Option<&str> {
        self.refs.get(&package).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = GlobalConfig::default();
        assert!(config.install.prefix.is_none());
        assert!(config.install.linear_solver.is_none());
        assert!(config.build.jobs.is_none());
        assert!(config.refs.is_empty());
        assert_eq!(config.conda_cmd(), "conda");
        assert!(config.build_jobs() >= 1);
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let config = GlobalConfig::load_from_path(&config_path).unwrap();
        assert_eq!(config, GlobalConfig::default());
    }

    #[test]
    fn test_load_valid_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let content = r#"
[install]
prefix = "/opt/ipopt"
linear_solver = "hsl"
conda_cmd = "mamba"

[build]
jobs = 6
keep_build_dir = true

[refs]
ipopt = "releases/3.14.16"
"#;
        fs::write(&config_path, content).unwrap();

        let config = GlobalConfig::load_from_path(&config_path).unwrap();
        assert_eq!(config.install.prefix, Some(PathBuf::from("/opt/ipopt")));
        assert_eq!(config.install.linear_solver, Some(LinearSolver::Hsl));
        assert_eq!(config.conda_cmd(), "mamba");
        assert_eq!(config.build_jobs(), 6);
        assert_eq!(config.build.keep_build_dir, Some(true));
        assert_eq!(config.git_ref(Package::Ipopt), Some("releases/3.14.16"));
        assert_eq!(config.git_ref(Package::Metis), None);
    }

    #[test]
    fn test_zero_jobs_falls_back_to_default() {
        let config = GlobalConfig {
            build: BuildConfig {
                jobs: Some(0),
                keep_build_dir: None,
            },
            ..GlobalConfig::default()
        };
        assert!(config.build_jobs() >= 1);
    }

    #[test]
    fn test_load_invalid_toml_returns_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        fs::write(&config_path, "invalid toml [[[").unwrap();

        let result = GlobalConfig::load_from_path(&config_path);
        assert!(matches!(result, Err(GlobalConfigError::ParseError { .. })));
    }

    #[test]
    fn test_unknown_package_in_refs_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        fs::write(&config_path, "[refs]\nsnopt = \"7.7\"\n").unwrap();

        assert!(GlobalConfig::load_from_path(&config_path).is_err());
    }
}
