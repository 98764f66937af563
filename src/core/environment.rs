//! Python environment detection
//!
//! A conda environment is active when `CONDA_PREFIX` is set and a virtual
//! environment when `VIRTUAL_ENV` is set. Both determine the default prefix.

use std::env;
use std::path::PathBuf;

/// Snapshot of the active Python environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    /// Value of `CONDA_PREFIX`
    pub conda_prefix: Option<PathBuf>,
    /// Value of `VIRTUAL_ENV`
    pub virtual_env: Option<PathBuf>,
}

impl Environment {
    /// Read the current process environment
    pub fn detect() -> Self {
        let env = Self::from_vars(
            env::var_os("CONDA_PREFIX").map(PathBuf::from),
            env::var_os("VIRTUAL_ENV").map(PathBuf::from),
        );
        tracing::debug!("Detected environment: {env:?}");
        env
    }

    /// Build from explicit values; empty values count as unset
    pub fn from_vars(conda_prefix: Option<PathBuf>, virtual_env: Option<PathBuf>) -> Self {
        let non_empty = |p: Option<PathBuf>| p.filter(|p| !p.as_os_str().is_empty());
        Self {
            conda_prefix: non_empty(conda_prefix),
            virtual_env: non_empty(virtual_env),
        }
    }

    /// Whether a conda environment is active
    pub fn conda_active(&self) -> bool {
        self.conda_prefix.is_some()
    }

    /// Whether packages may be installed with conda
    pub fn conda_allowed(&self, ignore_conda: bool) -> bool {
        self.conda_active() && !ignore_conda
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::path::Path;

    #[test]
    fn test_from_vars_keeps_both_environments() {
        let env = Environment::from_vars(
            Some(PathBuf::from("/conda/envs/opt")),
            Some(PathBuf::from("/venv")),
        );
        assert!(env.conda_active());
        assert_eq!(env.conda_prefix.as_deref(), Some(Path::new("/conda/envs/opt")));
        assert_eq!(env.virtual_env.as_deref(), Some(Path::new("/venv")));
    }

    #[test]
    fn test_conda_allowed_respects_ignore_flag() {
        let env = Environment::from_vars(Some(PathBuf::from("/conda")), None);
        assert!(env.conda_allowed(false));
        assert!(!env.conda_allowed(true));
        assert!(!Environment::default().conda_allowed(false));
    }

    #[test]
    fn test_empty_values_are_unset() {
        let env = Environment::from_vars(Some(PathBuf::new()), Some(PathBuf::from("/venv")));
        assert!(!env.conda_active());
        assert_eq!(env.virtual_env.as_deref(), Some(Path::new("/venv")));
    }

    #[test]
    #[serial]
    fn test_detect_reads_process_environment() {
        temp_env::with_vars(
            [
                ("CONDA_PREFIX", None),
                ("VIRTUAL_ENV", Some("/tmp/optforge-venv")),
            ],
            || {
                let env = Environment::detect();
                assert!(!env.conda_active());
                assert_eq!(env.virtual_env.as_deref(), Some(Path::new("/tmp/optforge-venv")));
            },
        );
    }
}
