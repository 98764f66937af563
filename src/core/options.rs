//! Option resolution
//!
//! Turns command-line flags, the active Python environment and the global
//! config into one immutable [`Options`] record that every later step
//! borrows. Value priority is CLI > environment > global config > default.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::config::defaults::DEFAULT_PREFIX_DIR;
use crate::config::urls::HSL_DOWNLOAD;
use crate::core::environment::Environment;
use crate::core::global_config::GlobalConfig;
use crate::core::package::Package;
use crate::error::OptionError;
use crate::infra::toolchain::CompilerSuite;

/// Linear solver IPOPT is built against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinearSolver {
    /// MUMPS, built from source or installed with conda
    #[default]
    Mumps,
    /// HSL, built from a user-supplied tarball
    Hsl,
    /// PARDISO from Intel MKL
    Pardiso,
}

impl fmt::Display for LinearSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mumps => write!(f, "MUMPS"),
            Self::Hsl => write!(f, "HSL"),
            Self::Pardiso => write!(f, "PARDISO"),
        }
    }
}

/// Where the install prefix came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixSource {
    /// `--prefix` (highest priority)
    Cli,
    /// `$CONDA_PREFIX`
    CondaPrefix,
    /// `$VIRTUAL_ENV`
    VirtualEnv,
    /// `install.prefix` in the global config
    Config,
    /// `~/ipopt` (lowest priority)
    Default,
}

impl fmt::Display for PrefixSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Cli => "command line",
            Self::CondaPrefix => "CONDA_PREFIX",
            Self::VirtualEnv => "VIRTUAL_ENV",
            Self::Config => "config file",
            Self::Default => "default",
        };
        f.write_str(label)
    }
}

/// Unvalidated values as given on the command line
#[derive(Debug, Clone, Default)]
pub struct RawOptions {
    pub prefix: Option<PathBuf>,
    pub linear_solver: Option<LinearSolver>,
    pub intel: bool,
    pub branch: Option<String>,
    pub conda_cmd: Option<String>,
    pub no_delete: bool,
    pub ignore_conda: bool,
    pub force_rebuild: bool,
    pub no_sanity_check: bool,
    pub no_install: bool,
    pub paropt: bool,
    pub snopt_dir: Option<PathBuf>,
    pub hsl_tar_file: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub uninstall_built: bool,
    pub uninstall_conda_pkgs: bool,
    pub verbose: bool,
    pub json: bool,
}

/// Resolved, validated choices for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Absolute install prefix
    pub prefix: PathBuf,
    /// Where `prefix` came from
    pub prefix_source: PrefixSource,
    pub linear_solver: LinearSolver,
    pub compiler_suite: CompilerSuite,
    /// Build ParOpt alongside pyOptSparse
    pub include_paropt: bool,
    /// Absolute SNOPT source directory
    pub snopt_dir: Option<PathBuf>,
    /// Absolute HSL source tarball
    pub hsl_tar_file: Option<PathBuf>,
    pub keep_build_dir: bool,
    pub check_sanity: bool,
    pub conda_cmd: String,
    pub force_rebuild: bool,
    pub ignore_conda: bool,
    /// Run the final pyOptSparse install; `false` only prepares the checkout
    pub install_pyoptsparse: bool,
    pub uninstall_built: bool,
    pub uninstall_conda_pkgs: bool,
    /// Stream tool output
    pub verbose: bool,
    /// Print the final report as JSON
    pub json: bool,
    /// Parallel make jobs
    pub jobs: usize,
    refs: BTreeMap<Package, String>,
}

impl Options {
    /// Resolve and validate options
    ///
    /// Every missing path is reported at once in [`OptionError::Invalid`].
    /// Path checks are skipped in uninstall modes, which never read them.
    pub fn resolve(
        raw: RawOptions,
        env: &Environment,
        config: &GlobalConfig,
        home: Option<&Path>,
    ) -> Result<Self, OptionError> {
        let (prefix, prefix_source) = resolve_prefix(raw.prefix.as_deref(), env, config, home)?;
        tracing::info!("Install prefix {} (from {prefix_source})", prefix.display());

        let linear_solver = raw
            .linear_solver
            .or(config.install.linear_solver)
            .unwrap_or_default();

        let compiler_suite = if linear_solver == LinearSolver::Pardiso {
            if !raw.intel {
                tracing::info!("PARDISO requires the Intel compiler suite; selecting it");
            }
            CompilerSuite::Intel
        } else if raw.intel {
            CompilerSuite::Intel
        } else {
            CompilerSuite::Gnu
        };

        let uninstalling = raw.uninstall_built || raw.uninstall_conda_pkgs;
        let mut problems = Vec::new();

        let raw_hsl_given = raw.hsl_tar_file.is_some();
        let hsl_tar_file = match raw.hsl_tar_file {
            Some(path) if !uninstalling => existing_path(&path, PathKind::File, &mut problems),
            other => other,
        };
        let snopt_dir = match raw.snopt_dir {
            Some(path) if !uninstalling => existing_path(&path, PathKind::Dir, &mut problems),
            other => other,
        };

        // A bad tarball path has already been reported above
        if !uninstalling && linear_solver == LinearSolver::Hsl && !raw_hsl_given {
            problems.push(format!(
                "The HSL linear solver requires --hsl-tar-file (sources: {HSL_DOWNLOAD})"
            ));
        }

        let jobs = match raw.jobs {
            Some(0) => {
                problems.push("--jobs must be at least 1".to_string());
                0
            }
            Some(jobs) => jobs,
            None => config.build_jobs(),
        };

        if !problems.is_empty() {
            return Err(OptionError::Invalid { problems });
        }

        let mut refs = config.refs.clone();
        if let Some(branch) = raw.branch {
            refs.insert(Package::Pyoptsparse, branch);
        }

        Ok(Self {
            prefix,
            prefix_source,
            linear_solver,
            compiler_suite,
            include_paropt: raw.paropt,
            snopt_dir,
            hsl_tar_file,
            keep_build_dir: raw.no_delete || config.build.keep_build_dir.unwrap_or(false),
            check_sanity: !raw.no_sanity_check,
            conda_cmd: raw
                .conda_cmd
                .unwrap_or_else(|| config.conda_cmd().to_string()),
            force_rebuild: raw.force_rebuild,
            ignore_conda: raw.ignore_conda,
            install_pyoptsparse: !raw.no_install,
            uninstall_built: raw.uninstall_built,
            uninstall_conda_pkgs: raw.uninstall_conda_pkgs,
            verbose: raw.verbose,
            json: raw.json,
            jobs,
            refs,
        })
    }

    /// Git ref to check out for a package: override or pinned default
    pub fn git_ref(&self, package: Package) -> &str {
        self.refs
            .get(&package)
            .map_or(package.info().git_ref, String::as_str)
    }

    /// Whether an uninstall mode was requested instead of an install
    pub fn uninstall_requested(&self) -> bool {
        self.uninstall_built || self.uninstall_conda_pkgs
    }
}

fn resolve_prefix(
    cli: Option<&Path>,
    env: &Environment,
    config: &GlobalConfig,
    home: Option<&Path>,
) -> Result<(PathBuf, PrefixSource), OptionError> {
    if let Some(path) = cli {
        return Ok((absolutize(path), PrefixSource::Cli));
    }
    if let Some(path) = &env.conda_prefix {
        return Ok((absolutize(path), PrefixSource::CondaPrefix));
    }
    if let Some(path) = &env.virtual_env {
        return Ok((absolutize(path), PrefixSource::VirtualEnv));
    }
    if let Some(path) = &config.install.prefix {
        return Ok((absolutize(path), PrefixSource::Config));
    }
    let home = home.ok_or(OptionError::NoHomeDirectory)?;
    Ok((home.join(DEFAULT_PREFIX_DIR), PrefixSource::Default))
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[derive(Clone, Copy)]
enum PathKind {
    File,
    Dir,
}

/// Canonical form of an existing path, or a recorded problem
fn existing_path(path: &Path, kind: PathKind, problems: &mut Vec<String>) -> Option<PathBuf> {
    let (ok, label) = match kind {
        PathKind::File => (path.is_file(), "HSL tar file"),
        PathKind::Dir => (path.is_dir(), "SNOPT directory"),
    };
    if !ok {
        problems.push(format!("{label} '{}' does not exist", path.display()));
        return None;
    }
    match path.canonicalize() {
        Ok(resolved) => Some(resolved),
        Err(e) => {
            problems.push(format!("{label} '{}' is not accessible: {e}", path.display()));
            None
        }
    }
}
