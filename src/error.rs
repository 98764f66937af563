//! Error types for optforge
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

use crate::core::package::Package;
use crate::infra::git::GitError;
use crate::infra::process::ProcessError;

/// Option resolution errors
#[derive(Error, Debug)]
pub enum OptionError {
    /// One or more referenced paths are missing; reported together
    #[error("Invalid options:\n{}", problems.join("\n"))]
    Invalid { problems: Vec<String> },

    /// Home directory could not be determined for the default prefix
    #[error("Cannot determine the home directory; pass --prefix")]
    NoHomeDirectory,
}

/// Pre-flight check errors
#[derive(Error, Debug)]
pub enum SanityError {
    /// Required commands or inputs are missing
    #[error("Sanity check failed:\n{}", problems.join("\n"))]
    Missing { problems: Vec<String> },

    /// A trivial test program failed to build or run
    #[error("The {language} compiler '{compiler}' is not functional: {error}")]
    CompilerBroken {
        language: String,
        compiler: String,
        error: String,
    },

    /// Scratch directory for the test programs could not be prepared
    #[error("Failed to prepare compiler test directory: {0}")]
    Filesystem(#[from] FilesystemError),
}

/// Package installation errors
#[derive(Error, Debug)]
pub enum InstallError {
    /// External command failed
    #[error("{package}: {source}")]
    Command {
        package: Package,
        #[source]
        source: ProcessError,
    },

    /// Source checkout failed
    #[error("{package}: {source}")]
    Fetch {
        package: Package,
        #[source]
        source: GitError,
    },

    /// No COIN-OR include directory exists under the prefix
    #[error("{package}: no include/coin-or or include/coin directory under '{prefix}'")]
    IncludeDirNotFound { package: Package, prefix: PathBuf },

    /// A sibling library is missing from the prefix
    #[error("{package}: library '{library}' not found in '{lib_dir}'")]
    LibraryNotFound {
        package: Package,
        library: String,
        lib_dir: PathBuf,
    },

    /// The HSL step ran without a source tarball
    #[error("HSL: no source tarball given; pass --hsl-tar-file")]
    HslArchiveRequired,

    /// HSL tarball listing was empty or unreadable
    #[error("Cannot determine top-level directory of HSL archive '{path}'")]
    BadArchive { path: PathBuf },

    /// SNOPT sources could not be located
    #[error("No snoptc.f found under SNOPT directory '{path}'")]
    SnoptSourcesNotFound { path: PathBuf },

    /// Filesystem error during a build step
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
}

/// Uninstall errors
#[derive(Error, Debug)]
pub enum UninstallError {
    /// `--uninstall-conda-pkgs` outside a conda environment
    #[error("No conda environment is active; activate the environment to clean up first")]
    CondaInactive,

    /// `conda list --json` output could not be parsed
    #[error("Failed to parse conda package list: {0}")]
    CondaList(String),

    /// External command failed
    #[error(transparent)]
    Command(#[from] ProcessError),

    /// File or directory could not be removed
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to remove directory
    #[error("Failed to remove directory '{path}': {error}")]
    RemoveDir { path: PathBuf, error: String },

    /// Failed to remove file
    #[error("Failed to remove file '{path}': {error}")]
    RemoveFile { path: PathBuf, error: String },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to read directory
    #[error("Failed to read directory '{path}': {error}")]
    ReadDir { path: PathBuf, error: String },

    /// Failed to rename or copy
    #[error("Failed to move '{from}' to '{to}': {error}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },

    /// Failed to change working directory
    #[error("Failed to change directory to '{path}': {error}")]
    ChangeDir { path: PathBuf, error: String },
}
