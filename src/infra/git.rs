//! Git operations
//!
//! Clones package sources at a pinned ref using the gix crate.

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use gix::remote::fetch::Shallow;
use thiserror::Error;

/// Git operation errors
#[derive(Error, Debug)]
pub enum GitError {
    /// Failed to clone repository
    #[error("Failed to clone '{url}': {error}")]
    CloneFailed { url: String, error: String },

    /// Ref name is not a valid git reference
    #[error("Invalid ref '{reference}' for '{url}': {error}")]
    InvalidRef {
        url: String,
        reference: String,
        error: String,
    },

    /// Failed to resolve the checked-out commit
    #[error("Failed to resolve HEAD of '{path}': {error}")]
    ResolveFailed { path: PathBuf, error: String },
}

/// Result of a git clone operation
#[derive(Debug, Clone)]
pub struct CloneResult {
    /// Commit SHA of the checked-out ref
    pub commit_sha: String,
}

/// Obtains package sources into a local directory
pub trait SourceFetcher {
    /// Clone `url` at `reference` into `dest`, which must not exist or be empty
    fn fetch(&self, url: &str, reference: &str, dest: &Path) -> Result<CloneResult, GitError>;
}

/// Shallow clones over the network with gix
#[derive(Debug, Default, Clone, Copy)]
pub struct GitFetcher;

impl GitFetcher {
    /// Create a new fetcher
    pub fn new() -> Self {
        Self
    }
}

impl SourceFetcher for GitFetcher {
    fn fetch(&self, url: &str, reference: &str, dest: &Path) -> Result<CloneResult, GitError> {
        let clone_failed = |e: &dyn std::fmt::Display| GitError::CloneFailed {
            url: url.to_string(),
            error: e.to_string(),
        };

        let mut prepare = gix::prepare_clone(url, dest)
            .map_err(|e| clone_failed(&e))?
            .with_shallow(Shallow::DepthAtRemote(NonZeroU32::MIN))
            .with_ref_name(Some(reference))
            .map_err(|e| GitError::InvalidRef {
                url: url.to_string(),
                reference: reference.to_string(),
                error: e.to_string(),
            })?;

        let (mut checkout, _outcome) = prepare
            .fetch_then_checkout(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
            .map_err(|e| clone_failed(&e))?;

        let (repo, _outcome) = checkout
            .main_worktree(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
            .map_err(|e| clone_failed(&e))?;

        let commit_sha = repo
            .head_id()
            .map_err(|e| GitError::ResolveFailed {
                path: dest.to_path_buf(),
                error: e.to_string(),
            })?
            .to_string();

        tracing::debug!("Checked out {url} at {reference} ({commit_sha})");

        Ok(CloneResult { commit_sha })
    }
}
