//! optforge - pyOptSparse and IPOPT build orchestrator
//!
//! This library installs pyOptSparse together with IPOPT and the linear
//! solver stack it needs (METIS, MUMPS or HSL, or PARDISO), optionally with
//! ParOpt and SNOPT, using conda where it can and building from source
//! otherwise.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Planning, install recipes and uninstall logic
//! - [`infra`] - Infrastructure layer (git, filesystem, processes)
//! - [`config`] - Configuration constants and upstream URLs
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
