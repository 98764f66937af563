//! Core business logic module
//!
//! Decides what to install and how. Side effects go through the seams in
//! [`crate::infra`] so every step can run against test doubles.
//!
//! # Submodules
//!
//! - [`package`] - The fixed set of installable packages
//! - [`options`] - Option resolution and validation
//! - [`plan`] - Ordered install steps per linear solver
//! - [`flags`] - Configure arguments and compiler flags
//! - [`build_env`] - Compiler and `make` environment for builds
//! - [`layout`] - Install prefix layout and installed-package detection
//! - [`installer`] - Per-package install recipes
//! - [`sanity`] - Pre-flight command and compiler checks
//! - [`uninstall`] - Removal of previous installs
//! - [`environment`] - Conda and virtualenv detection
//! - [`global_config`] - User defaults from the config file
//! - [`progress`] - Progress reporting seam

pub mod build_env;
pub mod environment;
pub mod flags;
pub mod global_config;
pub mod installer;
pub mod layout;
pub mod options;
pub mod package;
pub mod plan;
pub mod progress;
pub mod sanity;
pub mod uninstall;
