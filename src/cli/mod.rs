//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no business logic - that belongs in the [`crate::core`] module.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::core::options::{LinearSolver, RawOptions};

/// optforge - Build pyOptSparse with IPOPT and its solver dependencies
///
/// Installs METIS, MUMPS or HSL, IPOPT, optionally ParOpt, and pyOptSparse
/// into a prefix, using conda where possible and building from source
/// otherwise.
#[derive(Parser, Debug)]
#[command(name = "optforge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Add ParOpt support
    #[arg(short = 'a', long)]
    pub paropt: bool,

    /// pyOptSparse git branch or tag [default: v2.8.3]
    #[arg(short, long, value_name = "REF")]
    pub branch: Option<String>,

    /// Conda executable to use [default: conda]
    #[arg(short, long, value_name = "CMD")]
    pub conda_cmd: Option<String>,

    /// Keep the temporary build directories
    #[arg(short = 'd', long)]
    pub no_delete: bool,

    /// Build from source even when a conda environment is active
    #[arg(short = 'e', long)]
    pub ignore_conda: bool,

    /// Rebuild packages that are already installed
    #[arg(short, long)]
    pub force_rebuild: bool,

    /// Skip the build environment sanity checks
    #[arg(short = 'k', long)]
    pub no_sanity_check: bool,

    /// Use the Intel compiler suite instead of GNU
    #[arg(short, long)]
    pub intel: bool,

    /// Linear solver for IPOPT [default: mumps]
    #[arg(short, long, value_enum, value_name = "SOLVER")]
    pub linear_solver: Option<LinearSolver>,

    /// Prepare pyOptSparse but do not install it
    #[arg(short = 'n', long)]
    pub no_install: bool,

    /// Install prefix [default: $CONDA_PREFIX, $VIRTUAL_ENV or ~/ipopt]
    #[arg(short, long, value_name = "DIR")]
    pub prefix: Option<PathBuf>,

    /// Include SNOPT from this source directory
    #[arg(short, long, value_name = "DIR")]
    pub snopt_dir: Option<PathBuf>,

    /// HSL source tarball (required with --linear-solver hsl)
    #[arg(short = 't', long, value_name = "FILE")]
    pub hsl_tar_file: Option<PathBuf>,

    /// Parallel make jobs [default: half the CPU cores]
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Remove packages previously built from source, then exit
    #[arg(long)]
    pub uninstall_built: bool,

    /// Remove packages installed with conda, then exit
    #[arg(long)]
    pub uninstall_conda_pkgs: bool,

    /// Show tool output (-v), plus debug logs (-vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print the final report as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Unvalidated options for the resolver
    pub fn raw_options(&self) -> RawOptions {
        RawOptions {
            prefix: self.prefix.clone(),
            linear_solver: self.linear_solver,
            intel: self.intel,
            branch: self.branch.clone(),
            conda_cmd: self.conda_cmd.clone(),
            no_delete: self.no_delete,
            ignore_conda: self.ignore_conda,
            force_rebuild: self.force_rebuild,
            no_sanity_check: self.no_sanity_check,
            no_install: self.no_install,
            paropt: self.paropt,
            snopt_dir: self.snopt_dir.clone(),
            hsl_tar_file: self.hsl_tar_file.clone(),
            jobs: self.jobs,
            uninstall_built: self.uninstall_built,
            uninstall_conda_pkgs: self.uninstall_conda_pkgs,
            verbose: self.verbose > 0,
            json: self.json,
        }
    }

    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        commands::run(self.raw_options())
    }
}
