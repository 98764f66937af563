//! Uninstall logic
//!
//! Reverses previous installs. Source builds are undone by removing the
//! include directories and library files each package put under the prefix;
//! pip and conda installs are removed with those tools. Every removal is a
//! no-op when the target is already gone.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::environment::Environment;
use crate::core::layout::{PrefixLayout, COIN_INCLUDE_DIRS};
use crate::core::options::Options;
use crate::core::package::Package;
use crate::core::progress::Progress;
use crate::error::UninstallError;
use crate::infra::filesystem;
use crate::infra::process::{CommandRunner, ToolCommand};

/// Python modules installed with pip, with their distribution names
const PIP_PACKAGES: &[(&str, &str)] = &[("pyoptsparse", "pyOptSparse"), ("paropt", "paropt")];

/// Result of an uninstall run
#[derive(Debug, Default, Serialize)]
pub struct UninstallResult {
    /// Files and directories removed from the prefix
    pub removed: Vec<PathBuf>,
    /// Distributions removed with pip
    pub pip_removed: Vec<String>,
    /// Packages removed with conda
    pub conda_removed: Vec<Package>,
}

/// Remove everything a previous from-source install put in place
pub fn uninstall_built(
    options: &Options,
    runner: &mut dyn CommandRunner,
    progress: &dyn Progress,
) -> Result<UninstallResult, UninstallError> {
    progress.announce("Uninstalling packages built from source");

    let pip_removed = uninstall_python_packages(runner, progress)?;
    let layout = PrefixLayout::new(&options.prefix);
    let mut removed = Vec::new();
    for package in Package::UNINSTALL_ORDER {
        remove_package_files(&layout, package, progress, &mut removed)?;
    }
    // IPOPT goes first, while the METIS and MUMPS subdirectories still exist
    for coin in COIN_INCLUDE_DIRS {
        let coin_dir = layout.include_dir().join(coin);
        if filesystem::remove_dir_if_empty(&coin_dir) {
            removed.push(coin_dir);
        }
    }

    tracing::info!("Removed {} paths under {}", removed.len(), options.prefix.display());
    Ok(UninstallResult {
        removed,
        pip_removed,
        conda_removed: Vec::new(),
    })
}

/// `pip uninstall` pyOptSparse and ParOpt when they are importable
pub fn uninstall_python_packages(
    runner: &mut dyn CommandRunner,
    progress: &dyn Progress,
) -> Result<Vec<String>, UninstallError> {
    let mut removed = Vec::new();
    for &(module, dist) in PIP_PACKAGES {
        let import = ToolCommand::new("python")
            .arg("-c")
            .arg(format!("import {module}"));
        if runner.run(&import).is_err() {
            tracing::debug!("{module} is not importable; nothing to remove");
            continue;
        }

        progress.note(&format!("Removing {dist}"));
        runner.run(&ToolCommand::new("python").args(["-m", "pip", "uninstall", "-y", dist]))?;
        progress.ok();
        removed.push(dist.to_string());
    }
    Ok(removed)
}

/// Remove one package's headers and libraries from the prefix
fn remove_package_files(
    layout: &PrefixLayout,
    package: Package,
    progress: &dyn Progress,
    removed: &mut Vec<PathBuf>,
) -> Result<(), UninstallError> {
    let info = package.info();

    if let Some(marker) = info.header {
        for coin in COIN_INCLUDE_DIRS {
            let coin_dir = layout.include_dir().join(coin);
            // rmdir rejects paths ending in `.`
            let inc_dir = if marker.subdir == "." {
                coin_dir
            } else {
                coin_dir.join(marker.subdir)
            };

            if marker.globs.is_empty() {
                if inc_dir.is_dir() {
                    progress.note(&format!("Removing {package} include directory"));
                    filesystem::remove_dir_all(&inc_dir)?;
                    progress.ok();
                    removed.push(inc_dir);
                }
                continue;
            }

            // Shared include directory: remove only this package's headers
            for pattern in marker.globs {
                for header in filesystem::find_matching(&inc_dir, pattern)? {
                    if filesystem::remove_file(&header)? {
                        removed.push(header);
                    }
                }
            }
            if filesystem::remove_dir_if_empty(&inc_dir) {
                removed.push(inc_dir);
            }
        }
    }

    if let Some(pattern) = info.lib_glob {
        let libs = filesystem::find_matching(&layout.lib_dir(), pattern)?;
        if !libs.is_empty() {
            progress.note(&format!("Removing {package} library files"));
            for lib in libs {
                if filesystem::remove_file(&lib)? {
                    removed.push(lib);
                }
            }
            progress.ok();
        }
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
struct CondaPackage {
    name: String,
}

/// Package names from `conda list --json` output
pub fn parse_conda_list(json: &str) -> Result<Vec<String>, UninstallError> {
    let packages: Vec<CondaPackage> =
        serde_json::from_str(json).map_err(|e| UninstallError::CondaList(e.to_string()))?;
    Ok(packages.into_iter().map(|p| p.name).collect())
}

/// `conda uninstall` every package this tool may have installed with conda
pub fn uninstall_conda_packages(
    options: &Options,
    env: &Environment,
    runner: &mut dyn CommandRunner,
    progress: &dyn Progress,
) -> Result<UninstallResult, UninstallError> {
    if !env.conda_active() {
        return Err(UninstallError::CondaInactive);
    }
    progress.announce("Uninstalling packages installed with conda");

    let listing = runner.output(&ToolCommand::new(&options.conda_cmd).args(["list", "--json"]))?;
    let installed = parse_conda_list(&listing)?;

    let mut conda_removed = Vec::new();
    for package in Package::CONDA_PACKAGES {
        if !installed.iter().any(|name| name == package.name()) {
            continue;
        }
        progress.note(&format!("Removing {package} with conda"));
        runner.run(&ToolCommand::new(&options.conda_cmd).args(["uninstall", "-y", package.name()]))?;
        progress.ok();
        conda_removed.push(package);
    }

    Ok(UninstallResult {
        conda_removed,
        ..UninstallResult::default()
    })
}
