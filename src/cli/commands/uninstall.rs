//! CLI implementation of `--uninstall-built` and `--uninstall-conda-pkgs`

use anyhow::{Context, Result};

use crate::cli::output::{print_detail, print_json, print_success, Console};
use crate::core::environment::Environment;
use crate::core::options::Options;
use crate::core::uninstall::{uninstall_built, uninstall_conda_packages, UninstallResult};
use crate::infra::process::CommandRunner;

/// Execute the requested uninstall modes, built packages first
pub fn execute(
    options: &Options,
    env: &Environment,
    runner: &mut dyn CommandRunner,
    console: &Console,
) -> Result<()> {
    let mut result = UninstallResult::default();

    if options.uninstall_built {
        result = uninstall_built(options, runner, console)
            .context("Failed to uninstall packages built from source")?;
    }

    if options.uninstall_conda_pkgs {
        let conda = uninstall_conda_packages(options, env, runner, console)
            .context("Failed to uninstall conda packages")?;
        result.conda_removed = conda.conda_removed;
    }

    if options.json {
        return print_json(&result);
    }

    if result.removed.is_empty() && result.pip_removed.is_empty() && result.conda_removed.is_empty()
    {
        print_success("Nothing to uninstall");
        return Ok(());
    }

    print_success("Uninstalled:");
    for dist in &result.pip_removed {
        print_detail(&format!("{dist} (pip)"));
    }
    for package in &result.conda_removed {
        print_detail(&format!("{package} ({})", options.conda_cmd));
    }
    for path in &result.removed {
        print_detail(&path.display().to_string());
    }
    Ok(())
}
