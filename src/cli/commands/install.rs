//! CLI implementation of the install run
//!
//! Detects compilers, plans the steps, runs the sanity check and then the
//! installer, and reports the outcome per package.

use anyhow::{Context, Result};

use crate::cli::output::{print_detail, print_info, print_json, print_success, Console};
use crate::core::environment::Environment;
use crate::core::installer::{InstallReport, Installer};
use crate::core::options::Options;
use crate::core::plan::{InstallPlan, Method};
use crate::core::progress::Progress;
use crate::core::sanity::run_sanity_check;
use crate::infra::git::GitFetcher;
use crate::infra::process::CommandRunner;
use crate::infra::toolchain::Compilers;

/// Execute an install run
pub fn execute(
    options: &Options,
    env: &Environment,
    runner: &mut dyn CommandRunner,
    console: &Console,
) -> Result<()> {
    let compilers = Compilers::detect(options.compiler_suite, runner);
    let plan = InstallPlan::new(options, env.conda_allowed(options.ignore_conda));

    if !options.json {
        print_plan(options, &plan);
    }

    if options.check_sanity {
        run_sanity_check(options, &plan, &compilers, runner, console)
            .context("Build environment sanity check failed")?;
    }

    let fetcher = GitFetcher::new();
    let report = Installer::new(options, compilers, runner, &fetcher, console)
        .execute(&plan)
        .context("Installation failed")?;

    if options.json {
        print_json(&report)?;
    } else {
        console.announce("Summary");
        print_summary(&report);
    }
    Ok(())
}

fn print_plan(options: &Options, plan: &InstallPlan) {
    print_info(&format!(
        "Installing into {} (from {}) with {} and the {} compilers",
        options.prefix.display(),
        options.prefix_source,
        options.linear_solver,
        options.compiler_suite,
    ));
    for step in plan.steps() {
        let how = match step.method {
            Method::PackageManager => format!("{} install", options.conda_cmd),
            Method::FromSource => format!("source, {}", options.git_ref(step.package)),
        };
        print_detail(&format!("{} ({how})", step.package));
    }
}

fn print_summary(report: &InstallReport) {
    for package in &report.packages {
        print_success(&format!("{}: {}", package.package, package.outcome));
        if let Some(dir) = &package.build_dir {
            print_detail(&format!("build directory kept at {}", dir.display()));
        }
    }
}
