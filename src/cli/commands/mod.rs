//! CLI command implementations
//!
//! optforge has a single entry point; the uninstall flags switch it from
//! installing to removing.

pub mod install;
pub mod uninstall;

use anyhow::{Context, Result};

use crate::cli::output::Console;
use crate::core::environment::Environment;
use crate::core::global_config::GlobalConfig;
use crate::core::options::{Options, RawOptions};
use crate::infra::dirs::ForgeDirs;
use crate::infra::process::SystemRunner;

/// Resolve options against the environment and config, then install or uninstall
pub fn run(raw: RawOptions) -> Result<()> {
    let dirs = ForgeDirs::new();
    let config = GlobalConfig::load(&dirs).context("Failed to load global configuration")?;
    let env = Environment::detect();
    let options = Options::resolve(raw, &env, &config, dirs.home_dir())?;

    let console = Console::new(options.verbose, options.json);
    // Streamed tool output would corrupt the JSON report
    let mut runner = SystemRunner::new(options.verbose && !options.json);

    if options.uninstall_requested() {
        uninstall::execute(&options, &env, &mut runner, &console)
    } else {
        install::execute(&options, &env, &mut runner, &console)
    }
}
