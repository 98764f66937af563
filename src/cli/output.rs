//! Output formatting and progress indicators
//!
//! This module provides the terminal side of [`Progress`]: section banners,
//! spinners for running steps, colored status lines and JSON printing.

use std::cell::RefCell;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;

use crate::core::progress::Progress;

/// Create a spinner for operations with unknown duration
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.blue} {msg}")
            .expect("Invalid spinner template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}

/// Print a success line
pub fn print_success(message: &str) {
    println!(
        "{} {message}",
        status::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green())
    );
}

/// Print an informational line
pub fn print_info(message: &str) {
    println!(
        "{} {message}",
        status::INFO.if_supports_color(Stream::Stdout, |s| s.blue())
    );
}

/// Print a warning to stderr
pub fn print_warning(message: &str) {
    eprintln!(
        "{} {}",
        status::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
        message.if_supports_color(Stream::Stderr, |s| s.yellow())
    );
}

/// Print an indented detail line
pub fn print_detail(message: &str) {
    println!("    {message}");
}

/// Pretty-print a value as JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print an error and its causes to stderr
pub fn display_error(err: &anyhow::Error) {
    eprintln!(
        "{} {}",
        status::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
        err.if_supports_color(Stream::Stderr, |s| s.bold())
    );
    for cause in err.chain().skip(1) {
        eprintln!("  Caused by: {cause}");
    }
}

/// Terminal progress reporter
///
/// A noted step shows a spinner until [`Progress::ok`]. If the run fails
/// mid-step, the spinner is left on screen showing which step it was.
/// Verbose mode prints plain lines instead, since tool output is streamed.
/// JSON mode keeps stdout clean for the report.
pub struct Console {
    verbose: bool,
    json: bool,
    spinner: RefCell<Option<ProgressBar>>,
    step: RefCell<Option<String>>,
}

impl Console {
    pub fn new(verbose: bool, json: bool) -> Self {
        Self {
            verbose,
            json,
            spinner: RefCell::new(None),
            step: RefCell::new(None),
        }
    }

    fn abandon_spinner(&self) {
        if let Some(pb) = self.spinner.borrow_mut().take() {
            pb.abandon();
        }
    }

    /// Print a line without tearing a running spinner
    fn println(&self, line: &str) {
        match self.spinner.borrow().as_ref() {
            Some(pb) => pb.suspend(|| println!("{line}")),
            None => println!("{line}"),
        }
    }
}

impl Progress for Console {
    fn announce(&self, message: &str) {
        tracing::info!("{message}");
        if self.json {
            return;
        }
        self.abandon_spinner();
        println!();
        println!(
            "{} {}",
            "==>".if_supports_color(Stream::Stdout, |s| s.cyan()),
            message.if_supports_color(Stream::Stdout, |s| s.bold())
        );
    }

    fn note(&self, message: &str) {
        tracing::debug!("{message}");
        self.abandon_spinner();
        self.step.replace(Some(message.to_string()));
        if self.json {
            return;
        }
        if self.verbose {
            println!("{message}...");
        } else {
            self.spinner.replace(Some(create_spinner(message)));
        }
    }

    fn ok(&self) {
        let step = self.step.take().unwrap_or_default();
        if let Some(pb) = self.spinner.borrow_mut().take() {
            pb.finish_and_clear();
        }
        if self.json {
            return;
        }
        println!(
            "{} {step} {}",
            status::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
            "OK".if_supports_color(Stream::Stdout, |s| s.green())
        );
    }

    fn info(&self, message: &str) {
        tracing::info!("{message}");
        if !self.json {
            self.println(&format!("    {message}"));
        }
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
        match self.spinner.borrow().as_ref() {
            Some(pb) => pb.suspend(|| print_warning(message)),
            None => print_warning(message),
        }
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        self.abandon_spinner();
    }
}
