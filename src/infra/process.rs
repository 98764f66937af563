//! External process execution
//!
//! Every tool the orchestrator drives (configure scripts, make, pip, conda,
//! tar, compilers) goes through a [`CommandRunner`]. Environment variables
//! are attached to each [`ToolCommand`] instead of being set on the
//! orchestrator's own process.

use std::collections::BTreeMap;
use std::fmt;
use std::process::{Command, Output, Stdio};

use thiserror::Error;

use crate::config::defaults::STDERR_TAIL_LINES;

/// Process execution errors
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The program could not be started
    #[error("Failed to start '{program}': {error}")]
    Spawn { program: String, error: String },

    /// The program ran and exited unsuccessfully
    #[error("Command '{command}' failed ({status}){detail}")]
    Failed {
        command: String,
        status: String,
        detail: String,
    },
}

/// A single external command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    /// Program name or path
    pub program: String,
    /// Arguments, one token each
    pub args: Vec<String>,
    /// Extra environment variables for the child process
    pub env: BTreeMap<String, String>,
}

impl ToolCommand {
    /// Create a command for the given program
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    /// Append one argument
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set several environment variables for the child
    #[must_use]
    pub fn envs(mut self, vars: &BTreeMap<String, String>) -> Self {
        for (key, value) in vars {
            self.env.insert(key.clone(), value.clone());
        }
        self
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).envs(&self.env);
        cmd
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Executes tool commands in the current working directory
pub trait CommandRunner {
    /// Run a command to completion, failing on a non-zero exit
    fn run(&mut self, cmd: &ToolCommand) -> Result<(), ProcessError>;

    /// Run a command and return its standard output
    fn output(&mut self, cmd: &ToolCommand) -> Result<String, ProcessError>;
}

/// Runs commands as real child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner {
    /// Stream child output to the terminal instead of capturing it
    verbose: bool,
}

impl SystemRunner {
    /// Create a runner; verbose runners inherit stdio
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&mut self, cmd: &ToolCommand) -> Result<(), ProcessError> {
        tracing::debug!("Running: {cmd}");

        if self.verbose {
            let status = cmd
                .to_command()
                .stdin(Stdio::null())
                .status()
                .map_err(|e| spawn_error(cmd, &e))?;
            if !status.success() {
                return Err(ProcessError::Failed {
                    command: cmd.to_string(),
                    status: status.to_string(),
                    detail: String::new(),
                });
            }
            return Ok(());
        }

        let output = capture(cmd)?;
        check_output(cmd, &output)
    }

    fn output(&mut self, cmd: &ToolCommand) -> Result<String, ProcessError> {
        tracing::debug!("Capturing: {cmd}");
        let output = capture(cmd)?;
        check_output(cmd, &output)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn capture(cmd: &ToolCommand) -> Result<Output, ProcessError> {
    cmd.to_command()
        .stdin(Stdio::null())
        .output()
        .map_err(|e| spawn_error(cmd, &e))
}

fn spawn_error(cmd: &ToolCommand, error: &std::io::Error) -> ProcessError {
    ProcessError::Spawn {
        program: cmd.program.clone(),
        error: error.to_string(),
    }
}

fn check_output(cmd: &ToolCommand, output: &Output) -> Result<(), ProcessError> {
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    // Build tools often report the real error on stdout
    let source = if stderr.trim().is_empty() { stdout } else { stderr };

    Err(ProcessError::Failed {
        command: cmd.to_string(),
        status: output.status.to_string(),
        detail: tail(&source, STDERR_TAIL_LINES),
    })
}

/// Last `lines` lines of `text`, prefixed with a newline, or empty
fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if all.is_empty() {
        return String::new();
    }
    let start = all.len().saturating_sub(lines);
    format!("\n{}", all[start..].join("\n"))
}
