//! Test doubles and property-test generators
//!
//! [`RecordingRunner`] stands in for real child processes and
//! [`FakeFetcher`] for network clones, so installer logic can be exercised
//! against a temporary prefix.

use std::cell::RefCell;
use std::path::Path;

use crate::core::progress::Progress;
use crate::infra::git::{CloneResult, GitError, SourceFetcher};
use crate::infra::process::{CommandRunner, ProcessError, ToolCommand};

/// Records every command instead of running it
#[derive(Debug, Default)]
pub struct RecordingRunner {
    commands: Vec<ToolCommand>,
    outputs: Vec<(String, String)>,
    failing: Vec<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canned stdout for commands whose rendered line starts with `prefix`
    #[must_use]
    pub fn with_output(mut self, prefix: &str, stdout: &str) -> Self {
        self.outputs.push((prefix.to_string(), stdout.to_string()));
        self
    }

    /// Commands whose rendered line starts with `prefix` fail
    #[must_use]
    pub fn failing(mut self, prefix: &str) -> Self {
        self.failing.push(prefix.to_string());
        self
    }

    pub fn commands(&self) -> &[ToolCommand] {
        &self.commands
    }

    /// Rendered command lines, in execution order
    pub fn lines(&self) -> Vec<String> {
        self.commands.iter().map(ToString::to_string).collect()
    }

    /// Whether any recorded command line starts with `prefix`
    pub fn ran(&self, prefix: &str) -> bool {
        self.lines().iter().any(|line| line.starts_with(prefix))
    }

    /// First recorded command whose line starts with `prefix`
    pub fn find(&self, prefix: &str) -> Option<&ToolCommand> {
        self.commands
            .iter()
            .find(|cmd| cmd.to_string().starts_with(prefix))
    }

    fn record(&mut self, cmd: &ToolCommand) -> Result<String, ProcessError> {
        self.commands.push(cmd.clone());
        let line = cmd.to_string();

        if self.failing.iter().any(|prefix| line.starts_with(prefix.as_str())) {
            return Err(ProcessError::Failed {
                command: line,
                status: "exit status: 1".to_string(),
                detail: String::new(),
            });
        }

        Ok(self
            .outputs
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, out)| out.clone())
            .unwrap_or_default())
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&mut self, cmd: &ToolCommand) -> Result<(), ProcessError> {
        self.record(cmd).map(|_| ())
    }

    fn output(&mut self, cmd: &ToolCommand) -> Result<String, ProcessError> {
        self.record(cmd)
    }
}

/// Creates a fake checkout instead of cloning
#[derive(Debug, Default)]
pub struct FakeFetcher {
    files: Vec<(String, String)>,
    fetched: RefCell<Vec<(String, String)>>,
    fail: bool,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path (relative to every checkout) created on fetch; a trailing `/`
    /// creates a directory
    #[must_use]
    pub fn with_path(mut self, relative: &str) -> Self {
        self.files.push((relative.to_string(), String::new()));
        self
    }

    /// Every fetch fails
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// `(url, reference)` pairs fetched so far
    pub fn fetched(&self) -> Vec<(String, String)> {
        self.fetched.borrow().clone()
    }
}

impl SourceFetcher for FakeFetcher {
    fn fetch(&self, url: &str, reference: &str, dest: &Path) -> Result<CloneResult, GitError> {
        self.fetched
            .borrow_mut()
            .push((url.to_string(), reference.to_string()));

        if self.fail {
            return Err(GitError::CloneFailed {
                url: url.to_string(),
                error: "simulated network failure".to_string(),
            });
        }

        std::fs::create_dir_all(dest).expect("Failed to create fake checkout");
        for (relative, content) in &self.files {
            let path = dest.join(relative);
            if relative.ends_with('/') {
                std::fs::create_dir_all(&path).expect("Failed to create fake dir");
            } else {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent).expect("Failed to create fake dir");
                }
                std::fs::write(&path, content).expect("Failed to write fake file");
            }
        }

        Ok(CloneResult {
            commit_sha: "0".repeat(40),
        })
    }
}

/// Collects progress messages instead of printing them
#[derive(Debug, Default)]
pub struct RecordingProgress {
    messages: RefCell<Vec<String>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages in order, prefixed with their kind
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    /// Whether any message contains `text`
    pub fn contains(&self, text: &str) -> bool {
        self.messages.borrow().iter().any(|m| m.contains(text))
    }

    fn push(&self, kind: &str, message: &str) {
        self.messages.borrow_mut().push(format!("{kind}: {message}"));
    }
}

impl Progress for RecordingProgress {
    fn announce(&self, message: &str) {
        self.push("announce", message);
    }

    fn note(&self, message: &str) {
        self.push("note", message);
    }

    fn ok(&self) {
        self.push("ok", "");
    }

    fn info(&self, message: &str) {
        self.push("info", message);
    }

    fn warn(&self, message: &str) {
        self.push("warn", message);
    }
}

pub mod generators {
    use proptest::prelude::*;

    use crate::core::package::Package;

    /// Any known package
    pub fn package() -> impl Strategy<Value = Package> {
        proptest::sample::select(Package::ALL.to_vec())
    }

    /// Absolute install prefix without spaces
    pub fn prefix_path() -> impl Strategy<Value = String> {
        "/[a-z][a-z0-9_-]{0,12}(/[a-z][a-z0-9_-]{0,12}){0,3}"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_runner_canned_output_and_failure() {
        let mut runner = RecordingRunner::new()
            .with_output("tar tf", "dir/\n")
            .failing("make install");

        assert_eq!(
            runner.output(&ToolCommand::new("tar").args(["tf", "x.tgz"])).unwrap(),
            "dir/\n"
        );
        assert!(runner.run(&ToolCommand::new("make")).is_ok());
        assert!(runner.run(&ToolCommand::new("make").arg("install")).is_err());
        assert_eq!(runner.lines(), vec!["tar tf x.tgz", "make", "make install"]);
    }
}
