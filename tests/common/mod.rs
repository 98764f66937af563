//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Stand-in `python` that records its arguments and fails every call,
/// so no host interpreter or site-packages is ever touched
const PYTHON_STUB: &str = "#!/bin/sh\necho \"$@\" >> \"$(dirname \"$0\")/python.log\"\nexit 1\n";

/// Isolated install prefix and config directory
///
/// The binary runs with `OPTFORGE_CONFIG_DIR` pointed at an empty directory,
/// without any conda or virtualenv variables, and with a failing `python`
/// stub first on `PATH`.
pub struct TestPrefix {
    /// Temporary install prefix
    pub dir: TempDir,
    /// Temporary config directory
    pub config: TempDir,
    /// Directory holding the `python` stub
    pub bin: TempDir,
}

impl TestPrefix {
    /// Create an empty prefix
    pub fn new() -> Self {
        let bin = TempDir::new().expect("Failed to create bin directory");
        let python = bin.path().join("python");
        std::fs::write(&python, PYTHON_STUB).expect("Failed to write python stub");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&python, std::fs::Permissions::from_mode(0o755))
                .expect("Failed to make python stub executable");
        }

        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
            config: TempDir::new().expect("Failed to create config directory"),
            bin,
        }
    }

    /// Argument lines of every `python` call the binary made
    pub fn python_calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.bin.path().join("python.log"))
            .map(|log| log.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Get the path to the prefix
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create an empty file under the prefix
    pub fn touch(&self, name: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, "").expect("Failed to write file");
    }

    /// Check if a file or directory exists under the prefix
    pub fn exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Write the global config file
    pub fn write_config(&self, content: &str) {
        std::fs::write(self.config.path().join("config.toml"), content)
            .expect("Failed to write config");
    }

    /// Command for the optforge binary in this test environment
    pub fn command(&self) -> Command {
        let host_path = std::env::var_os("PATH").unwrap_or_default();
        let path = std::env::join_paths(
            std::iter::once(self.bin.path().to_path_buf()).chain(std::env::split_paths(&host_path)),
        )
        .expect("Failed to build PATH");

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_optforge"));
        cmd.env("OPTFORGE_CONFIG_DIR", self.config.path())
            .env("PATH", path)
            .env_remove("CONDA_PREFIX")
            .env_remove("VIRTUAL_ENV")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Run optforge with `args`
    pub fn run(&self, args: &[&str]) -> Output {
        self.command()
            .args(args)
            .output()
            .expect("Failed to execute optforge")
    }

    /// Run optforge with `--prefix <this prefix>` followed by `args`
    pub fn run_with_prefix(&self, args: &[&str]) -> Output {
        self.command()
            .arg("--prefix")
            .arg(self.dir.path())
            .args(args)
            .output()
            .expect("Failed to execute optforge")
    }
}

impl Default for TestPrefix {
    fn default() -> Self {
        Self::new()
    }
}

/// Files a MUMPS-based source install leaves under the prefix
pub const MUMPS_INSTALL_FILES: &[&str] = &[
    "include/coin-or/metis/metis.h",
    "include/coin-or/mumps/mumps_c_types.h",
    "include/coin-or/IpoptConfig.h",
    "include/coin-or/IpIpoptApplication.hpp",
    "include/coin-or/SensApplication.hpp",
    "lib/libcoinmetis.so",
    "lib/libcoinmumps.so.3",
    "lib/libipopt.so.3",
    "lib/libsipopt.so.3",
];

/// Stdout as a string
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Stderr as a string
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Whether `path` is an existing directory with no entries
pub fn is_empty_dir(path: &Path) -> bool {
    std::fs::read_dir(path).is_ok_and(|mut entries| entries.next().is_none())
}
