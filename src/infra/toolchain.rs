//! Compiler toolchain selection
//!
//! Maps the chosen compiler suite to the C, C++ and Fortran compiler
//! commands handed to every build, and reads the GNU compiler version.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::infra::process::{CommandRunner, ToolCommand};

/// Compiler suite used for all source builds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompilerSuite {
    /// gcc, g++, gfortran
    #[default]
    Gnu,
    /// icc, icpc, ifort (required by PARDISO)
    Intel,
}

impl CompilerSuite {
    /// C compiler command
    pub fn cc(self) -> &'static str {
        match self {
            Self::Gnu => "gcc",
            Self::Intel => "icc",
        }
    }

    /// C++ compiler command
    pub fn cxx(self) -> &'static str {
        match self {
            Self::Gnu => "g++",
            Self::Intel => "icpc",
        }
    }

    /// Fortran compiler command
    pub fn fc(self) -> &'static str {
        match self {
            Self::Gnu => "gfortran",
            Self::Intel => "ifort",
        }
    }
}

impl fmt::Display for CompilerSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gnu => write!(f, "GNU"),
            Self::Intel => write!(f, "Intel"),
        }
    }
}

/// Concrete compiler selection for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compilers {
    /// Suite the commands come from
    pub suite: CompilerSuite,
    /// C compiler
    pub cc: String,
    /// C++ compiler
    pub cxx: String,
    /// Fortran compiler
    pub fc: String,
    /// GNU major version; `None` for Intel or when gcc is unavailable
    pub gcc_major: Option<u32>,
}

impl Compilers {
    /// Compilers for a suite without probing versions
    pub fn for_suite(suite: CompilerSuite) -> Self {
        Self {
            suite,
            cc: suite.cc().to_string(),
            cxx: suite.cxx().to_string(),
            fc: suite.fc().to_string(),
            gcc_major: None,
        }
    }

    /// Select compilers and, for GNU, detect the gcc major version
    ///
    /// A missing gcc is not an error here; the sanity check reports it.
    pub fn detect(suite: CompilerSuite, runner: &mut dyn CommandRunner) -> Self {
        let mut compilers = Self::for_suite(suite);
        if suite == CompilerSuite::Gnu {
            match runner.output(&ToolCommand::new("gcc").arg("-dumpversion")) {
                Ok(version) => {
                    compilers.gcc_major = parse_major_version(&version);
                    tracing::debug!("gcc -dumpversion: {}", version.trim());
                }
                Err(e) => tracing::warn!("Could not determine gcc version: {e}"),
            }
        }
        compilers
    }
}

/// Parse the major component of a dotted version string
pub fn parse_major_version(version: &str) -> Option<u32> {
    version.trim().split('.').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::RecordingRunner;

    #[test]
    fn test_suite_commands() {
        assert_eq!(CompilerSuite::Gnu.cc(), "gcc");
        assert_eq!(CompilerSuite::Gnu.fc(), "gfortran");
        assert_eq!(CompilerSuite::Intel.cxx(), "icpc");
        assert_eq!(CompilerSuite::Intel.fc(), "ifort");
    }

    #[test]
    fn test_parse_major_version() {
        assert_eq!(parse_major_version("11\n"), Some(11));
        assert_eq!(parse_major_version("9.4.0"), Some(9));
        assert_eq!(parse_major_version("garbage"), None);
        assert_eq!(parse_major_version(""), None);
    }

    #[test]
    fn test_detect_gnu_reads_version() {
        let mut runner = RecordingRunner::new().with_output("gcc -dumpversion", "12.2.0\n");
        let compilers = Compilers::detect(CompilerSuite::Gnu, &mut runner);

        assert_eq!(compilers.gcc_major, Some(12));
        assert_eq!(compilers.cc, "gcc");
    }

    #[test]
    fn test_detect_intel_skips_gcc() {
        let mut runner = RecordingRunner::new();
        let compilers = Compilers::detect(CompilerSuite::Intel, &mut runner);

        assert_eq!(compilers.gcc_major, None);
        assert_eq!(compilers.cc, "icc");
        assert!(runner.commands().is_empty());
    }

    #[test]
    fn test_detect_gnu_tolerates_missing_gcc() {
        let mut runner = RecordingRunner::new().failing("gcc -dumpversion");
        let compilers = Compilers::detect(CompilerSuite::Gnu, &mut runner);

        assert_eq!(compilers.gcc_major, None);
    }
}
