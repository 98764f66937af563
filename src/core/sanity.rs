//! Pre-flight sanity checks
//!
//! Verifies that every command the plan needs is on `PATH` and that the
//! selected compilers can build and run a trivial program, before anything
//! is downloaded. Missing commands are collected and reported together.

use std::path::PathBuf;

use crate::core::options::Options;
use crate::core::package::Package;
use crate::core::plan::InstallPlan;
use crate::core::progress::Progress;
use crate::error::SanityError;
use crate::infra::dirs::{DirGuard, ScratchDir};
use crate::infra::filesystem;
use crate::infra::process::{CommandRunner, ToolCommand};
use crate::infra::toolchain::Compilers;

/// Result of a single command lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    /// Command being checked
    pub name: String,
    /// Resolved location, if found
    pub path: Option<PathBuf>,
}

impl CheckResult {
    /// Whether the command was found
    pub fn passed(&self) -> bool {
        self.path.is_some()
    }
}

/// Overall command lookup report
#[derive(Debug, Default)]
pub struct SanityReport {
    /// Individual check results
    pub checks: Vec<CheckResult>,
}

impl SanityReport {
    /// Check if all commands were found
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(CheckResult::passed)
    }

    /// Names of the commands that were not found
    pub fn missing(&self) -> Vec<&str> {
        self.checks
            .iter()
            .filter(|c| !c.passed())
            .map(|c| c.name.as_str())
            .collect()
    }
}

/// One hello-world compiler test
struct HelloProgram<'c> {
    language: &'static str,
    compiler: &'c str,
    source: &'static str,
    program: &'static str,
    code: &'static str,
}

/// Commands the plan will invoke, without duplicates, in check order
pub fn required_commands(options: &Options, plan: &InstallPlan, compilers: &Compilers) -> Vec<String> {
    let mut commands: Vec<String> = Vec::new();
    let mut require = |cmd: &str| {
        if !commands.iter().any(|c| c == cmd) {
            commands.push(cmd.to_string());
        }
    };

    if plan.compile_required() {
        require("make");
        require(&compilers.cc);
        require(&compilers.cxx);
        require(&compilers.fc);
    }
    if plan.builds_pyoptsparse() {
        require("python");
        if options.install_pyoptsparse {
            require("swig");
        }
    }
    if plan.uses_package_manager() {
        require(&options.conda_cmd);
    }
    if plan.method_for(Package::Hsl).is_some() {
        require("tar");
    }
    if options.include_paropt {
        require("mpicxx");
    }

    commands
}

/// Look up each command with `lookup`
pub fn check_commands<F>(commands: &[String], lookup: F) -> SanityReport
where
    F: Fn(&str) -> Option<PathBuf>,
{
    SanityReport {
        checks: commands
            .iter()
            .map(|name| CheckResult {
                name: name.clone(),
                path: lookup(name),
            })
            .collect(),
    }
}

/// Build and run hello-world programs with each selected compiler
pub fn check_compilers(
    compilers: &Compilers,
    runner: &mut dyn CommandRunner,
    progress: &dyn Progress,
) -> Result<(), SanityError> {
    let programs = [
        HelloProgram {
            language: "C",
            compiler: &compilers.cc,
            source: "hello.c",
            program: "hello_c",
            code: "#include <stdio.h>\nint main() {\nprintf(\"cc works!\\n\");\nreturn 0;\n}\n",
        },
        HelloProgram {
            language: "C++",
            compiler: &compilers.cxx,
            source: "hello.cc",
            program: "hello_cxx",
            code: "#include <iostream>\nint main() {\nstd::cout << \"c++ works!\" << std::endl;\nreturn 0;\n}\n",
        },
        HelloProgram {
            language: "Fortran",
            compiler: &compilers.fc,
            source: "hello.f90",
            program: "hello_f",
            code: "program hello\n  print *, 'fortran works!'\nend program hello\n",
        },
    ];

    let scratch = ScratchDir::create(false)?;
    let _guard = DirGuard::enter(scratch.path())?;

    for hello in &programs {
        progress.note(&format!("Testing {}", hello.compiler));
        filesystem::write_file(&scratch.path().join(hello.source), hello.code)?;

        let broken = |error: String| SanityError::CompilerBroken {
            language: hello.language.to_string(),
            compiler: hello.compiler.to_string(),
            error,
        };
        runner
            .run(&ToolCommand::new(hello.compiler).args(["-o", hello.program, hello.source]))
            .map_err(|e| broken(e.to_string()))?;
        runner
            .run(&ToolCommand::new(format!("./{}", hello.program)))
            .map_err(|e| broken(e.to_string()))?;
        progress.ok();
    }

    Ok(())
}

/// Run the full pre-flight check for a plan
///
/// Compiler tests only run when something will be compiled.
pub fn run_sanity_check(
    options: &Options,
    plan: &InstallPlan,
    compilers: &Compilers,
    runner: &mut dyn CommandRunner,
    progress: &dyn Progress,
) -> Result<SanityReport, SanityError> {
    progress.announce("Testing build environment functionality. Can be skipped with -k.");

    let commands = required_commands(options, plan, compilers);
    let report = check_commands(&commands, |cmd| which::which(cmd).ok());

    if options.verbose {
        for check in report.checks.iter().filter(|c| c.passed()) {
            if let Some(path) = &check.path {
                progress.info(&format!("FOUND: {} is {}", check.name, path.display()));
            }
        }
    }

    if !report.all_passed() {
        let problems = report
            .missing()
            .into_iter()
            .map(|cmd| format!("Required command '{cmd}' not found"))
            .collect();
        return Err(SanityError::Missing { problems });
    }

    if plan.compile_required() {
        check_compilers(compilers, runner, progress)?;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::environment::Environment;
    use crate::core::global_config::GlobalConfig;
    use crate::core::options::{LinearSolver, RawOptions};
    use crate::infra::toolchain::CompilerSuite;
    use crate::test_utils::{RecordingProgress, RecordingRunner};
    use serial_test::serial;
    use std::path::Path;

    fn options(raw: RawOptions) -> Options {
        Options::resolve(
            RawOptions {
                prefix: Some(PathBuf::from("/opt/ipopt")),
                ..raw
            },
            &Environment::default(),
            &GlobalConfig::default(),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_required_commands_for_source_build() {
        let opts = options(RawOptions::default());
        let plan = InstallPlan::new(&opts, false);
        let compilers = Compilers::for_suite(CompilerSuite::Gnu);

        assert_eq!(
            required_commands(&opts, &plan, &compilers),
            vec!["make", "gcc", "g++", "gfortran", "python", "swig"]
        );
    }

    #[test]
    fn test_required_commands_for_conda_only() {
        let opts = options(RawOptions {
            conda_cmd: Some("mamba".to_string()),
            ..RawOptions::default()
        });
        let plan = InstallPlan::new(&opts, true);
        let compilers = Compilers::for_suite(CompilerSuite::Gnu);

        assert_eq!(required_commands(&opts, &plan, &compilers), vec!["mamba"]);
    }

    #[test]
    fn test_required_commands_extras() {
        let temp = tempfile::TempDir::new().unwrap();
        let tarball = temp.path().join("coinhsl.tar.gz");
        std::fs::write(&tarball, "").unwrap();

        let opts = options(RawOptions {
            linear_solver: Some(LinearSolver::Hsl),
            hsl_tar_file: Some(tarball),
            paropt: true,
            no_install: true,
            intel: true,
            ..RawOptions::default()
        });
        let plan = InstallPlan::new(&opts, false);
        let compilers = Compilers::for_suite(opts.compiler_suite);
        let commands = required_commands(&opts, &plan, &compilers);

        assert!(commands.contains(&"icc".to_string()));
        assert!(commands.contains(&"tar".to_string()));
        assert!(commands.contains(&"mpicxx".to_string()));
        assert!(commands.contains(&"python".to_string()));
        assert!(!commands.contains(&"swig".to_string()));
    }

    #[test]
    fn test_check_commands_collects_all_missing() {
        let commands = vec!["make".to_string(), "swig".to_string(), "gcc".to_string()];
        let report = check_commands(&commands, |cmd| {
            (cmd == "make").then(|| PathBuf::from("/usr/bin/make"))
        });

        assert!(!report.all_passed());
        assert_eq!(report.missing(), vec!["swig", "gcc"]);
        assert_eq!(report.checks[0].path.as_deref(), Some(Path::new("/usr/bin/make")));
    }

    #[test]
    #[serial]
    fn test_check_compilers_builds_and_runs_each() {
        let mut runner = RecordingRunner::new();
        let progress = RecordingProgress::new();
        let original = std::env::current_dir().unwrap();

        check_compilers(
            &Compilers::for_suite(CompilerSuite::Gnu),
            &mut runner,
            &progress,
        )
        .unwrap();

        assert_eq!(
            runner.lines(),
            vec![
                "gcc -o hello_c hello.c",
                "./hello_c",
                "g++ -o hello_cxx hello.cc",
                "./hello_cxx",
                "gfortran -o hello_f hello.f90",
                "./hello_f",
            ]
        );
        assert_eq!(std::env::current_dir().unwrap(), original);
    }

    #[test]
    #[serial]
    fn test_broken_compiler_stops_check() {
        let mut runner = RecordingRunner::new().failing("g++");
        let progress = RecordingProgress::new();
        let original = std::env::current_dir().unwrap();

        let result = check_compilers(
            &Compilers::for_suite(CompilerSuite::Gnu),
            &mut runner,
            &progress,
        );

        match result {
            Err(SanityError::CompilerBroken { language, compiler, .. }) => {
                assert_eq!(language, "C++");
                assert_eq!(compiler, "g++");
            }
            other => panic!("Expected CompilerBroken, got {other:?}"),
        }
        assert!(!runner.ran("gfortran"));
        assert_eq!(std::env::current_dir().unwrap(), original);
    }
}
