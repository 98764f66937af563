//! Package installation
//!
//! Executes an [`InstallPlan`] one step at a time. A conda step is a single
//! `conda install`; a source step clones the pinned ref into a scratch
//! directory, enters it, runs the package's recipe and leaves again.
//!
//! Per package the states are: not checked, then either present (skip) or
//! absent, then downloading, configuring, building, installing, done. Any
//! failure stops the run; nothing is retried or rolled back.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::defaults::MUMPS_BUILD_JOBS;
use crate::core::build_env::BuildEnvironment;
use crate::core::flags::{self, SolverLinkage};
use crate::core::layout::PrefixLayout;
use crate::core::options::{LinearSolver, Options};
use crate::core::package::Package;
use crate::core::plan::{InstallPlan, Method, Step};
use crate::core::progress::Progress;
use crate::error::InstallError;
use crate::infra::dirs::{DirGuard, ScratchDir};
use crate::infra::filesystem;
use crate::infra::git::SourceFetcher;
use crate::infra::process::{CommandRunner, ToolCommand};
use crate::infra::toolchain::{CompilerSuite, Compilers};

/// METIS' bundled sources trip newer C compilers
const METIS_CFLAGS: &str = "-Wno-implicit-function-declaration";

/// pyOptSparse's C extensions predate C99 defaults
const PYOPTSPARSE_CFLAGS: &str = "-Wno-implicit-function-declaration -std=c99";

/// Python packages pyOptSparse and ParOpt need before building
const PYTHON_DEPS: &[&str] = &["numpy", "sqlitedict"];

/// Directory name the HSL build wrapper expects its sources in
const HSL_SOURCE_DIR: &str = "coinhsl";

/// File that marks the SNOPT source directory
const SNOPT_MARKER: &str = "snoptc.f";

/// SNOPT file pyOptSparse must not compile
const SNOPT_EXCLUDED: &str = "snopth.f";

/// What happened to a package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    /// Marker header found; nothing was built
    AlreadyInstalled,
    /// Installed with conda
    Conda,
    /// Built and installed from source
    Built,
    /// Checked out and prepared but not installed (`--no-install`)
    Prepared,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::AlreadyInstalled => "already installed",
            Self::Conda => "installed with conda",
            Self::Built => "built from source",
            Self::Prepared => "prepared, not installed",
        };
        f.write_str(label)
    }
}

/// Result of one plan step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageReport {
    pub package: Package,
    pub outcome: Outcome,
    /// Ref checked out, for source builds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
    /// Commit checked out, for source builds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    /// Scratch directory left on disk with `--no-delete`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_dir: Option<PathBuf>,
}

impl PackageReport {
    fn new(package: Package, outcome: Outcome) -> Self {
        Self {
            package,
            outcome,
            git_ref: None,
            commit: None,
            build_dir: None,
        }
    }
}

/// Result of a whole install run
#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub prefix: PathBuf,
    pub linear_solver: LinearSolver,
    pub compiler_suite: CompilerSuite,
    pub packages: Vec<PackageReport>,
}

/// Runs plan steps against a prefix
pub struct Installer<'a> {
    options: &'a Options,
    layout: PrefixLayout,
    compilers: Compilers,
    runner: &'a mut dyn CommandRunner,
    fetcher: &'a dyn SourceFetcher,
    progress: &'a dyn Progress,
    python_deps_installed: bool,
}

impl<'a> Installer<'a> {
    pub fn new(
        options: &'a Options,
        compilers: Compilers,
        runner: &'a mut dyn CommandRunner,
        fetcher: &'a dyn SourceFetcher,
        progress: &'a dyn Progress,
    ) -> Self {
        Self {
            options,
            layout: PrefixLayout::new(&options.prefix),
            compilers,
            runner,
            fetcher,
            progress,
            python_deps_installed: false,
        }
    }

    /// Run every step of the plan in order, stopping at the first failure
    pub fn execute(&mut self, plan: &InstallPlan) -> Result<InstallReport, InstallError> {
        let mut packages = Vec::with_capacity(plan.steps().len());
        for step in plan.steps() {
            let report = self.install(*step)?;
            tracing::info!("{}: {}", report.package, report.outcome);
            packages.push(report);
        }

        Ok(InstallReport {
            prefix: self.options.prefix.clone(),
            linear_solver: self.options.linear_solver,
            compiler_suite: self.compilers.suite,
            packages,
        })
    }

    /// Run a single step
    pub fn install(&mut self, step: Step) -> Result<PackageReport, InstallError> {
        match step.method {
            Method::PackageManager => self.install_with_conda(step.package),
            Method::FromSource => self.build_from_source(step.package),
        }
    }

    fn install_with_conda(&mut self, package: Package) -> Result<PackageReport, InstallError> {
        let cmd = ToolCommand::new(&self.options.conda_cmd).args(["install", "-y", package.name()]);
        self.step(package, &format!("Installing {package} with conda"), &cmd)?;
        Ok(PackageReport::new(package, Outcome::Conda))
    }

    fn build_from_source(&mut self, package: Package) -> Result<PackageReport, InstallError> {
        let options = self.options;

        if self.layout.is_installed(package) && !options.force_rebuild {
            self.progress.info(&format!(
                "{package} is already installed under {}, skipping build.",
                options.prefix.display()
            ));
            return Ok(PackageReport::new(package, Outcome::AlreadyInstalled));
        }

        if matches!(package, Package::Paropt | Package::Pyoptsparse) {
            self.ensure_python_deps()?;
        }

        self.progress
            .announce(&format!("Building {package} from source code"));
        let scratch = ScratchDir::create(options.keep_build_dir)?;
        if let Some(path) = scratch.kept_path() {
            self.progress
                .info(&format!("Remember to delete {} afterwards.", path.display()));
        }

        let info = package.info();
        let git_ref = options.git_ref(package).to_string();
        let checkout = scratch.path().join(package.name());

        self.progress.note(&format!("Cloning {}", info.url));
        let clone = self
            .fetcher
            .fetch(info.url, &git_ref, &checkout)
            .map_err(|source| InstallError::Fetch { package, source })?;
        self.progress.ok();
        tracing::info!("Checked out {package} {git_ref} at {}", clone.commit_sha);

        let outcome = {
            let _guard = DirGuard::enter(&checkout)?;
            match package {
                Package::Metis => self.build_metis()?,
                Package::Mumps => self.build_mumps()?,
                Package::Hsl => self.build_hsl(&checkout)?,
                Package::Ipopt => self.build_ipopt()?,
                Package::Paropt => self.build_paropt(&checkout)?,
                Package::Pyoptsparse => self.build_pyoptsparse(&checkout)?,
            }
        };

        Ok(PackageReport {
            package,
            outcome,
            git_ref: Some(git_ref),
            commit: Some(clone.commit_sha),
            build_dir: scratch.kept_path().map(Path::to_path_buf),
        })
    }

    fn build_metis(&mut self) -> Result<Outcome, InstallError> {
        let package = Package::Metis;
        let env = self.base_env();
        let fetch = ToolCommand::new("./get.Metis").envs(&env.to_env_map());
        self.step(package, "Downloading METIS sources", &fetch)?;

        let env = env.with_env("CFLAGS", METIS_CFLAGS);
        self.configure(package, flags::metis_configure_args(&self.options.prefix), &env)?;
        self.make_install(package, &env, &[], true)?;
        Ok(Outcome::Built)
    }

    fn build_mumps(&mut self) -> Result<Outcome, InstallError> {
        let package = Package::Mumps;
        let env = self.base_env();
        let fetch = ToolCommand::new("./get.Mumps").envs(&env.to_env_map());
        self.step(package, "Downloading MUMPS sources", &fetch)?;

        let coin_dir = self.coin_dir(package)?;
        let metis_lib = self.lib_name(package, Package::Metis)?;
        let args = flags::mumps_configure_args(
            &self.options.prefix,
            &coin_dir,
            &metis_lib,
            self.compilers.gcc_major,
        );
        self.configure(package, args, &env)?;

        let serial = env.with_jobs(MUMPS_BUILD_JOBS);
        self.make_install(package, &serial, &[], true)?;
        Ok(Outcome::Built)
    }

    fn build_hsl(&mut self, checkout: &Path) -> Result<Outcome, InstallError> {
        let package = Package::Hsl;
        let tarball = self
            .options
            .hsl_tar_file
            .clone()
            .ok_or(InstallError::HslArchiveRequired)?;
        let tarball_arg = tarball.display().to_string();

        self.progress.note("Extracting HSL sources");
        let listing = self
            .runner
            .output(&ToolCommand::new("tar").args(["tf", tarball_arg.as_str()]))
            .map_err(|source| InstallError::Command { package, source })?;
        let top = top_level_dir(&listing).ok_or_else(|| InstallError::BadArchive {
            path: tarball.clone(),
        })?;
        self.run(package, &ToolCommand::new("tar").args(["xf", tarball_arg.as_str()]))?;
        filesystem::rename(&checkout.join(&top), &checkout.join(HSL_SOURCE_DIR))?;
        self.progress.ok();

        let coin_dir = self
            .layout
            .coin_include_dir()
            .map(|dir| dir.display().to_string());
        let metis_lib = self.lib_name(package, Package::Metis)?;
        let env = self.base_env();
        let args =
            flags::hsl_configure_args(&self.options.prefix, coin_dir.as_deref(), &metis_lib);
        self.configure(package, args, &env)?;
        self.make_install(package, &env, &[], true)?;
        Ok(Outcome::Built)
    }

    fn build_ipopt(&mut self) -> Result<Outcome, InstallError> {
        let package = Package::Ipopt;
        let linkage = match self.options.linear_solver {
            LinearSolver::Mumps => SolverLinkage::Mumps {
                coin_dir: self.coin_dir(package)?,
                mumps_lib: self.lib_name(package, Package::Mumps)?,
            },
            LinearSolver::Hsl => SolverLinkage::Hsl {
                coin_dir: self.coin_dir(package)?,
                metis_lib: self.lib_name(package, Package::Metis)?,
            },
            LinearSolver::Pardiso => SolverLinkage::Pardiso,
        };

        let env = self.base_env();
        let args = flags::ipopt_configure_args(&self.options.prefix, &linkage);
        self.configure(package, args, &env)?;
        self.make_install(package, &env, &[], true)?;
        Ok(Outcome::Built)
    }

    fn build_paropt(&mut self, checkout: &Path) -> Result<Outcome, InstallError> {
        let package = Package::Paropt;
        let env = self.pyoptsparse_env(package)?;

        // Upstream ships its default build settings under this name
        filesystem::rename(
            &checkout.join("Makefile.in.info"),
            &checkout.join("Makefile.in"),
        )?;
        let make_args = [format!("PAROPT_DIR={}", checkout.display())];
        self.make_install(package, &env, &make_args, false)?;
        self.pip_install(package, &["./"], Some(&env))?;
        Ok(Outcome::Built)
    }

    fn build_pyoptsparse(&mut self, checkout: &Path) -> Result<Outcome, InstallError> {
        let package = Package::Pyoptsparse;
        let options = self.options;
        let env = self.pyoptsparse_env(package)?;

        if let Some(snopt_dir) = &options.snopt_dir {
            self.copy_snopt_files(snopt_dir, checkout)?;
        }

        if options.install_pyoptsparse {
            self.pip_install(package, &["--no-cache-dir", "./"], Some(&env))?;
            return Ok(Outcome::Built);
        }

        let vars = env.to_env_map();
        let export = |key: &str| format!("export {key}={}", vars.get(key).map_or("", String::as_str));
        self.progress.warn(&format!(
            "Not building pyOptSparse by request. Make sure to set these environment \
             variables before building it yourself:\n\n{}\n{}",
            export("IPOPT_INC"),
            export("IPOPT_LIB"),
        ));
        Ok(Outcome::Prepared)
    }

    /// Copy every file next to `snoptc.f` except `snopth.f` into the checkout
    fn copy_snopt_files(&mut self, snopt_dir: &Path, checkout: &Path) -> Result<(), InstallError> {
        self.progress.note("Copying SNOPT source files");
        let marker = filesystem::find_file_recursive(snopt_dir, SNOPT_MARKER).ok_or_else(|| {
            InstallError::SnoptSourcesNotFound {
                path: snopt_dir.to_path_buf(),
            }
        })?;
        let source_dir = marker.parent().unwrap_or(snopt_dir);
        let dest = checkout.join("pyoptsparse").join("pySNOPT").join("source");
        filesystem::create_dir_all(&dest)?;

        let mut copied = 0;
        for file in filesystem::find_matching(source_dir, "*")? {
            if !file.is_file() || file.file_name() == Some(OsStr::new(SNOPT_EXCLUDED)) {
                continue;
            }
            filesystem::copy_into(&file, &dest)?;
            copied += 1;
        }
        tracing::info!("Copied {copied} SNOPT files from {}", source_dir.display());
        self.progress.ok();
        Ok(())
    }

    fn ensure_python_deps(&mut self) -> Result<(), InstallError> {
        if !self.python_deps_installed {
            self.pip_install(Package::Pyoptsparse, PYTHON_DEPS, None)?;
            self.python_deps_installed = true;
        }
        Ok(())
    }

    fn base_env(&self) -> BuildEnvironment {
        BuildEnvironment::new(&self.compilers, self.options.jobs)
    }

    /// Environment for pyOptSparse and ParOpt builds
    fn pyoptsparse_env(&self, package: Package) -> Result<BuildEnvironment, InstallError> {
        let coin_dir = self.coin_dir(package)?;
        let lib_dir = self.layout.lib_dir().display().to_string();
        Ok(self
            .base_env()
            .with_env("IPOPT_INC", &coin_dir)
            .with_env("IPOPT_LIB", &lib_dir)
            .with_env("CFLAGS", PYOPTSPARSE_CFLAGS))
    }

    fn coin_dir(&self, package: Package) -> Result<String, InstallError> {
        self.layout
            .coin_include_dir()
            .map(|dir| dir.display().to_string())
            .ok_or_else(|| InstallError::IncludeDirNotFound {
                package,
                prefix: self.options.prefix.clone(),
            })
    }

    fn lib_name(&self, package: Package, library: Package) -> Result<String, InstallError> {
        self.layout
            .coin_lib_name(library.name())
            .ok_or_else(|| InstallError::LibraryNotFound {
                package,
                library: library.name().to_string(),
                lib_dir: self.layout.lib_dir(),
            })
    }

    fn configure(
        &mut self,
        package: Package,
        args: Vec<String>,
        env: &BuildEnvironment,
    ) -> Result<(), InstallError> {
        let cmd = ToolCommand::new("./configure")
            .args(args)
            .envs(&env.to_env_map());
        self.step(package, "Running configure", &cmd)
    }

    /// `make` then, optionally, `make install`
    fn make_install(
        &mut self,
        package: Package,
        env: &BuildEnvironment,
        make_args: &[String],
        install: bool,
    ) -> Result<(), InstallError> {
        let vars = env.to_env_map();
        let build = ToolCommand::new("make").args(make_args).envs(&vars);
        self.step(package, "Building", &build)?;

        if install {
            let install = ToolCommand::new("make").arg("install").envs(&vars);
            self.step(package, "Installing", &install)?;
        }
        Ok(())
    }

    fn pip_install(
        &mut self,
        package: Package,
        args: &[&str],
        env: Option<&BuildEnvironment>,
    ) -> Result<(), InstallError> {
        let mut cmd = ToolCommand::new("python").args(["-m", "pip", "install"]);
        if !self.options.verbose {
            cmd = cmd.arg("-q");
        }
        cmd = cmd.args(args.iter().copied());
        if let Some(env) = env {
            cmd = cmd.envs(&env.to_env_map());
        }
        self.step(package, "Installing packages with pip", &cmd)
    }

    fn step(
        &mut self,
        package: Package,
        message: &str,
        cmd: &ToolCommand,
    ) -> Result<(), InstallError> {
        self.progress.note(message);
        self.run(package, cmd)?;
        self.progress.ok();
        Ok(())
    }

    fn run(&mut self, package: Package, cmd: &ToolCommand) -> Result<(), InstallError> {
        self.runner
            .run(cmd)
            .map_err(|source| InstallError::Command { package, source })
    }
}

/// Top-level directory of a `tar tf` listing
fn top_level_dir(listing: &str) -> Option<String> {
    let first = listing.lines().map(str::trim).find(|line| !line.is_empty())?;
    let first = first.strip_prefix("./").unwrap_or(first);
    first
        .split('/')
        .next()
        .filter(|name| !name.is_empty())
        .map(String::from)
}
