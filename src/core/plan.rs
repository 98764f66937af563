//! Install plan
//!
//! Fixes, before anything runs, which packages are installed and how. The
//! order is literal per linear solver; there is no dependency resolution.
//!
//! | solver  | steps                                                    |
//! |---------|----------------------------------------------------------|
//! | MUMPS   | METIS, MUMPS, IPOPT, [ParOpt], pyOptSparse               |
//! | HSL     | METIS, HSL, IPOPT, [ParOpt], pyOptSparse                 |
//! | PARDISO | IPOPT, [ParOpt], pyOptSparse                             |

use serde::Serialize;

use crate::core::options::{LinearSolver, Options};
use crate::core::package::Package;

/// How a package gets installed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    /// `conda install`
    PackageManager,
    /// Clone, configure, build and install
    FromSource,
}

/// One package and how to install it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Step {
    pub package: Package,
    pub method: Method,
}

impl Step {
    fn conda(package: Package) -> Self {
        Self {
            package,
            method: Method::PackageManager,
        }
    }

    fn source(package: Package) -> Self {
        Self {
            package,
            method: Method::FromSource,
        }
    }
}

/// Ordered install steps for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan {
    steps: Vec<Step>,
}

impl InstallPlan {
    /// Build the plan from resolved options
    ///
    /// `conda_allowed` is true when a conda environment is active and
    /// `--ignore-conda` was not given.
    pub fn new(options: &Options, conda_allowed: bool) -> Self {
        let pick = |package| {
            if conda_allowed {
                Step::conda(package)
            } else {
                Step::source(package)
            }
        };

        let mut steps = Vec::new();
        match options.linear_solver {
            LinearSolver::Mumps => {
                steps.push(pick(Package::Metis));
                steps.push(pick(Package::Mumps));
                steps.push(pick(Package::Ipopt));
            }
            LinearSolver::Hsl => {
                steps.push(pick(Package::Metis));
                steps.push(Step::source(Package::Hsl));
                steps.push(Step::source(Package::Ipopt));
            }
            LinearSolver::Pardiso => steps.push(Step::source(Package::Ipopt)),
        }

        // Conda's pyOptSparse has no SNOPT or ParOpt, and nothing built here
        // can be linked into it
        let pyoptsparse_from_conda = conda_allowed
            && options.linear_solver == LinearSolver::Mumps
            && options.snopt_dir.is_none()
            && !options.include_paropt;

        if pyoptsparse_from_conda {
            // Conda has nothing to "prepare" without installing
            if options.install_pyoptsparse {
                steps.push(Step::conda(Package::Pyoptsparse));
            }
        } else {
            if options.include_paropt {
                steps.push(Step::source(Package::Paropt));
            }
            steps.push(Step::source(Package::Pyoptsparse));
        }

        Self { steps }
    }

    /// Steps in execution order
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Whether any step compiles code
    pub fn compile_required(&self) -> bool {
        self.steps.iter().any(|s| s.method == Method::FromSource)
    }

    /// Whether any step uses conda
    pub fn uses_package_manager(&self) -> bool {
        self.steps.iter().any(|s| s.method == Method::PackageManager)
    }

    /// Whether pyOptSparse is cloned and built here
    pub fn builds_pyoptsparse(&self) -> bool {
        self.method_for(Package::Pyoptsparse) == Some(Method::FromSource)
    }

    /// Method planned for a package, if it is part of the plan
    pub fn method_for(&self, package: Package) -> Option<Method> {
        self.steps
            .iter()
            .find(|s| s.package == package)
            .map(|s| s.method)
    }
}
