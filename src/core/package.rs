//! Package definitions
//!
//! The fixed set of dependencies optforge knows how to install, each
//! carrying its static descriptor.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::urls;

/// Header used to detect an existing installation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderMarker {
    /// Subdirectory of the COIN-OR include directory (`.` for the directory itself)
    pub subdir: &'static str,
    /// Header whose presence means "installed"
    pub file: &'static str,
    /// Header globs removed individually on uninstall, for packages that
    /// share their include directory with others
    pub globs: &'static [&'static str],
}

/// Static descriptor for a package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageInfo {
    /// Git repository URL
    pub url: &'static str,
    /// Pinned branch or tag
    pub git_ref: &'static str,
    /// Installed library file glob under `<prefix>/lib`
    pub lib_glob: Option<&'static str>,
    /// Installed marker header under the COIN-OR include directory
    pub header: Option<HeaderMarker>,
}

/// A dependency optforge can install
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Package {
    /// METIS graph partitioner
    Metis,
    /// MUMPS sparse direct solver
    Mumps,
    /// IPOPT interior point optimizer
    Ipopt,
    /// HSL linear solvers (user-supplied sources)
    Hsl,
    /// pyOptSparse Python optimization framework
    Pyoptsparse,
    /// ParOpt parallel optimizer
    Paropt,
}

impl Package {
    /// Every package, in declaration order
    pub const ALL: [Package; 6] = [
        Package::Metis,
        Package::Mumps,
        Package::Ipopt,
        Package::Hsl,
        Package::Pyoptsparse,
        Package::Paropt,
    ];

    /// Packages whose built files can be removed from the prefix, in removal order
    pub const UNINSTALL_ORDER: [Package; 4] =
        [Package::Ipopt, Package::Hsl, Package::Mumps, Package::Metis];

    /// Packages removable through conda, in removal order
    pub const CONDA_PACKAGES: [Package; 4] = [
        Package::Pyoptsparse,
        Package::Ipopt,
        Package::Mumps,
        Package::Metis,
    ];

    /// Lowercase name, as used by conda, pip and the config file
    pub fn name(self) -> &'static str {
        match self {
            Self::Metis => "metis",
            Self::Mumps => "mumps",
            Self::Ipopt => "ipopt",
            Self::Hsl => "hsl",
            Self::Pyoptsparse => "pyoptsparse",
            Self::Paropt => "paropt",
        }
    }

    /// Static descriptor
    pub fn info(self) -> PackageInfo {
        match self {
            Self::Metis => PackageInfo {
                url: urls::METIS_REPO,
                git_ref: "releases/2.0.0",
                lib_glob: Some("libcoinmetis*"),
                header: Some(HeaderMarker {
                    subdir: "metis",
                    file: "metis.h",
                    globs: &[],
                }),
            },
            Self::Mumps => PackageInfo {
                url: urls::MUMPS_REPO,
                git_ref: "releases/3.0.2",
                lib_glob: Some("libcoinmumps*"),
                header: Some(HeaderMarker {
                    subdir: "mumps",
                    file: "mumps_c_types.h",
                    globs: &[],
                }),
            },
            Self::Ipopt => PackageInfo {
                url: urls::IPOPT_REPO,
                git_ref: "releases/3.14.7",
                lib_glob: Some("lib*ipopt*"),
                header: Some(HeaderMarker {
                    subdir: ".",
                    file: "IpoptConfig.h",
                    globs: &["Ip*.hpp", "Sens*.hpp", "Ip*.h"],
                }),
            },
            Self::Hsl => PackageInfo {
                url: urls::HSL_REPO,
                git_ref: "releases/2.2.1",
                lib_glob: Some("libcoinhsl*"),
                header: Some(HeaderMarker {
                    subdir: "hsl",
                    file: "CoinHslConfig.h",
                    globs: &[],
                }),
            },
            Self::Pyoptsparse => PackageInfo {
                url: urls::PYOPTSPARSE_REPO,
                git_ref: crate::config::defaults::DEFAULT_PYOPTSPARSE_REF,
                lib_glob: None,
                header: None,
            },
            Self::Paropt => PackageInfo {
                url: urls::PAROPT_REPO,
                git_ref: "v2.0.2",
                lib_glob: None,
                header: None,
            },
        }
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Metis => "METIS",
            Self::Mumps => "MUMPS",
            Self::Ipopt => "IPOPT",
            Self::Hsl => "HSL",
            Self::Pyoptsparse => "pyOptSparse",
            Self::Paropt => "ParOpt",
        };
        f.write_str(label)
    }
}
