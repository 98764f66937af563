//! Configure flag composition
//!
//! Builds the `./configure` argument lists for each package from the
//! prefix and the already-installed siblings' include directory and
//! library names.

use std::path::Path;

use crate::config::defaults::GFORTRAN_ARG_MISMATCH_VERSION;

/// How IPOPT links against its linear solver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverLinkage {
    /// MUMPS from the prefix
    Mumps {
        /// COIN-OR include directory
        coin_dir: String,
        /// Resolved MUMPS library name
        mumps_lib: String,
    },
    /// HSL from the prefix, which itself links METIS
    Hsl {
        /// COIN-OR include directory
        coin_dir: String,
        /// Resolved METIS library name
        metis_lib: String,
    },
    /// PARDISO from Intel MKL
    Pardiso,
}

fn prefix_arg(prefix: &Path) -> String {
    format!("--prefix={}", prefix.display())
}

fn lib_flags(prefix: &Path, libs: &[&str]) -> String {
    let mut flags = format!("-L{}/lib", prefix.display());
    for lib in libs {
        flags.push_str(" -l");
        flags.push_str(lib);
    }
    flags
}

/// METIS: only the prefix
pub fn metis_configure_args(prefix: &Path) -> Vec<String> {
    vec![prefix_arg(prefix)]
}

/// Compiler flags MUMPS needs to find the METIS headers
pub fn mumps_cflags(prefix: &Path, coin_dir: &str) -> String {
    format!(
        "-w -I{}/include -I{coin_dir} -I{coin_dir}/metis",
        prefix.display()
    )
}

/// Fortran flags for MUMPS; newer gfortran rejects its argument mismatches
pub fn mumps_fcflags(cflags: &str, gcc_major: Option<u32>) -> String {
    match gcc_major {
        Some(major) if major >= GFORTRAN_ARG_MISMATCH_VERSION => {
            format!("-fallow-argument-mismatch {cflags}")
        }
        _ => cflags.to_string(),
    }
}

/// MUMPS: link against METIS from the prefix
pub fn mumps_configure_args(
    prefix: &Path,
    coin_dir: &str,
    metis_lib: &str,
    gcc_major: Option<u32>,
) -> Vec<String> {
    let cflags = mumps_cflags(prefix, coin_dir);
    let fcflags = mumps_fcflags(&cflags, gcc_major);
    vec![
        "--with-metis".to_string(),
        format!("--with-metis-lflags={}", lib_flags(prefix, &[metis_lib])),
        format!("--with-metis-cflags={cflags}"),
        prefix_arg(prefix),
        format!("CFLAGS={cflags}"),
        format!("FCFLAGS={fcflags}"),
    ]
}

/// HSL: link against METIS from the prefix
pub fn hsl_configure_args(prefix: &Path, coin_dir: Option<&str>, metis_lib: &str) -> Vec<String> {
    let mut args = vec![
        prefix_arg(prefix),
        "--with-metis".to_string(),
        format!("--with-metis-lflags={}", lib_flags(prefix, &[metis_lib])),
    ];
    // Absent when METIS came from conda, which installs no COIN-OR headers
    if let Some(coin_dir) = coin_dir {
        args.push(format!("--with-mumps-cflags=-I{coin_dir}"));
    }
    args
}

/// IPOPT: prefix, no Java bindings, plus linear solver flags
pub fn ipopt_configure_args(prefix: &Path, linkage: &SolverLinkage) -> Vec<String> {
    let mut args = vec![prefix_arg(prefix), "--disable-java".to_string()];
    match linkage {
        SolverLinkage::Mumps {
            coin_dir,
            mumps_lib,
        } => args.extend([
            "--with-mumps".to_string(),
            format!("--with-mumps-lflags={}", lib_flags(prefix, &[mumps_lib])),
            format!("--with-mumps-cflags=-I{coin_dir}/mumps"),
            "--without-asl".to_string(),
            "--without-hsl".to_string(),
        ]),
        SolverLinkage::Hsl {
            coin_dir,
            metis_lib,
        } => args.extend([
            "--with-hsl".to_string(),
            format!(
                "--with-hsl-lflags={}",
                lib_flags(prefix, &["coinhsl", metis_lib])
            ),
            format!("--with-hsl-cflags=-I{coin_dir}/hsl"),
            "--disable-linear-solver-loader".to_string(),
        ]),
        SolverLinkage::Pardiso => args.push("--with-pardiso".to_string()),
    }
    args
}
