//! Default configuration values

/// Directory under the home directory used as the install prefix
/// when no environment is active and no prefix is given
pub const DEFAULT_PREFIX_DIR: &str = "ipopt";

/// Default conda executable
pub const DEFAULT_CONDA_CMD: &str = "conda";

/// Default git ref for pyOptSparse
pub const DEFAULT_PYOPTSPARSE_REF: &str = "v2.8.3";

/// MUMPS fails intermittently with parallel make
pub const MUMPS_BUILD_JOBS: usize = 1;

/// First GNU Fortran major version that rejects MUMPS' argument mismatches
pub const GFORTRAN_ARG_MISMATCH_VERSION: u32 = 10;

/// Number of stderr lines kept when a quiet command fails
pub const STDERR_TAIL_LINES: usize = 20;

/// Default number of parallel build jobs: half of the logical cores
pub fn default_build_jobs() -> usize {
    (num_cpus::get() / 2).max(1)
}
