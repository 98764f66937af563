//! Upstream repository URLs

/// COIN-OR third-party METIS build wrapper
pub const METIS_REPO: &str = "https://github.com/coin-or-tools/ThirdParty-Metis.git";

/// COIN-OR third-party MUMPS build wrapper
pub const MUMPS_REPO: &str = "https://github.com/coin-or-tools/ThirdParty-Mumps.git";

/// IPOPT interior point optimizer
pub const IPOPT_REPO: &str = "https://github.com/coin-or/Ipopt.git";

/// COIN-OR third-party HSL build wrapper
pub const HSL_REPO: &str = "https://github.com/coin-or-tools/ThirdParty-HSL";

/// pyOptSparse
pub const PYOPTSPARSE_REPO: &str = "https://github.com/mdolab/pyoptsparse.git";

/// ParOpt
pub const PAROPT_REPO: &str = "https://github.com/smdogroup/paropt.git";

/// Where HSL sources can be obtained
pub const HSL_DOWNLOAD: &str = "http://www.hsl.rl.ac.uk/ipopt/";
