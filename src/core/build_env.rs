//! Build environment setup
//!
//! Provides the environment handed to every configure, make and pip child
//! process: compilers (`CC`, `CXX`, `FC`), parallelism (`MAKEFLAGS`) and any
//! package-specific variables such as `CFLAGS` or `IPOPT_INC`.

use std::collections::BTreeMap;

use crate::infra::toolchain::Compilers;

/// Build environment for a package.
///
/// Values are attached to each spawned command; the orchestrator's own
/// environment is never modified.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildEnvironment {
    /// C compiler command
    pub cc: String,
    /// C++ compiler command
    pub cxx: String,
    /// Fortran compiler command
    pub fc: String,
    /// Number of parallel make jobs
    pub jobs: usize,
    /// Additional environment variables
    pub extra_env: BTreeMap<String, String>,
}

impl BuildEnvironment {
    /// Create environment for the selected compilers
    pub fn new(compilers: &Compilers, jobs: usize) -> Self {
        Self {
            cc: compilers.cc.clone(),
            cxx: compilers.cxx.clone(),
            fc: compilers.fc.clone(),
            jobs,
            extra_env: BTreeMap::new(),
        }
    }

    /// Set the number of parallel jobs
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Add an extra environment variable
    #[must_use]
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.extra_env.insert(key.to_string(), value.to_string());
        self
    }

    /// Convert to environment variable map for process execution
    pub fn to_env_map(&self) -> BTreeMap<String, String> {
        let mut env = BTreeMap::new();

        env.insert("CC".to_string(), self.cc.clone());
        env.insert("CXX".to_string(), self.cxx.clone());
        env.insert("FC".to_string(), self.fc.clone());
        env.insert("MAKEFLAGS".to_string(), format!("-j {}", self.jobs));

        for (key, value) in &self.extra_env {
            env.insert(key.clone(), value.clone());
        }

        env
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::toolchain::CompilerSuite;
    use proptest::prelude::*;

    #[test]
    fn test_gnu_environment() {
        let env = BuildEnvironment::new(&Compilers::for_suite(CompilerSuite::Gnu), 4);
        let map = env.to_env_map();

        assert_eq!(map.get("CC").unwrap(), "gcc");
        assert_eq!(map.get("CXX").unwrap(), "g++");
        assert_eq!(map.get("FC").unwrap(), "gfortran");
        assert_eq!(map.get("MAKEFLAGS").unwrap(), "-j 4");
    }

    #[test]
    fn test_intel_environment() {
        let env = BuildEnvironment::new(&Compilers::for_suite(CompilerSuite::Intel), 1);
        let map = env.to_env_map();

        assert_eq!(map.get("CC").unwrap(), "icc");
        assert_eq!(map.get("FC").unwrap(), "ifort");
    }

    #[test]
    fn test_extra_env_overrides_and_extends() {
        let env = BuildEnvironment::new(&Compilers::for_suite(CompilerSuite::Gnu), 8)
            .with_jobs(1)
            .with_env("CFLAGS", "-w")
            .with_env("IPOPT_LIB", "/opt/ipopt/lib");

        let map = env.to_env_map();

        assert_eq!(map.get("MAKEFLAGS").unwrap(), "-j 1");
        assert_eq!(map.get("CFLAGS").unwrap(), "-w");
        assert_eq!(map.get("IPOPT_LIB").unwrap(), "/opt/ipopt/lib");
    }

    fn suite_strategy() -> impl Strategy<Value = CompilerSuite> {
        prop_oneof![Just(CompilerSuite::Gnu), Just(CompilerSuite::Intel)]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Every build environment names all three compilers and the job count
        #[test]
        fn prop_environment_contains_required_variables(
            suite in suite_strategy(),
            jobs in 1usize..=64,
        ) {
            let env = BuildEnvironment::new(&Compilers::for_suite(suite), jobs);
            let map = env.to_env_map();

            prop_assert_eq!(map.get("CC").unwrap(), suite.cc());
            prop_assert_eq!(map.get("CXX").unwrap(), suite.cxx());
            prop_assert_eq!(map.get("FC").unwrap(), suite.fc());
            prop_assert_eq!(map.get("MAKEFLAGS").unwrap(), &format!("-j {jobs}"));
        }

        /// Extra environment variables are preserved
        #[test]
        fn prop_extra_env_preserved(
            key in "[A-Z_]{1,10}",
            value in "[a-zA-Z0-9_]{1,20}",
        ) {
            prop_assume!(!["CC", "CXX", "FC", "MAKEFLAGS"].contains(&key.as_str()));
            let env = BuildEnvironment::new(&Compilers::for_suite(CompilerSuite::Gnu), 2)
                .with_env(&key, &value);

            let map = env.to_env_map();
            prop_assert_eq!(map.get(&key).unwrap(), &value);
        }
    }
}
