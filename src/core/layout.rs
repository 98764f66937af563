//! Install prefix layout
//!
//! Resolves where COIN-OR headers and libraries live under the prefix.
//! Upstream has used both `include/coin-or` and `include/coin`, and
//! libraries are named either `libcoin<name>` or `lib<name>`.

use std::path::PathBuf;

use crate::core::package::Package;
use crate::infra::filesystem;

/// Include directory names, in preference order
pub const COIN_INCLUDE_DIRS: &[&str] = &["coin-or", "coin"];

/// Library name prefixes, in preference order
const LIB_VARIANTS: &[&str] = &["coin", ""];

/// View of an install prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixLayout {
    prefix: PathBuf,
}

impl PrefixLayout {
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// `<prefix>/include`
    pub fn include_dir(&self) -> PathBuf {
        self.prefix.join("include")
    }

    /// `<prefix>/lib`
    pub fn lib_dir(&self) -> PathBuf {
        self.prefix.join("lib")
    }

    /// First existing COIN-OR include directory
    pub fn coin_include_dir(&self) -> Option<PathBuf> {
        COIN_INCLUDE_DIRS
            .iter()
            .map(|name| self.include_dir().join(name))
            .find(|path| path.is_dir())
    }

    /// Library name to pass to `-l`, e.g. `coinmetis` or `metis`
    pub fn coin_lib_name(&self, name: &str) -> Option<String> {
        let lib_dir = self.lib_dir();
        LIB_VARIANTS.iter().find_map(|variant| {
            let pattern = format!("lib{variant}{name}*");
            let found = filesystem::find_matching(&lib_dir, &pattern).ok()?;
            (!found.is_empty()).then(|| format!("{variant}{name}"))
        })
    }

    /// Path of the header that marks `package` as installed
    pub fn header_path(&self, package: Package) -> Option<PathBuf> {
        let marker = package.info().header?;
        let coin = self.coin_include_dir()?;
        Some(coin.join(marker.subdir).join(marker.file))
    }

    /// Whether the package's marker header exists under the prefix
    pub fn is_installed(&self, package: Package) -> bool {
        self.header_path(package).is_some_and(|path| path.is_file())
    }
}
