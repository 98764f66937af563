//! Infrastructure layer
//!
//! Handles all I/O operations: git clones, the filesystem, working
//! directories and external processes.

pub mod dirs;
pub mod filesystem;
pub mod git;
pub mod process;
pub mod toolchain;
