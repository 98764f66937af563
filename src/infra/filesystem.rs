//! Filesystem operations
//!
//! Handles file and directory operations, including the shell-style
//! wildcard matching used for installed library and header names.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::FilesystemError;

/// Create a directory and all parent directories
pub fn create_dir_all(path: &Path) -> Result<(), FilesystemError> {
    std::fs::create_dir_all(path).map_err(|e| FilesystemError::CreateDir {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Remove a directory and all its contents
///
/// Returns `false` when there was nothing to remove.
pub fn remove_dir_all(path: &Path) -> Result<bool, FilesystemError> {
    if !path.is_dir() {
        return Ok(false);
    }
    std::fs::remove_dir_all(path).map_err(|e| FilesystemError::RemoveDir {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;
    Ok(true)
}

/// Remove a directory only if it is empty; any failure is ignored
pub fn remove_dir_if_empty(path: &Path) -> bool {
    std::fs::remove_dir(path).is_ok()
}

/// Remove a single file
///
/// Returns `false` when the file did not exist.
pub fn remove_file(path: &Path) -> Result<bool, FilesystemError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(FilesystemError::RemoveFile {
            path: path.to_path_buf(),
            error: e.to_string(),
        }),
    }
}

/// Write content to a file
pub fn write_file(path: &Path, content: &str) -> Result<(), FilesystemError> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    std::fs::write(path, content).map_err(|e| FilesystemError::WriteFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Rename a file or directory
pub fn rename(from: &Path, to: &Path) -> Result<(), FilesystemError> {
    std::fs::rename(from, to).map_err(|e| FilesystemError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        error: e.to_string(),
    })
}

/// Copy a file into a directory, keeping its name
pub fn copy_into(file: &Path, dest_dir: &Path) -> Result<PathBuf, FilesystemError> {
    let name = file.file_name().unwrap_or_default();
    let dest = dest_dir.join(name);
    std::fs::copy(file, &dest).map_err(|e| FilesystemError::Move {
        from: file.to_path_buf(),
        to: dest.clone(),
        error: e.to_string(),
    })?;
    Ok(dest)
}

/// Translate a wildcard pattern (`*` and `?`) into an anchored regex
pub fn wildcard_regex(pattern: &str) -> Regex {
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push('^');
    let mut literal = String::new();
    for ch in pattern.chars() {
        match ch {
            '*' | '?' => {
                expr.push_str(&regex::escape(&literal));
                literal.clear();
                expr.push_str(if ch == '*' { ".*" } else { "." });
            }
            _ => literal.push(ch),
        }
    }
    expr.push_str(&regex::escape(&literal));
    expr.push('$');

    Regex::new(&expr).expect("Escaped wildcard pattern is a valid regex")
}

/// List entries of `dir` whose names match `pattern`, sorted
///
/// A missing directory yields an empty list.
pub fn find_matching(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, FilesystemError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let regex = wildcard_regex(pattern);
    let entries = std::fs::read_dir(dir).map_err(|e| FilesystemError::ReadDir {
        path: dir.to_path_buf(),
        error: e.to_string(),
    })?;

    let mut found: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|entry| regex.is_match(&entry.file_name().to_string_lossy()))
        .map(|entry| entry.path())
        .collect();
    found.sort();
    Ok(found)
}

/// Find the first file named `name` below `root`, in sorted walk order
pub fn find_file_recursive(root: &Path, name: &str) -> Option<PathBuf> {
    walkdir::WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .find(|entry| entry.file_type().is_file() && entry.file_name() == name)
        .map(|entry| entry.path().to_path_buf())
}
