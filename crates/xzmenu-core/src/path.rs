//! Turning typed or pasted path strings into paths

use crate::{Error, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Clean raw user input into a path.
///
/// Every `"` is removed, since drag-and-drop and "copy as path" wrap paths in
/// quotes, and surrounding whitespace is trimmed. Existence is not checked;
/// the operation that uses the path reports that.
pub fn resolve_path(raw: &str) -> Result<PathBuf> {
    let cleaned: String = raw.chars().filter(|&c| c != '"').collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        return Err(Error::invalid_path(raw, "no path given"));
    }

    Ok(PathBuf::from(cleaned))
}

/// Name under which `path` is stored inside an archive.
///
/// Paths like `.` or `dir/..` have no final component of their own, so those
/// are canonicalized first.
pub fn base_name(path: &Path) -> Result<OsString> {
    if let Some(name) = path.file_name() {
        return Ok(name.to_os_string());
    }

    let canonical = fs::canonicalize(path)
        .map_err(|e| Error::invalid_path(path, format!("cannot resolve: {e}")))?;
    canonical
        .file_name()
        .map(|name| name.to_os_string())
        .ok_or_else(|| Error::invalid_path(path, "has no base name"))
}
