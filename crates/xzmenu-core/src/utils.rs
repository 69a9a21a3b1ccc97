//! Utility functions for xzmenu-core

use std::fs;
use std::path::Path;

/// Calculate the total size of a path (file or directory) in bytes
///
/// # Arguments
/// * `path` - The path to calculate size for
///
/// # Returns
/// The total size in bytes, or 0 if the path cannot be accessed
pub fn calculate_path_size<P: AsRef<Path>>(path: P) -> u64 {
    let path = path.as_ref();

    let Ok(metadata) = fs::symlink_metadata(path) else {
        return 0;
    };

    if metadata.is_file() {
        metadata.len()
    } else if metadata.is_dir() {
        let mut size = 0;
        if let Ok(entries) = fs::read_dir(path) {
            for entry in entries.flatten() {
                size += calculate_path_size(entry.path());
            }
        }
        size
    } else {
        0
    }
}

/// Render a byte count with binary units, e.g. `1.5 MiB`
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}
