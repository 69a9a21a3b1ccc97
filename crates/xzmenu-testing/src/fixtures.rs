//! Common test fixtures for xzmenu testing

use crate::TestDir;
use anyhow::Result;
use std::path::PathBuf;

/// Creates a `project/` tree with text, binary, empty and nested files.
///
/// Returns the path of the `project` directory.
pub fn create_project_tree(test_dir: &TestDir) -> Result<PathBuf> {
    test_dir.create_file("project/README.md", b"# Test Project\n\nFor archiving.")?;
    test_dir.create_file("project/.gitignore", b"target/\n*.tmp")?;
    test_dir.create_file("project/src/main.rs", b"fn main() {}")?;
    test_dir.create_file("project/src/modules/mod.rs", b"pub mod utils;")?;
    test_dir.create_file("project/assets/logo.png", &[0x89, 0x50, 0x4E, 0x47, 0x00, 0xFF])?;
    test_dir.create_file("project/empty.txt", b"")?;
    test_dir.create_dir("project/empty_dir")?;

    Ok(test_dir.path().join("project"))
}

/// Creates a single compressible text file and returns its path
pub fn create_text_file(test_dir: &TestDir, name: &str) -> Result<PathBuf> {
    let content = "The quick brown fox jumps over the lazy dog.\n".repeat(500);
    test_dir.create_file(name, content.as_bytes())
}

/// Creates a file of pseudo-random bytes that xz cannot shrink much
pub fn create_binary_file(test_dir: &TestDir, name: &str, len: usize) -> Result<PathBuf> {
    let mut state: u32 = 0x9E37_79B9;
    let bytes: Vec<u8> = (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect();
    test_dir.create_file(name, &bytes)
}
