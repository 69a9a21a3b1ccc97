//! Common assertions for xzmenu testing

use anyhow::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What a tree entry looks like, keyed by its path relative to the root
#[derive(Debug, PartialEq, Eq)]
enum Node {
    Dir,
    File(Vec<u8>),
    Link(PathBuf),
}

/// Asserts that two directory trees hold the same relative paths and contents
pub fn assert_dirs_equal(dir1: &Path, dir2: &Path) -> Result<()> {
    let tree1 = collect_tree(dir1)?;
    let tree2 = collect_tree(dir2)?;

    let paths1: Vec<_> = tree1.keys().collect();
    let paths2: Vec<_> = tree2.keys().collect();
    assert_eq!(
        paths1, paths2,
        "Different entries under {:?} and {:?}",
        dir1, dir2
    );

    for (path, node) in &tree1 {
        assert_eq!(Some(node), tree2.get(path), "Mismatch for {:?}", path);
    }

    Ok(())
}

/// Asserts that `dir` holds no `.tar` files at its top level
pub fn assert_no_tar_leftovers(dir: &Path) -> Result<()> {
    let leftovers: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|ext| ext == "tar").unwrap_or(false))
        .collect();

    assert!(
        leftovers.is_empty(),
        "Intermediate archives left behind: {:?}",
        leftovers
    );
    Ok(())
}

fn collect_tree(root: &Path) -> Result<BTreeMap<PathBuf, Node>> {
    let mut tree = BTreeMap::new();

    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry = entry?;
        let relative = entry.path().strip_prefix(root)?.to_path_buf();
        let file_type = entry.file_type();

        let node = if file_type.is_symlink() {
            Node::Link(std::fs::read_link(entry.path())?)
        } else if file_type.is_dir() {
            Node::Dir
        } else {
            Node::File(std::fs::read(entry.path())?)
        };
        tree.insert(relative, node);
    }

    Ok(tree)
}
