//! Tar staging: building the uncompressed container and unpacking it again

use crate::path::base_name;
use crate::{Error, Result};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use tar::{Archive, Builder};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// An intermediate `.tar` on disk, owned by one operation.
///
/// Dropping it deletes the file if it is still there, so a failed operation
/// never leaves the container behind. The success path calls [`StagedTar::remove`]
/// instead, which reports deletion failures.
#[derive(Debug)]
pub struct StagedTar {
    path: PathBuf,
    armed: bool,
}

impl StagedTar {
    /// Take ownership of a tar file that something else produced
    pub fn adopt(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            armed: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the container is still on disk
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Move the container to `to`, keeping ownership of it.
    ///
    /// If the rename fails the container is removed at its old path.
    pub fn relocate(mut self, to: impl Into<PathBuf>) -> Result<Self> {
        let to = to.into();
        fs::rename(&self.path, &to)?;
        debug!("Moved intermediate archive {:?} to {:?}", self.path, to);
        self.armed = false;
        Ok(Self::adopt(to))
    }

    /// Delete the container now. A file that is already gone counts as removed.
    pub fn remove(mut self) -> Result<PathBuf> {
        self.armed = false;
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Removed intermediate archive {:?}", self.path);
                Ok(self.path.clone())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(self.path.clone()),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

impl Drop for StagedTar {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Cleaned up leftover archive {:?}", self.path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove leftover archive {:?}: {}", self.path, e),
        }
    }
}

/// Where the tar for a single file goes: next to it, extension swapped for `.tar`.
///
/// A source that is already called `*.tar` gets `.tar` appended so the
/// container never lands on the source itself.
pub fn staged_file_path(source: &Path) -> PathBuf {
    let swapped = source.with_extension("tar");
    if swapped != source {
        return swapped;
    }

    let mut appended = source.as_os_str().to_os_string();
    appended.push(".tar");
    PathBuf::from(appended)
}

/// Where the tar for a directory goes: `<output_dir>/<dir name>.tar`
pub fn staged_dir_path(source: &Path, output_dir: &Path) -> Result<PathBuf> {
    let mut name = base_name(source)?;
    name.push(".tar");
    Ok(output_dir.join(name))
}

/// A free, hidden name in `dir` to unpack `tar_path` from.
///
/// Extracted entries can be named like the decompressed tar itself, so the
/// container is moved out of their way before unpacking.
pub fn unpack_path(tar_path: &Path, dir: &Path) -> PathBuf {
    let name = tar_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "archive.tar".to_string());

    let mut attempt = 0u32;
    loop {
        let candidate = dir.join(format!(".xzmenu-{}-{}-{}", std::process::id(), attempt, name));
        if fs::symlink_metadata(&candidate).is_err() {
            return candidate;
        }
        attempt += 1;
    }
}

/// Build a tar container at `tar_path` holding `source` under its base name.
///
/// Files are stored as a single entry, directories recursively. Symlinks are
/// stored as links. If anything fails the partial container is removed.
pub fn stage(source: &Path, tar_path: &Path) -> Result<StagedTar> {
    let metadata = fs::symlink_metadata(source)
        .map_err(|e| Error::invalid_path(source, format!("cannot access: {e}")))?;
    let name = base_name(source)?;

    info!("Staging {:?} into {:?}", source, tar_path);

    if let Some(parent) = tar_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| write_error(tar_path, e))?;
        }
    }

    let file = File::create(tar_path).map_err(|e| write_error(tar_path, e))?;
    // Armed from here on: any early return below removes the partial file.
    let staged = StagedTar::adopt(tar_path);

    let mut builder = Builder::new(file);
    builder.follow_symlinks(false);

    if metadata.is_dir() {
        append_directory(&mut builder, source, Path::new(&name), tar_path)?;
    } else {
        debug!("Adding file: {:?} as {:?}", source, name);
        builder
            .append_path_with_name(source, &name)
            .map_err(|e| write_error(tar_path, e))?;
    }

    let file = builder.into_inner().map_err(|e| write_error(tar_path, e))?;
    file.sync_all().map_err(|e| write_error(tar_path, e))?;

    info!("Staged archive {:?}", tar_path);
    Ok(staged)
}

/// Walk `dir` and append every entry below `root` inside the archive.
fn append_directory(
    builder: &mut Builder<File>,
    dir: &Path,
    root: &Path,
    tar_path: &Path,
) -> Result<()> {
    // The container may be written inside the directory being archived.
    let own_tar = fs::canonicalize(tar_path).ok();

    for entry in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| write_error(tar_path, e.into()))?;
        let path = entry.path();

        if own_tar.is_some() && fs::canonicalize(path).ok() == own_tar {
            debug!("Skipping the staging archive itself: {:?}", path);
            continue;
        }

        let relative = path
            .strip_prefix(dir)
            .map_err(|_| Error::invalid_path(path, "outside of the staged directory"))?;
        let archive_path = root.join(relative);

        let file_type = entry.file_type();
        if file_type.is_dir() {
            debug!("Adding directory: {:?}", archive_path);
            builder
                .append_dir(&archive_path, path)
                .map_err(|e| write_error(tar_path, e))?;
        } else if file_type.is_file() || file_type.is_symlink() {
            debug!("Adding file: {:?}", archive_path);
            builder
                .append_path_with_name(path, &archive_path)
                .map_err(|e| write_error(tar_path, e))?;
        } else {
            warn!("Skipping special file: {:?}", path);
        }
    }

    Ok(())
}

/// Extract every entry of `tar_path` into `destination`.
///
/// Returns the distinct top-level paths that were created, in archive order.
/// Entries that would land outside `destination` are skipped. An entry that
/// would overwrite `tar_path` itself fails the extraction before anything
/// is written over it.
pub fn unstage(tar_path: &Path, destination: &Path) -> Result<Vec<PathBuf>> {
    info!("Extracting {:?} to {:?}", tar_path, destination);

    fs::create_dir_all(destination).map_err(|e| read_error(tar_path, e))?;

    let file = File::open(tar_path).map_err(|e| read_error(tar_path, e))?;
    let mut archive = Archive::new(file);
    archive.set_preserve_permissions(true);
    archive.set_preserve_mtime(true);

    let mut seen = BTreeSet::new();
    let mut roots = Vec::new();

    for entry in archive.entries().map_err(|e| read_error(tar_path, e))? {
        let mut entry = entry.map_err(|e| read_error(tar_path, e))?;
        let path = entry
            .path()
            .map_err(|e| read_error(tar_path, e))?
            .into_owned();

        debug!("Extracting: {:?}", path);

        let target = destination.join(
            path.components()
                .filter(|c| !matches!(c, Component::CurDir))
                .collect::<PathBuf>(),
        );
        if target == tar_path {
            return Err(Error::ArtifactExists(target));
        }

        let unpacked = entry
            .unpack_in(destination)
            .map_err(|e| read_error(tar_path, e))?;
        if !unpacked {
            warn!("Skipped entry outside the destination: {:?}", path);
            continue;
        }

        if let Some(Component::Normal(first)) = path
            .components()
            .find(|c| !matches!(c, Component::CurDir))
        {
            if seen.insert(first.to_os_string()) {
                roots.push(destination.join(first));
            }
        }
    }

    info!("Extracted {} top-level item(s)", roots.len());
    Ok(roots)
}

fn write_error(path: &Path, source: io::Error) -> Error {
    Error::ArchiveWrite {
        path: path.to_path_buf(),
        source,
    }
}

fn read_error(path: &Path, source: io::Error) -> Error {
    Error::ArchiveRead {
        path: path.to_path_buf(),
        source,
    }
}
