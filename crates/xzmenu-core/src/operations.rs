//! The compress and decompress pipelines
//!
//! Compression stages a `.tar` and hands it to the compressor, which replaces
//! it with `.tar.xz`. Decompression runs the compressor in reverse and unpacks
//! the resulting `.tar` next to the archive, then deletes it. In both
//! directions the `.tar` is owned by a [`StagedTar`], so it is gone by the time
//! the operation returns, whether it succeeded or not.

use crate::archive::{self, StagedTar};
use crate::compressor::{compressed_path, decompressed_path, Compressor};
use crate::utils::calculate_path_size;
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A fully specified operation, ready to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    CompressFile { source: PathBuf },
    CompressDirectory { source: PathBuf, output_dir: PathBuf },
    Decompress { archive: PathBuf },
}

/// What an operation produced and cleaned up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationReport {
    /// The path the user asked to process
    pub source: PathBuf,
    /// Final artifacts: the `.tar.xz`, or the extracted top-level items
    pub outputs: Vec<PathBuf>,
    /// Files that no longer exist because of this operation
    pub removed: Vec<PathBuf>,
    /// Total size of `outputs` in bytes
    pub bytes: u64,
}

/// Runs requests against one compressor
pub struct Pipeline<'a> {
    compressor: &'a dyn Compressor,
}

impl<'a> Pipeline<'a> {
    pub fn new(compressor: &'a dyn Compressor) -> Self {
        Self { compressor }
    }

    pub fn compressor_name(&self) -> String {
        self.compressor.name()
    }

    pub fn execute(&self, request: &Request) -> Result<OperationReport> {
        match request {
            Request::CompressFile { source } => self.compress_file(source),
            Request::CompressDirectory { source, output_dir } => {
                self.compress_directory(source, output_dir)
            }
            Request::Decompress { archive } => self.decompress(archive),
        }
    }

    /// Pack a single file into `<stem>.tar.xz` next to it
    pub fn compress_file(&self, source: &Path) -> Result<OperationReport> {
        require_file(source)?;
        let tar_path = archive::staged_file_path(source);
        self.compress_into(source, &tar_path)
    }

    /// Pack a directory into `<output_dir>/<name>.tar.xz`
    pub fn compress_directory(&self, source: &Path, output_dir: &Path) -> Result<OperationReport> {
        require_dir(source)?;
        if output_dir.exists() && !output_dir.is_dir() {
            return Err(Error::invalid_path(output_dir, "is not a directory"));
        }
        let tar_path = archive::staged_dir_path(source, output_dir)?;

        let created = !output_dir.exists();
        let result = self.compress_into(source, &tar_path);
        if result.is_err() && created {
            // Only succeeds if nothing was left inside.
            if fs::remove_dir(output_dir).is_ok() {
                debug!("Removed output directory {:?} after failure", output_dir);
            }
        }
        result
    }

    fn compress_into(&self, source: &Path, tar_path: &Path) -> Result<OperationReport> {
        let output = compressed_path(tar_path);
        refuse_existing(tar_path)?;
        refuse_existing(&output)?;

        info!("Compressing {:?} to {:?}", source, output);

        let staged = archive::stage(source, tar_path)?;
        let output = self.compressor.compress(staged.path())?;
        // The compressor consumed the tar; this only catches a leftover.
        let removed = staged.remove()?;

        let bytes = calculate_path_size(&output);
        info!("Compressed {:?} ({} bytes)", output, bytes);

        Ok(OperationReport {
            source: source.to_path_buf(),
            outputs: vec![output],
            removed: vec![removed],
            bytes,
        })
    }

    /// Decompress a `.tar.xz` and unpack it into the archive's directory.
    ///
    /// The decompressed tar is moved to a hidden name before unpacking, so an
    /// entry called like the tar itself is extracted instead of discarded.
    pub fn decompress(&self, archive_path: &Path) -> Result<OperationReport> {
        require_file(archive_path)?;
        let tar_path = decompressed_path(archive_path)?;
        refuse_existing(&tar_path)?;

        let destination = match archive_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        info!("Decompressing {:?} into {:?}", archive_path, destination);

        // Nothing was at tar_path before, so whatever appears there is ours.
        let staged = StagedTar::adopt(&tar_path);
        self.compressor.decompress(archive_path)?;
        let staged = staged.relocate(archive::unpack_path(&tar_path, &destination))?;
        let outputs = archive::unstage(staged.path(), &destination)?;
        staged.remove()?;

        let mut removed = Vec::new();
        if !archive_path.exists() {
            removed.push(archive_path.to_path_buf());
        }

        let bytes = outputs.iter().map(calculate_path_size).sum();
        info!("Extracted {} item(s) into {:?}", outputs.len(), destination);

        Ok(OperationReport {
            source: archive_path.to_path_buf(),
            outputs,
            removed,
            bytes,
        })
    }
}

fn require_file(path: &Path) -> Result<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(Error::invalid_path(path, "is a directory, not a file")),
        Err(e) => Err(Error::invalid_path(path, format!("cannot access: {e}"))),
    }
}

fn require_dir(path: &Path) -> Result<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(Error::invalid_path(path, "is a file, not a directory")),
        Err(e) => Err(Error::invalid_path(path, format!("cannot access: {e}"))),
    }
}

fn refuse_existing(path: &Path) -> Result<()> {
    if fs::symlink_metadata(path).is_ok() {
        return Err(Error::ArtifactExists(path.to_path_buf()));
    }
    Ok(())
}
