//! Compressors that turn a staged `.tar` into `.tar.xz` and back
//!
//! Both implementations follow the `xz` command's default contract: the
//! input file is replaced by its (de)compressed counterpart, so a successful
//! `compress` consumes the tar and a successful `decompress` consumes the
//! `.xz` (unless asked to keep it).

mod codec;
mod process;

pub use codec::XzCodec;
pub use process::XzProcess;

use crate::config::{Backend, CompressorConfig};
use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// A pluggable xz compressor
pub trait Compressor {
    /// Human-readable name for logs and reports
    fn name(&self) -> String;

    /// Compress `path` into `path.xz`, removing `path`. Returns the new file.
    fn compress(&self, path: &Path) -> Result<PathBuf>;

    /// Decompress `path.xz` into `path`. Returns the new file.
    fn decompress(&self, path: &Path) -> Result<PathBuf>;
}

/// Build the compressor described by `config`
pub fn create_compressor(config: &CompressorConfig) -> Box<dyn Compressor> {
    match config.backend {
        Backend::Process => Box::new(
            XzProcess::new(config.resolve_binary())
                .with_level(config.level)
                .keep_archive(config.keep_archive),
        ),
        Backend::Builtin => Box::new(
            XzCodec::new()
                .with_level(config.level)
                .keep_archive(config.keep_archive),
        ),
    }
}

/// The file `compress` produces for `path`: `.xz` appended
pub fn compressed_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".xz");
    PathBuf::from(name)
}

/// The file `decompress` produces for `path`.
///
/// `name.xz` becomes `name` and `name.txz` becomes `name.tar`; anything else
/// is not something xz will decompress in place.
pub fn decompressed_path(path: &Path) -> Result<PathBuf> {
    let has_stem = path
        .file_stem()
        .map(|stem| !stem.is_empty())
        .unwrap_or(false);

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("xz") if has_stem => Ok(path.with_extension("")),
        Some("txz") if has_stem => Ok(path.with_extension("tar")),
        _ => Err(Error::invalid_path(
            path,
            "expected an archive ending in .xz or .txz",
        )),
    }
}
