//! The external `xz` binary as a compressor

use super::{compressed_path, decompressed_path, Compressor};
use crate::{Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Runs `xz <path>` / `xz -d <path>` as a blocking child process.
///
/// Output is not captured; the child inherits the terminal and only its exit
/// status is looked at. There is no timeout.
#[derive(Debug, Clone)]
pub struct XzProcess {
    program: PathBuf,
    level: Option<u32>,
    keep_archive: bool,
}

impl XzProcess {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            level: None,
            keep_archive: false,
        }
    }

    /// Pass `-<level>` when compressing
    pub fn with_level(mut self, level: Option<u32>) -> Self {
        self.level = level;
        self
    }

    /// Pass `--keep` when decompressing so the `.xz` survives
    pub fn keep_archive(mut self, keep: bool) -> Self {
        self.keep_archive = keep;
        self
    }

    fn compress_args(&self, path: &Path) -> Vec<OsString> {
        let mut args = Vec::new();
        if let Some(level) = self.level {
            args.push(OsString::from(format!("-{level}")));
        }
        args.push(path.as_os_str().to_os_string());
        args
    }

    fn decompress_args(&self, path: &Path) -> Vec<OsString> {
        let mut args = vec![OsString::from("-d")];
        if self.keep_archive {
            args.push(OsString::from("--keep"));
        }
        args.push(path.as_os_str().to_os_string());
        args
    }

    fn run(&self, args: &[OsString]) -> Result<()> {
        debug!("Running {:?} {:?}", self.program, args);

        let status = Command::new(&self.program)
            .args(args)
            .status()
            .map_err(|e| Error::CompressorLaunch {
                program: self.program.clone(),
                source: e,
            })?;

        if !status.success() {
            return Err(Error::CompressionProcess {
                program: self.program.display().to_string(),
                code: status.code(),
            });
        }

        Ok(())
    }
}

impl Compressor for XzProcess {
    fn name(&self) -> String {
        self.program.display().to_string()
    }

    fn compress(&self, path: &Path) -> Result<PathBuf> {
        info!("Compressing {:?} with {:?}", path, self.program);
        self.run(&self.compress_args(path))?;
        Ok(compressed_path(path))
    }

    fn decompress(&self, path: &Path) -> Result<PathBuf> {
        let output = decompressed_path(path)?;
        info!("Decompressing {:?} with {:?}", path, self.program);
        self.run(&self.decompress_args(path))?;
        Ok(output)
    }
}
