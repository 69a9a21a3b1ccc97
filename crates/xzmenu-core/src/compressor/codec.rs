//! liblzma linked in through `xz2`, behaving like the `xz` command

use super::{compressed_path, decompressed_path, Compressor};
use crate::{Error, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use xz2::read::XzDecoder;
use xz2::write::XzEncoder;

/// Preset `xz` uses when no level is given
const DEFAULT_LEVEL: u32 = 6;

/// In-process xz compressor
#[derive(Debug, Clone)]
pub struct XzCodec {
    level: u32,
    keep_archive: bool,
}

impl Default for XzCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl XzCodec {
    pub fn new() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            keep_archive: false,
        }
    }

    pub fn with_level(mut self, level: Option<u32>) -> Self {
        self.level = level.unwrap_or(DEFAULT_LEVEL).min(9);
        self
    }

    pub fn keep_archive(mut self, keep: bool) -> Self {
        self.keep_archive = keep;
        self
    }

    /// Stream `input` through `transcode` into a fresh `output`.
    ///
    /// `output` must not exist yet; a partial output is removed on failure.
    fn transcode<F>(&self, input: &Path, output: &Path, what: &str, transcode: F) -> Result<()>
    where
        F: FnOnce(File, File) -> io::Result<()>,
    {
        let source = File::open(input)?;
        let target = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(output)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => Error::ArtifactExists(output.to_path_buf()),
                _ => Error::Io(e),
            })?;

        if let Err(e) = transcode(source, target) {
            if let Err(cleanup) = fs::remove_file(output) {
                warn!("Failed to remove partial output {:?}: {}", output, cleanup);
            }
            return Err(Error::Compression(format!(
                "{} {} failed: {}",
                what,
                input.display(),
                e
            )));
        }

        Ok(())
    }
}

impl Compressor for XzCodec {
    fn name(&self) -> String {
        "liblzma".to_string()
    }

    fn compress(&self, path: &Path) -> Result<PathBuf> {
        let output = compressed_path(path);
        info!("Compressing {:?} (level {})", path, self.level);

        let level = self.level;
        self.transcode(path, &output, "compressing", |source, target| {
            let mut reader = BufReader::new(source);
            let mut encoder = XzEncoder::new(BufWriter::new(target), level);
            io::copy(&mut reader, &mut encoder)?;
            let mut writer = encoder.finish()?;
            writer.flush()?;
            writer.get_ref().sync_all()
        })?;

        fs::remove_file(path)?;
        debug!("Replaced {:?} with {:?}", path, output);
        Ok(output)
    }

    fn decompress(&self, path: &Path) -> Result<PathBuf> {
        let output = decompressed_path(path)?;
        info!("Decompressing {:?}", path);

        self.transcode(path, &output, "decompressing", |source, target| {
            let mut decoder = XzDecoder::new_multi_decoder(BufReader::new(source));
            let mut writer = BufWriter::new(target);
            io::copy(&mut decoder, &mut writer)?;
            writer.flush()?;
            writer.get_ref().sync_all()
        })?;

        if !self.keep_archive {
            fs::remove_file(path)?;
            debug!("Replaced {:?} with {:?}", path, output);
        }
        Ok(output)
    }
}
