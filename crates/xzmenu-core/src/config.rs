//! Configuration module

use crate::{Error, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How archives get compressed and decompressed
    pub compressor: CompressorConfig,
}

/// Which compressor implementation runs behind the pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Spawn the external `xz` binary
    #[default]
    Process,
    /// Use the linked liblzma codec
    Builtin,
}

/// Compressor configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressorConfig {
    pub backend: Backend,
    /// Explicit path to the xz binary; see [`default_binary`] when unset
    pub binary: Option<PathBuf>,
    /// Preset level 0-9. Unset leaves the compressor's own default.
    pub level: Option<u32>,
    /// Keep the `.tar.xz` after a successful decompression
    pub keep_archive: bool,
}

impl CompressorConfig {
    /// The binary to invoke, falling back to the platform default
    pub fn resolve_binary(&self) -> PathBuf {
        self.binary.clone().unwrap_or_else(default_binary)
    }
}

/// Default location of the xz binary.
///
/// On Windows a copy dropped in the user profile (`%USERPROFILE%\xz.exe`) is
/// preferred; otherwise `xz` is looked up on `PATH` when spawned.
pub fn default_binary() -> PathBuf {
    if cfg!(windows) {
        if let Some(profile) = std::env::var_os("USERPROFILE") {
            let candidate = PathBuf::from(profile).join("xz.exe");
            if candidate.is_file() {
                return candidate;
            }
        }
    }
    PathBuf::from("xz")
}

impl Config {
    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = config_dir().ok_or_else(|| {
            Error::Config("Unable to determine config directory".to_string())
        })?;

        Ok(config_dir.join("xzmenu").join("config.toml"))
    }

    /// Load the user's configuration, or defaults when there is no file
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::from_toml(&contents)
    }

    /// Parse and validate configuration text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if let Some(level) = self.compressor.level {
            if level > 9 {
                return Err(Error::Config(format!(
                    "compressor.level must be between 0 and 9, got {}",
                    level
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.compressor.backend, Backend::Process);
        assert_eq!(config.compressor.binary, None);
        assert_eq!(config.compressor.level, None);
        assert!(!config.compressor.keep_archive);
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_toml(
            r#"
            [compressor]
            backend = "builtin"
            binary = "/opt/xz/bin/xz"
            level = 9
            keep_archive = true
            "#,
        )
        .unwrap();

        assert_eq!(config.compressor.backend, Backend::Builtin);
        assert_eq!(
            config.compressor.resolve_binary(),
            PathBuf::from("/opt/xz/bin/xz")
        );
        assert_eq!(config.compressor.level, Some(9));
        assert!(config.compressor.keep_archive);
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let err = Config::from_toml("[compressor]\nbackend = \"zstd\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_level_out_of_range_rejected() {
        let err = Config::from_toml("[compressor]\nlevel = 12\n").unwrap_err();
        assert!(err.to_string().contains("between 0 and 9"));
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config.compressor.level = Some(3);
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized = Config::from_toml(&toml_str).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_load_from_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = Config::load_from(&temp_dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_default_binary_is_path_lookup() {
        assert_eq!(default_binary(), PathBuf::from("xz"));
    }
}
