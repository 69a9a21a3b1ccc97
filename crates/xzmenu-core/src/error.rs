//! Error types for xzmenu-core

use std::path::PathBuf;
use thiserror::Error;

/// Core error types for the xzmenu pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// Source missing, of the wrong type, or not usable for the chosen operation
    #[error("{}: {reason}", .path.display())]
    InvalidPath { path: PathBuf, reason: String },

    /// Building the intermediate tar container failed
    #[error("failed to write tar archive {}: {source}", .path.display())]
    ArchiveWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading or unpacking a tar container failed
    #[error("failed to read tar archive {}: {source}", .path.display())]
    ArchiveRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external compressor ran but reported failure
    #[error("{program} exited with {}", describe_exit(.code))]
    CompressionProcess { program: String, code: Option<i32> },

    /// The external compressor could not be started
    #[error("failed to run {}: {source}", .program.display())]
    CompressorLaunch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// In-process codec failure
    #[error("{0}")]
    Compression(String),

    /// An output or intermediate path is already taken
    #[error("{} already exists", .0.display())]
    ArtifactExists(PathBuf),

    /// Configuration-related error
    #[error("{0}")]
    Config(String),

    /// I/O operation failed
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Short label shown to the user in front of the message
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidPath { .. } => "invalid path",
            Error::ArchiveWrite { .. } => "archive write error",
            Error::ArchiveRead { .. } => "archive read error",
            Error::CompressionProcess { .. } | Error::CompressorLaunch { .. } => {
                "compression process error"
            }
            Error::Compression(_) => "compression error",
            Error::ArtifactExists(_) => "file exists",
            Error::Config(_) => "configuration error",
            Error::Io(_) => "I/O error",
        }
    }

    pub(crate) fn invalid_path(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
