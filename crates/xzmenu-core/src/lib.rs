//! xzmenu - pack files and directories into `.tar.xz` and back
//!
//! This library holds everything behind the interactive menu: cleaning up
//! typed paths, staging tar containers, driving the xz compressor, and
//! cleaning up the intermediate files afterwards.

pub mod archive;
pub mod compressor;
pub mod config;
pub mod error;
pub mod operations;
pub mod path;
pub mod utils;

pub use error::{Error, Result};

// Re-export commonly used types
pub use compressor::{create_compressor, Compressor, XzCodec, XzProcess};
pub use config::{Backend, CompressorConfig, Config};
pub use operations::{OperationReport, Pipeline, Request};
pub use path::resolve_path;
