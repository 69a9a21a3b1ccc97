//! Archive staging module

pub mod tar;

pub use self::tar::{stage, staged_dir_path, staged_file_path, unpack_path, unstage, StagedTar};
