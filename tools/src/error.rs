//! Crate-boundary error type for the directory scanner and doc loader.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolsError {
    #[error("root path does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("root path is not a directory: {0}")]
    RootNotADirectory(PathBuf),

    #[error("refusing to follow symlink: {0}")]
    SymlinkRefused(PathBuf),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("documentation blob is not valid JSON: {0}")]
    InvalidDocsBlob(String),
}

pub type ToolsResult<T> = Result<T, ToolsError>;
