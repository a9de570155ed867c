//! Fingerprint I/O errors

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FpError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

pub type Result<T> = std::result::Result<T, FpError>;
