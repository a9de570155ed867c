//! Fingerprint file reader
//!
//! Fingerprints are opaque: the file contents are returned verbatim.

use crate::error::{FpError, Result};
use std::path::Path;

pub struct FreqsReader;

impl FreqsReader {
    /// Read a fingerprint file
    pub fn read(path: &Path) -> Result<Vec<u8>> {
        let data = std::fs::read(path).map_err(|source| FpError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::trace!("Read {} bytes from {}", data.len(), path.display());
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.freqs");
        let bytes: Vec<u8> = (0..=255u8).rev().collect();
        std::fs::write(&path, &bytes).unwrap();

        assert_eq!(FreqsReader::read(&path).unwrap(), bytes);
    }

    #[test]
    fn test_read_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("silence.freqs");
        std::fs::write(&path, b"").unwrap();

        assert!(FreqsReader::read(&path).unwrap().is_empty());
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.freqs");

        let err = FreqsReader::read(&path).unwrap_err();
        assert!(matches!(err, FpError::Io { .. }));
        assert!(err.to_string().contains("missing.freqs"));
    }
}
