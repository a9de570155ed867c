//! Zstandard backend

use super::Compressor;
use crate::error::{NcdError, Result};

const NAME: &str = "zstd";

/// Compression level used for every measurement
const LEVEL: i32 = 3;

/// Single-shot zstd frame at level 3
#[derive(Debug, Clone, Copy, Default)]
pub struct ZstdBackend;

impl Compressor for ZstdBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    fn max_compressed_size(&self, input_len: usize) -> usize {
        zstd::zstd_safe::compress_bound(input_len)
    }

    fn compressed_size(&self, data: &[u8]) -> Result<usize> {
        let mut out = vec![0u8; self.max_compressed_size(data.len())];
        zstd::bulk::compress_to_buffer(data, &mut out, LEVEL)
            .map_err(|e| NcdError::compression(NAME, e.to_string()))
    }
}
