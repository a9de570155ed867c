//! LZ4 block backend (`lz4_flex`)

use super::Compressor;
use crate::error::{NcdError, Result};

const NAME: &str = "lz4";

/// Raw LZ4 block, no frame header or size prefix
#[derive(Debug, Clone, Copy, Default)]
pub struct Lz4Backend;

impl Compressor for Lz4Backend {
    fn name(&self) -> &'static str {
        NAME
    }

    fn max_compressed_size(&self, input_len: usize) -> usize {
        lz4_flex::block::get_maximum_output_size(input_len)
    }

    fn compressed_size(&self, data: &[u8]) -> Result<usize> {
        let mut out = vec![0u8; self.max_compressed_size(data.len())];
        let written = lz4_flex::block::compress_into(data, &mut out)
            .map_err(|e| NcdError::compression(NAME, e.to_string()))?;
        if written == 0 {
            return Err(NcdError::compression(NAME, "encoder produced no output"));
        }
        Ok(written)
    }
}
