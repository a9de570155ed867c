//! Snappy backend (raw format, no framing)

use super::Compressor;
use crate::error::{NcdError, Result};

const NAME: &str = "snappy";

#[derive(Debug, Clone, Copy, Default)]
pub struct SnappyBackend;

impl Compressor for SnappyBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    fn max_compressed_size(&self, input_len: usize) -> usize {
        snap::raw::max_compress_len(input_len)
    }

    fn compressed_size(&self, data: &[u8]) -> Result<usize> {
        let bound = self.max_compressed_size(data.len());
        // snap reports 0 when the input exceeds what the format can encode
        if bound == 0 {
            return Err(NcdError::compression(
                NAME,
                format!("input of {} bytes is too large", data.len()),
            ));
        }
        let mut out = vec![0u8; bound];
        let written = snap::raw::Encoder::new()
            .compress(data, &mut out)
            .map_err(|e| NcdError::compression(NAME, e.to_string()))?;
        if written == 0 {
            return Err(NcdError::compression(NAME, "encoder produced no output"));
        }
        Ok(written)
    }
}
