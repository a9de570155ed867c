//! LZMA backend producing `.xz` streams (`xz2`)

use super::{heuristic_bound, stream_within_bound, Compressor};
use crate::error::{NcdError, Result};
use xz2::stream::{Action, Check, Status, Stream};

const NAME: &str = "lzma";

/// liblzma preset
const PRESET: u32 = 6;

/// xz container, preset 6, CRC64 integrity check
#[derive(Debug, Clone, Copy, Default)]
pub struct LzmaBackend;

impl Compressor for LzmaBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    /// Incompressible input is stored in uncompressed LZMA2 chunks, so the
    /// container headers and index dominate the slack.
    fn max_compressed_size(&self, input_len: usize) -> usize {
        heuristic_bound(input_len, 1024)
    }

    fn compressed_size(&self, data: &[u8]) -> Result<usize> {
        let mut stream = Stream::new_easy_encoder(PRESET, Check::Crc64)
            .map_err(|e| NcdError::compression(NAME, e.to_string()))?;
        stream_within_bound(NAME, data.len(), self.max_compressed_size(data.len()), |out| {
            let offset = stream.total_in() as usize;
            let status = stream
                .process_vec(&data[offset..], out, Action::Finish)
                .map_err(|e| e.to_string())?;
            Ok((matches!(status, Status::StreamEnd), stream.total_in() as usize))
        })
    }
}
