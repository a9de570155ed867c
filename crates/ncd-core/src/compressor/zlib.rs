//! zlib backend (`flate2`), also reachable under the `gzip` alias

use super::{stream_within_bound, Compressor};
use crate::error::Result;
use flate2::{Compress, Compression, FlushCompress, Status};

const NAME: &str = "zlib";

/// zlib stream at the library default level (6)
#[derive(Debug, Clone, Copy, Default)]
pub struct ZlibBackend;

impl Compressor for ZlibBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    /// Same formula as zlib's `compressBound`
    fn max_compressed_size(&self, input_len: usize) -> usize {
        input_len + (input_len >> 12) + (input_len >> 14) + (input_len >> 25) + 13
    }

    fn compressed_size(&self, data: &[u8]) -> Result<usize> {
        let mut stream = Compress::new(Compression::default(), true);
        stream_within_bound(NAME, data.len(), self.max_compressed_size(data.len()), |out| {
            let offset = stream.total_in() as usize;
            let status = stream
                .compress_vec(&data[offset..], out, FlushCompress::Finish)
                .map_err(|e| e.to_string())?;
            Ok((matches!(status, Status::StreamEnd), stream.total_in() as usize))
        })
    }
}
