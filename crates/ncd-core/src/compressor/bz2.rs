//! bzip2 backend

use super::{heuristic_bound, stream_within_bound, Compressor};
use crate::error::Result;
use bzip2::{Action, Compress, Compression, Status};

const NAME: &str = "bzip2";

/// Work factor passed to libbzip2 (library default)
const WORK_FACTOR: u32 = 30;

/// bzip2 with 900k blocks
#[derive(Debug, Clone, Copy, Default)]
pub struct Bzip2Backend;

impl Compressor for Bzip2Backend {
    fn name(&self) -> &'static str {
        NAME
    }

    fn max_compressed_size(&self, input_len: usize) -> usize {
        heuristic_bound(input_len, 600)
    }

    fn compressed_size(&self, data: &[u8]) -> Result<usize> {
        let mut stream = Compress::new(Compression::best(), WORK_FACTOR);
        stream_within_bound(NAME, data.len(), self.max_compressed_size(data.len()), |out| {
            let offset = stream.total_in() as usize;
            let status = stream
                .compress_vec(&data[offset..], out, Action::Finish)
                .map_err(|e| e.to_string())?;
            Ok((matches!(status, Status::StreamEnd), stream.total_in() as usize))
        })
    }
}
