//! Compressor backends and the registry that selects them by name
//!
//! Every backend answers a single question: how many bytes does this buffer
//! compress to? Parameters are fixed per algorithm, there is no tuning surface.

mod bz2;
mod lz4;
mod lzo;
mod snappy;
mod xz;
mod zlib;
mod zstandard;

pub use bz2::Bzip2Backend;
pub use lz4::Lz4Backend;
pub use lzo::{ensure_lzo_initialized, LzoBackend};
pub use snappy::SnappyBackend;
pub use xz::LzmaBackend;
pub use zlib::ZlibBackend;
pub use zstandard::ZstdBackend;

use crate::error::{NcdError, Result};
use std::fmt;
use std::str::FromStr;

/// A compression algorithm reduced to its compressed-size operation
pub trait Compressor: Send + Sync + fmt::Debug {
    /// Canonical registry name (e.g. "zlib")
    fn name(&self) -> &'static str;

    /// Output buffer reserved before compressing `input_len` bytes
    fn max_compressed_size(&self, input_len: usize) -> usize;

    /// Compressed size of `data` in bytes
    fn compressed_size(&self, data: &[u8]) -> Result<usize>;
}

/// Closed set of supported algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CompressorKind {
    Zlib,
    Bzip2,
    Zstd,
    Lzma,
    Lzo,
    Snappy,
    Lz4,
}

static ZLIB: ZlibBackend = ZlibBackend;
static BZIP2: Bzip2Backend = Bzip2Backend;
static ZSTD: ZstdBackend = ZstdBackend;
static LZMA: LzmaBackend = LzmaBackend;
static LZO: LzoBackend = LzoBackend;
static SNAPPY: SnappyBackend = SnappyBackend;
static LZ4: Lz4Backend = Lz4Backend;

impl CompressorKind {
    pub const ALL: [CompressorKind; 7] = [
        CompressorKind::Zlib,
        CompressorKind::Bzip2,
        CompressorKind::Zstd,
        CompressorKind::Lzma,
        CompressorKind::Lzo,
        CompressorKind::Snappy,
        CompressorKind::Lz4,
    ];

    /// Canonical name
    pub fn name(self) -> &'static str {
        self.aliases()[0]
    }

    /// Accepted names, canonical first
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            CompressorKind::Zlib => &["zlib", "gzip"],
            CompressorKind::Bzip2 => &["bzip2"],
            CompressorKind::Zstd => &["zstd"],
            CompressorKind::Lzma => &["lzma", "xz"],
            CompressorKind::Lzo => &["lzo"],
            CompressorKind::Snappy => &["snappy"],
            CompressorKind::Lz4 => &["lz4"],
        }
    }

    /// Shared backend instance for this algorithm
    pub fn backend(self) -> &'static dyn Compressor {
        match self {
            CompressorKind::Zlib => &ZLIB,
            CompressorKind::Bzip2 => &BZIP2,
            CompressorKind::Zstd => &ZSTD,
            CompressorKind::Lzma => &LZMA,
            CompressorKind::Lzo => &LZO,
            CompressorKind::Snappy => &SNAPPY,
            CompressorKind::Lz4 => &LZ4,
        }
    }
}

impl fmt::Display for CompressorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CompressorKind {
    type Err = NcdError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        CompressorKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.aliases().contains(&wanted.as_str()))
            .ok_or_else(|| NcdError::UnknownCompressor {
                name: s.to_string(),
                expected: known_names(),
            })
    }
}

/// Resolve a compressor name (or alias) to its backend
pub fn resolve(name: &str) -> Result<&'static dyn Compressor> {
    let kind: CompressorKind = name.parse()?;
    log::debug!("Resolved compressor '{}' to {}", name, kind);
    Ok(kind.backend())
}

/// Every accepted name, comma separated
pub fn known_names() -> String {
    CompressorKind::ALL
        .iter()
        .flat_map(|kind| kind.aliases().iter().copied())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `len * 1.01 + slack`, for algorithms without a library bound function
pub(crate) fn heuristic_bound(input_len: usize, slack: usize) -> usize {
    input_len + input_len / 100 + 1 + slack
}

/// Drive a streaming encoder to completion inside a fixed output bound.
///
/// `step` feeds whatever input the encoder has not consumed yet and appends
/// to the spare capacity of the buffer, returning whether the stream ended
/// and the total input consumed so far. Filling the bound, or a step that
/// makes no progress, before the stream ends is a compression failure.
pub(crate) fn stream_within_bound<F>(
    compressor: &'static str,
    input_len: usize,
    bound: usize,
    mut step: F,
) -> Result<usize>
where
    F: FnMut(&mut Vec<u8>) -> std::result::Result<(bool, usize), String>,
{
    let mut out = Vec::with_capacity(bound);
    let mut consumed = 0;
    loop {
        let written = out.len();
        let (finished, total_in) =
            step(&mut out).map_err(|e| NcdError::compression(compressor, e))?;
        if finished {
            return Ok(out.len());
        }
        let stalled = out.len() == written && total_in == consumed;
        if out.len() >= out.capacity() || stalled {
            return Err(NcdError::compression(
                compressor,
                format!(
                    "output bound of {} bytes exhausted after {} of {} input bytes",
                    bound, total_in, input_len
                ),
            ));
        }
        consumed = total_in;
    }
}
