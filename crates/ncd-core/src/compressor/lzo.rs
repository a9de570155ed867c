//! LZO1X-1 backend (`rust-lzo`)
//!
//! The LZO library must be initialised once per process before the first
//! compression. Initialisation runs under a `OnceLock`, so concurrent first
//! use from several threads still performs it exactly once and every caller
//! observes the same outcome.

use super::Compressor;
use crate::error::{NcdError, Result};
use rust_lzo::{LZOContext, LZOError};
use std::sync::OnceLock;

const NAME: &str = "lzo";

static LZO_INIT: OnceLock<std::result::Result<(), String>> = OnceLock::new();

/// Initialise the LZO library, running the self-check only on first call
pub fn ensure_lzo_initialized() -> Result<()> {
    LZO_INIT
        .get_or_init(|| {
            log::debug!("Initialising LZO library");
            lzo_self_check()
        })
        .clone()
        .map_err(|message| NcdError::compression(NAME, format!("initialisation failed: {}", message)))
}

/// Compress a fixed, highly redundant probe and check the encoder both
/// succeeds and actually shrinks it.
fn lzo_self_check() -> std::result::Result<(), String> {
    let probe: Vec<u8> = (0..1024u32).map(|i| (i % 16) as u8).collect();
    let mut out = vec![0u8; lzo_bound(probe.len())];
    let mut ctx = LZOContext::new();
    let (compressed, err) = ctx.compress_to_slice(&probe, &mut out);
    if !matches!(err, LZOError::OK) {
        return Err("probe compression was rejected".to_string());
    }
    if compressed.is_empty() || compressed.len() >= probe.len() {
        return Err(format!(
            "probe of {} bytes compressed to {} bytes",
            probe.len(),
            compressed.len()
        ));
    }
    Ok(())
}

fn lzo_bound(input_len: usize) -> usize {
    input_len + input_len / 16 + 64 + 3
}

/// LZO1X-1, the fast variant with a fixed work memory size
#[derive(Debug, Clone, Copy, Default)]
pub struct LzoBackend;

impl Compressor for LzoBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    fn max_compressed_size(&self, input_len: usize) -> usize {
        lzo_bound(input_len)
    }

    fn compressed_size(&self, data: &[u8]) -> Result<usize> {
        ensure_lzo_initialized()?;

        let mut out = vec![0u8; self.max_compressed_size(data.len())];
        let mut ctx = LZOContext::new();
        let (compressed, err) = ctx.compress_to_slice(data, &mut out);
        if !matches!(err, LZOError::OK) {
            return Err(NcdError::compression(
                NAME,
                format!("lzo1x_1 rejected {} input bytes", data.len()),
            ));
        }
        Ok(compressed.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_initialisation_is_idempotent() {
        assert!(ensure_lzo_initialized().is_ok());
        assert!(ensure_lzo_initialized().is_ok());
    }

    #[test]
    fn test_concurrent_first_use() {
        let data: Vec<u8> = b"lzo lzo lzo lzo lzo lzo lzo lzo".to_vec();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let data = data.clone();
                thread::spawn(move || LzoBackend.compressed_size(&data).unwrap())
            })
            .collect();

        let sizes: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(sizes.iter().all(|&s| s == sizes[0]));
    }
}
