//! Normalized Compression Distance
//!
//! NCD(x, y) = (C(xy) - min(C(x), C(y))) / max(C(x), C(y))
//!
//! where C is the compressed size under one backend and xy is x followed by
//! y. The concatenation order is fixed; symmetry is not enforced, so the
//! small asymmetry of real compressors (NCD(x, y) != NCD(y, x)) is accepted.

use crate::compressor::Compressor;
use crate::error::{NcdError, Result};

/// Full size triple behind one distance, for auditing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NcdMeasurement {
    pub distance: f64,
    /// C(x)
    pub size_x: usize,
    /// C(y)
    pub size_y: usize,
    /// C(xy)
    pub size_xy: usize,
    pub raw_size_x: usize,
    pub raw_size_y: usize,
}

/// NCD engine bound to one compressor backend
#[derive(Debug, Clone, Copy)]
pub struct NcdEngine<'c> {
    compressor: &'c dyn Compressor,
}

impl<'c> NcdEngine<'c> {
    pub fn new(compressor: &'c dyn Compressor) -> Self {
        Self { compressor }
    }

    pub fn compressor(&self) -> &'c dyn Compressor {
        self.compressor
    }

    /// C(data)
    pub fn compressed_size(&self, data: &[u8]) -> Result<usize> {
        self.compressor.compressed_size(data)
    }

    /// NCD between `x` and `y`
    pub fn distance(&self, x: &[u8], y: &[u8]) -> Result<f64> {
        Ok(self.measure(x, y)?.distance)
    }

    /// NCD between `x` and `y`, keeping every compressed size
    pub fn measure(&self, x: &[u8], y: &[u8]) -> Result<NcdMeasurement> {
        let size_x = self.compressed_size(x)?;
        self.measure_with_size(x, size_x, y)
    }

    /// Same as [`measure`](Self::measure) with C(x) already known.
    ///
    /// Lets a scan compress the query once instead of once per candidate.
    /// `size_x` must come from this engine's compressor.
    pub fn measure_with_size(&self, x: &[u8], size_x: usize, y: &[u8]) -> Result<NcdMeasurement> {
        let size_y = self.compressed_size(y)?;
        let size_xy = self.compressed_size(&concat(x, y))?;
        let distance = ncd_from_sizes(size_x, size_y, size_xy)?;

        if distance < 0.0 {
            log::warn!(
                "{} produced a negative distance {:.4} (C(x)={}, C(y)={}, C(xy)={})",
                self.compressor.name(),
                distance,
                size_x,
                size_y,
                size_xy
            );
        }

        Ok(NcdMeasurement {
            distance,
            size_x,
            size_y,
            size_xy,
            raw_size_x: x.len(),
            raw_size_y: y.len(),
        })
    }
}

/// Distance from a precomputed size triple
pub fn ncd_from_sizes(size_x: usize, size_y: usize, size_xy: usize) -> Result<f64> {
    let max_c = size_x.max(size_y);
    if max_c == 0 {
        return Err(NcdError::DegenerateInput);
    }
    let min_c = size_x.min(size_y);
    Ok((size_xy as f64 - min_c as f64) / max_c as f64)
}

/// x followed by y
pub fn concat(x: &[u8], y: &[u8]) -> Vec<u8> {
    let mut xy = Vec::with_capacity(x.len() + y.len());
    xy.extend_from_slice(x);
    xy.extend_from_slice(y);
    xy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compressor::{CompressorKind, ZlibBackend};
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    /// Reports zero bytes for everything
    #[derive(Debug)]
    struct NullCompressor;

    impl Compressor for NullCompressor {
        fn name(&self) -> &'static str {
            "null"
        }
        fn max_compressed_size(&self, _input_len: usize) -> usize {
            0
        }
        fn compressed_size(&self, _data: &[u8]) -> Result<usize> {
            Ok(0)
        }
    }

    /// Fails on any buffer longer than `limit`
    #[derive(Debug)]
    struct PickyCompressor {
        limit: usize,
    }

    impl Compressor for PickyCompressor {
        fn name(&self) -> &'static str {
            "picky"
        }
        fn max_compressed_size(&self, input_len: usize) -> usize {
            input_len
        }
        fn compressed_size(&self, data: &[u8]) -> Result<usize> {
            if data.len() > self.limit {
                return Err(NcdError::compression("picky", "buffer too small"));
            }
            Ok(data.len())
        }
    }

    fn tone(len: usize, period: usize) -> Vec<u8> {
        (0..len).map(|i| ((i % period) * 7) as u8).collect()
    }

    fn noise(len: usize, seed: u32) -> Vec<u8> {
        let mut state = seed | 1;
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                state as u8
            })
            .collect()
    }

    #[test]
    fn test_ncd_from_sizes() {
        assert_relative_eq!(ncd_from_sizes(10, 20, 25).unwrap(), 0.75);
        assert_relative_eq!(ncd_from_sizes(20, 10, 25).unwrap(), 0.75);
        assert_relative_eq!(ncd_from_sizes(10, 10, 10).unwrap(), 0.0);
        // Pathological compressors can go above 1
        assert!(ncd_from_sizes(10, 10, 30).unwrap() > 1.0);
    }

    #[test]
    fn test_ncd_from_sizes_degenerate() {
        assert!(matches!(ncd_from_sizes(0, 0, 0), Err(NcdError::DegenerateInput)));
        assert!(matches!(ncd_from_sizes(0, 0, 7), Err(NcdError::DegenerateInput)));
    }

    #[test]
    fn test_degenerate_compressor() {
        let engine = NcdEngine::new(&NullCompressor);
        assert!(matches!(engine.distance(b"a", b"b"), Err(NcdError::DegenerateInput)));
    }

    #[test]
    fn test_compression_failure_propagates() {
        let picky = PickyCompressor { limit: 8 };
        let engine = NcdEngine::new(&picky);
        // x and y fit, the concatenation does not
        let err = engine.distance(b"12345", b"67890").unwrap_err();
        assert!(matches!(err, NcdError::CompressionFailure { compressor: "picky", .. }));
    }

    #[test]
    fn test_concat_order() {
        assert_eq!(concat(b"ab", b"cd"), b"abcd".to_vec());
        assert_eq!(concat(b"", b"cd"), b"cd".to_vec());
    }

    #[test]
    fn test_measurement_sizes() {
        let backend = ZlibBackend;
        let engine = NcdEngine::new(&backend);
        let x = tone(512, 12);
        let y = tone(300, 5);
        let m = engine.measure(&x, &y).unwrap();

        assert_eq!(m.raw_size_x, 512);
        assert_eq!(m.raw_size_y, 300);
        assert_eq!(m.size_x, backend.compressed_size(&x).unwrap());
        assert_eq!(m.size_y, backend.compressed_size(&y).unwrap());
        assert_eq!(m.size_xy, backend.compressed_size(&concat(&x, &y)).unwrap());
        assert_relative_eq!(m.distance, ncd_from_sizes(m.size_x, m.size_y, m.size_xy).unwrap());
    }

    #[test]
    fn test_self_distance_is_small_for_every_compressor() {
        // Noise leaves nothing to exploit inside x, only the repeat of x in xx
        let x = noise(1024, 0x9E37_79B9);
        for kind in CompressorKind::ALL {
            let engine = NcdEngine::new(kind.backend());
            let d = engine.distance(&x, &x).unwrap();
            assert!(d < 0.25, "{}: self distance {}", kind, d);
            assert!(d >= 0.0, "{}: negative self distance {}", kind, d);
        }
    }

    #[test]
    fn test_related_closer_than_unrelated() {
        let engine = NcdEngine::new(CompressorKind::Zstd.backend());
        let x = tone(2048, 24);
        let mut near = x.clone();
        near[100] ^= 0xFF;
        near[900] ^= 0xFF;
        let far = noise(2048, 7);

        let d_near = engine.distance(&x, &near).unwrap();
        let d_far = engine.distance(&x, &far).unwrap();
        assert!(d_near < d_far, "near={} far={}", d_near, d_far);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_distance_is_non_negative(
            x in proptest::collection::vec(any::<u8>(), 1..512),
            y in proptest::collection::vec(any::<u8>(), 1..512),
        ) {
            let engine = NcdEngine::new(CompressorKind::Zlib.backend());
            let d = engine.distance(&x, &y).unwrap();
            prop_assert!(d >= 0.0, "suspicious negative distance {}", d);
        }

        #[test]
        fn prop_self_distance_near_zero(
            seed in any::<u32>(),
            len in 256usize..1024,
        ) {
            // Low-entropy inputs let greedy matchers settle for short periodic
            // matches, so only noise isolates the repeat of x
            let x = noise(len, seed);
            let engine = NcdEngine::new(CompressorKind::Zstd.backend());
            let d = engine.distance(&x, &x).unwrap();
            prop_assert!(d < 0.5, "self distance {}", d);
        }
    }
}
