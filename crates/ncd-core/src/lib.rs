//! NCD Core - compression-distance similarity engine
//!
//! Estimates how similar two fingerprints are from how well they compress
//! together, and uses that distance to find the closest reference in a
//! corpus or the closest label in a grouped corpus.

pub mod compressor;
pub mod config;
pub mod engine;
pub mod error;
pub mod search;
pub mod window;

pub use compressor::{resolve, Compressor, CompressorKind};
pub use config::NcdConfig;
pub use engine::{NcdEngine, NcdMeasurement};
pub use error::{NcdError, Result};
pub use search::{Candidate, LabelGroups, LabelMatch, Match, Search};
pub use window::{rank_by_window_score, window_match_score, WindowScore};

/// NCD between two buffers under the named compressor
pub fn ncd(x: &[u8], y: &[u8], compressor: &str) -> Result<f64> {
    NcdEngine::new(resolve(compressor)?).distance(x, y)
}
