//! Fingerprint corpus access
//!
//! Reads `.freqs` fingerprints from disk, enumerates flat and genre-grouped
//! corpora, and derives ground-truth labels from file names.

pub mod corpus;
pub mod error;
pub mod naming;
pub mod reader;

pub use corpus::{Corpus, CorpusEntry, GroupedCorpus};
pub use error::FpError;
pub use naming::{expected_genre, noise_label, NoiseLabel};
pub use reader::FreqsReader;

/// Default fingerprint file extension
pub const FREQS_EXTENSION: &str = "freqs";
