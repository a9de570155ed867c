//! Error types for the NCD engine

use thiserror::Error;

/// Errors raised by compressor backends, the engine and the search
#[derive(Debug, Error)]
pub enum NcdError {
    /// Compressor name outside the supported set
    #[error("unknown compressor '{name}' (expected one of: {expected})")]
    UnknownCompressor { name: String, expected: String },

    /// The backend rejected the input or its output bound was too small
    #[error("{compressor} compression failed: {message}")]
    CompressionFailure {
        compressor: &'static str,
        message: String,
    },

    /// Both compressed sizes are zero, so the distance has no denominator
    #[error("degenerate input: compressed sizes of both buffers are zero")]
    DegenerateInput,

    /// Nothing to compare the query against
    #[error("candidate set is empty")]
    EmptyCandidateSet,
}

impl NcdError {
    pub(crate) fn compression(compressor: &'static str, message: impl Into<String>) -> Self {
        NcdError::CompressionFailure {
            compressor,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NcdError>;
