//! Error kinds surfaced by the codec sessions.

use flate2::{CompressError, DecompressError};
use thiserror::Error;

/// Failures reported by the DEFLATE engine.
///
/// `Status::Ok` and `Status::BufError` outcomes are not errors: they mean
/// "did as much as possible with the windows provided" and callers respond
/// by supplying more input or draining more output. Only the conditions
/// below surface as values.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The compressed input is not a valid DEFLATE/gzip/zlib stream, or it
    /// ends before the stream's terminal trailer. Dictionary-preset streams
    /// land here too: presets are unsupported, so a stream demanding one is
    /// undecodable input.
    #[error("corrupted compressed input: {0}")]
    CorruptedInput(String),

    /// The engine could not obtain working memory.
    #[error("compression engine out of memory")]
    EngineOom,

    /// The engine rejected its own state; indicates a bug in the session
    /// bookkeeping rather than bad input.
    #[error("compression engine state error: {0}")]
    EngineBug(String),
}

impl CodecError {
    pub(crate) fn from_inflate(err: DecompressError) -> Self {
        let msg = err.to_string();
        if msg.contains("insufficient memory") {
            CodecError::EngineOom
        } else {
            CodecError::CorruptedInput(msg)
        }
    }

    pub(crate) fn from_deflate(err: CompressError) -> Self {
        CodecError::EngineBug(err.to_string())
    }
}
