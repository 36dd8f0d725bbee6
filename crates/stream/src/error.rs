//! Error kinds surfaced at the adapter boundary.

use std::io;
use std::path::PathBuf;

use codec::CodecError;
use thiserror::Error;

/// Failures reported by [`GzStream`](crate::GzStream) and
/// [`GzFile`](crate::GzFile).
///
/// Nothing is retried internally: engine failures are deterministic for a
/// given input, and downstream failures are the caller's to handle. The
/// `Read`/`Write` trait impls convert these values into [`io::Error`]s via
/// [`From`], preserving the structured error as the source so callers can
/// recover it with [`io::Error::get_ref`] or
/// [`io::Error::downcast`].
#[derive(Debug, Error)]
pub enum StreamError {
    /// The codec engine failed; see [`CodecError`] for the kinds.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The downstream channel accepted fewer bytes than it was offered.
    /// Compressed output cannot be replayed, so a short write is fatal for
    /// the stream.
    #[error("downstream channel accepted {written} of {attempted} compressed bytes")]
    DownstreamShortWrite {
        /// Bytes offered to the channel.
        attempted: usize,
        /// Bytes the channel actually took.
        written: usize,
    },

    /// The downstream channel failed while being read.
    #[error("downstream channel read failed")]
    DownstreamReadFailed(#[source] io::Error),

    /// The downstream channel failed while being written.
    #[error("downstream channel write failed")]
    DownstreamWriteFailed(#[source] io::Error),

    /// Convenience open-by-path could not establish the backing file.
    #[error("failed to open {}", path.display())]
    OpenFailed {
        /// Path passed to the open call.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: io::Error,
    },

    /// A write was attempted after the compressed output was finalized or
    /// the stream was closed.
    #[error("write to a stream whose compressed output is already finalized")]
    WriteAfterFinal,

    /// An operation was attempted that the stream's open mode does not
    /// permit.
    #[error("{0}")]
    ModeMismatch(&'static str),

    /// I/O was attempted on a stream whose buffers were never allocated
    /// (constructed with buffer size 0 and [`alloc`](crate::GzStream::alloc)
    /// was not called). Raised on reads, writes, and output finalization
    /// alike; a zero-capacity pipeline would otherwise report a bogus end
    /// of stream or fabricate empty output.
    #[error("stream buffers are unallocated; allocate them before performing i/o")]
    Unallocated,
}

impl From<StreamError> for io::Error {
    fn from(err: StreamError) -> io::Error {
        let kind = match &err {
            StreamError::Codec(CodecError::CorruptedInput(_)) => io::ErrorKind::InvalidData,
            StreamError::Codec(_) => io::ErrorKind::Other,
            StreamError::DownstreamShortWrite { .. } => io::ErrorKind::WriteZero,
            StreamError::DownstreamReadFailed(source) => source.kind(),
            StreamError::DownstreamWriteFailed(source) => source.kind(),
            StreamError::OpenFailed { source, .. } => source.kind(),
            StreamError::WriteAfterFinal => io::ErrorKind::Other,
            StreamError::ModeMismatch(_) => io::ErrorKind::Unsupported,
            StreamError::Unallocated => io::ErrorKind::InvalidInput,
        };
        io::Error::new(kind, err)
    }
}
