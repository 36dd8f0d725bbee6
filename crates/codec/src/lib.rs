#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `codec` provides the buffered streaming layer around a DEFLATE engine:
//! codec sessions that own native engine state, fixed-capacity byte buffers
//! with a producer/consumer protocol, and buffered codecs that route bytes
//! between a caller and a session without allocating in steady state. The
//! compressed side speaks gzip (RFC 1952) on the way out and accepts either
//! gzip or zlib framing on the way in. Higher layers (the `stream` crate)
//! plug these pieces into `std::io`'s sequential byte-stream traits.
//!
//! # Design
//!
//! The engine is [`flate2`](https://docs.rs/flate2)'s raw
//! `Compress`/`Decompress` pair on the zlib-rs backend. A session
//! ([`DeflateSession`], [`InflateSession`]) owns one boxed engine control
//! block and exposes a single `step` call that reports the consumed and
//! produced byte counts for the windows it was given; the windows themselves
//! are ordinary slices, so the borrow checker, rather than a runtime
//! precondition, guarantees that unconsumed input cannot be dropped between
//! steps. A buffered codec ([`BufferedDeflate`], [`BufferedInflate`]) pairs
//! a session with two [`Buffer`]s and maintains the window bookkeeping with
//! [`Span`] index ranges.
//!
//! # Invariants
//!
//! - A buffer's occupied region is contiguous; it never wraps, and draining
//!   it resets both indices so the full capacity is writable again.
//! - Between public calls on a buffered codec, the session's pending input
//!   is exactly the input-side buffer's contents and its output window is
//!   the output-side buffer's writable tail.
//! - Session byte counters are non-decreasing between rebuilds.
//! - As long as each step either receives new input, has output drained, or
//!   (deflate) carries the final flag, stepping terminates with all input
//!   consumed and, for deflate, the gzip trailer produced.
//!
//! # Errors
//!
//! Engine failures surface as [`CodecError`]; benign "give me more of one
//! side" outcomes never do. A compressed stream that stops before its
//! trailer is a [`CodecError::CorruptedInput`], not a short success.
//!
//! # Examples
//!
//! One-shot helpers built on the buffered codecs:
//!
//! ```
//! use codec::{compress_to_vec, decompress_to_vec};
//!
//! # fn main() -> Result<(), codec::CodecError> {
//! let frame = compress_to_vec(b"The quick brown fox jumps over the lazy dog")?;
//! assert_eq!(&frame[..2], &[0x1f, 0x8b]);
//!
//! let back = decompress_to_vec(&frame)?;
//! assert_eq!(back, b"The quick brown fox jumps over the lazy dog");
//! # Ok(())
//! # }
//! ```
//!
//! Incremental decompression with explicit buffer control:
//!
//! ```
//! use codec::{compress_to_vec, BufferedInflate};
//!
//! # fn main() -> Result<(), codec::CodecError> {
//! let frame = compress_to_vec(b"incremental payload")?;
//!
//! let mut zs = BufferedInflate::new(4096);
//! let avail = zs.compressed_avail();
//! zs.compressed_avail_mut()[..frame.len()].copy_from_slice(&frame);
//! zs.compressed_produce(avail.prefix(frame.len()));
//!
//! let mut out = Vec::new();
//! loop {
//!     let produced = zs.step()?;
//!     out.extend_from_slice(zs.plain_contents());
//!     zs.plain_consume_all();
//!     if produced == 0 {
//!         break;
//!     }
//! }
//! assert_eq!(out, b"incremental payload");
//! # Ok(())
//! # }
//! ```
//!
//! # See also
//!
//! - The `stream` crate for the `Read`/`Write` adapter and the file-backed
//!   facade built on these types.

pub mod buffer;
pub mod deflate;
mod error;
pub mod inflate;
mod session;
pub mod span;

pub use buffer::Buffer;
pub use deflate::{compress_to_vec, BufferedDeflate, DeflateSession};
pub use error::CodecError;
pub use inflate::{decompress_to_vec, BufferedInflate, InflateSession};
pub use session::StepOutcome;
pub use span::Span;
