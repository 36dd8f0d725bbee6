#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `stream` turns the buffered codecs of the `codec` crate into ordinary
//! sequential byte streams: [`GzStream`] implements `Read`, `BufRead`, and
//! `Write` over an exclusively-owned downstream [`Channel`] carrying
//! gzip-framed data, and [`GzFile`] bundles it with a backing file plus
//! line-oriented helpers. Applications hand the stream plaintext in
//! arbitrary-sized chunks (or pull plaintext out of it) without ever
//! buffering a whole file.
//!
//! # Design
//!
//! One inflate pipeline serves the read path and one deflate pipeline the
//! write path; both exist on every stream and the unused one stays dormant.
//! The read side refills its compressed buffer from the channel and steps
//! the inflater until plaintext is available; the write side stages
//! plaintext and, when the buffer fills or a flush is requested, drains
//! every compressed chunk the engine produces into the channel. Positions
//! are reported through dedicated [`GzStream::tell_read`] /
//! [`GzStream::tell_write`] queries (folded into `Seek` only on [`GzFile`],
//! where the trait demands it).
//!
//! # Invariants
//!
//! - `closed` implies no downstream channel is held.
//! - Once [`GzStream::final_flush`] has run, the stream accepts no further
//!   writes until it is reopened.
//! - Reads observe plaintext in stream order; writes commit compressed
//!   bytes to the channel in call order. `final_flush` happens before
//!   `close`'s teardown.
//! - Counters and positions reset on close; they are non-decreasing while
//!   the stream is open.
//!
//! # Errors
//!
//! All failures surface as [`StreamError`] at the adapter boundary (or as
//! `io::Error`s wrapping it through the `std::io` traits); nothing is
//! retried internally. A stream cut off before its gzip trailer is reported
//! as corrupted input, and [`GzStream::close`] itself never raises.
//!
//! # Examples
//!
//! Compress to a file and read it back:
//!
//! ```
//! use std::io::{Read, Write};
//! use stream::{GzFile, OpenMode};
//!
//! # fn main() -> std::io::Result<()> {
//! let dir = tempfile::tempdir()?;
//! let path = dir.path().join("greeting.gz");
//!
//! let mut zf = GzFile::open_path(0, &path, OpenMode::WRITE)?;
//! zf.write_all(b"hello, gzip\n")?;
//! zf.close();
//!
//! let mut zf = GzFile::open_path(0, &path, OpenMode::READ)?;
//! let mut text = String::new();
//! zf.read_to_string(&mut text)?;
//! assert_eq!(text, "hello, gzip\n");
//! # Ok(())
//! # }
//! ```
//!
//! # See also
//!
//! - The `codec` crate for the session and buffer layer underneath.

mod adapter;
mod channel;
mod error;
mod facade;
mod mode;

pub use adapter::GzStream;
pub use channel::{Channel, NativeHandle};
pub use error::StreamError;
pub use facade::GzFile;
pub use mode::OpenMode;
