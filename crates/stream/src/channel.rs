//! The downstream byte channel carrying compressed data.

use std::fs::File;
use std::io::{Read, Write};

/// Bidirectional byte channel for compressed data.
///
/// The adapter owns exactly one channel while open and talks to nothing
/// else; `std::fs::File` is the default implementation, and any
/// `Read + Write` type (an `std::io::Cursor<Vec<u8>>`, a socket, a test
/// double) qualifies through the blanket impl. Only the direction matching
/// the stream's open mode is ever exercised.
pub trait Channel: Read + Write {}

impl<T: Read + Write> Channel for T {}

/// Operating-system handle of the channel, when one exists.
///
/// Purely informational passthrough for callers that need to reach the
/// underlying descriptor (the adapter itself never uses it).
#[cfg(unix)]
pub type NativeHandle = std::os::unix::io::RawFd;

/// Operating-system handle of the channel, when one exists.
///
/// Purely informational passthrough for callers that need to reach the
/// underlying descriptor (the adapter itself never uses it).
#[cfg(not(unix))]
pub type NativeHandle = i64;

/// Reports the native handle of an open file, where the platform exposes
/// one.
#[must_use]
pub(crate) fn file_handle(file: &File) -> Option<NativeHandle> {
    #[cfg(unix)]
    {
        use std::os::unix::io::AsRawFd;
        Some(file.as_raw_fd())
    }
    #[cfg(not(unix))]
    {
        let _ = file;
        None
    }
}
