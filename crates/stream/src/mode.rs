//! Open-mode bits for compressed streams.

use std::fmt;
use std::ops::BitOr;

/// Combination of the `read`, `write`, and `binary` mode bits.
///
/// Compose modes with `|`:
///
/// ```
/// use stream::OpenMode;
///
/// let mode = OpenMode::READ | OpenMode::BINARY;
/// assert!(mode.is_read());
/// assert!(!mode.is_write());
/// assert!(mode.is_binary());
/// ```
///
/// `READ | WRITE` is accepted, but a compressed stream cannot seek, which
/// limits its usefulness. The `binary` bit is informational: compressed data
/// is always handled byte-wise.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct OpenMode {
    read: bool,
    write: bool,
    binary: bool,
}

impl OpenMode {
    /// Stream readable (decompressing input).
    pub const READ: OpenMode = OpenMode {
        read: true,
        write: false,
        binary: false,
    };

    /// Stream writable (compressing output).
    pub const WRITE: OpenMode = OpenMode {
        read: false,
        write: true,
        binary: false,
    };

    /// Binary mode marker.
    pub const BINARY: OpenMode = OpenMode {
        read: false,
        write: false,
        binary: true,
    };

    /// `true` iff the read bit is set.
    #[must_use]
    pub const fn is_read(self) -> bool {
        self.read
    }

    /// `true` iff the write bit is set.
    #[must_use]
    pub const fn is_write(self) -> bool {
        self.write
    }

    /// `true` iff the binary bit is set.
    #[must_use]
    pub const fn is_binary(self) -> bool {
        self.binary
    }
}

impl BitOr for OpenMode {
    type Output = OpenMode;

    fn bitor(self, rhs: OpenMode) -> OpenMode {
        OpenMode {
            read: self.read || rhs.read,
            write: self.write || rhs.write,
            binary: self.binary || rhs.binary,
        }
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sep = "";
        for (set, name) in [
            (self.read, "read"),
            (self.write, "write"),
            (self.binary, "binary"),
        ] {
            if set {
                write!(f, "{sep}{name}")?;
                sep = "|";
            }
        }
        if sep.is_empty() {
            f.write_str("none")?;
        }
        Ok(())
    }
}
