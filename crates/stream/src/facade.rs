//! File-backed convenience stream with line-oriented helpers.

use std::io::{self, BufRead, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::adapter::GzStream;
use crate::channel::NativeHandle;
use crate::error::StreamError;
use crate::mode::OpenMode;

/// Block size used by [`GzFile::read_until`] to assemble its result.
const READ_UNTIL_BLOCK: usize = 4095;

/// A [`GzStream`] bundled with its default file-backed channel, plus the
/// line-reading helpers.
///
/// The facade forwards the `std::io` traits to the adapter and adds the
/// open/reopen-by-path lifecycle:
///
/// ```no_run
/// use std::io::Write;
/// use stream::{GzFile, OpenMode};
///
/// # fn main() -> std::io::Result<()> {
/// let mut zf = GzFile::open_path(0, "notes.txt.gz", OpenMode::WRITE)?;
/// zf.write_all(b"compressed on the way down\n")?;
/// zf.close();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct GzFile {
    inner: GzStream,
}

impl GzFile {
    /// Creates a closed stream; open it later with [`open`](Self::open).
    ///
    /// `buf_size` of 0 defers buffer allocation to [`alloc`](Self::alloc),
    /// and the default size is [`GzStream::DEFAULT_BUF_SIZE`].
    #[must_use]
    pub fn new(buf_size: usize, mode: OpenMode) -> Self {
        Self {
            inner: GzStream::new(buf_size, mode),
        }
    }

    /// Creates a stream opened on `path`.
    ///
    /// Unlike [`new`](Self::new), a `buf_size` of 0 selects
    /// [`GzStream::DEFAULT_BUF_SIZE`]: a convenience-opened stream is about
    /// to do I/O, so deferred allocation would be a contradiction.
    ///
    /// # Errors
    ///
    /// [`StreamError::OpenFailed`] when the file cannot be opened.
    pub fn open_path<P: AsRef<Path>>(
        buf_size: usize,
        path: P,
        mode: OpenMode,
    ) -> Result<Self, StreamError> {
        let buf_size = if buf_size == 0 {
            GzStream::DEFAULT_BUF_SIZE
        } else {
            buf_size
        };
        let mut zf = Self::new(buf_size, mode);
        zf.open(path, mode)?;
        Ok(zf)
    }

    /// The underlying byte-stream adapter.
    #[must_use]
    pub fn stream(&self) -> &GzStream {
        &self.inner
    }

    /// The underlying byte-stream adapter, mutably.
    #[must_use]
    pub fn stream_mut(&mut self) -> &mut GzStream {
        &mut self.inner
    }

    /// Open mode recorded when the stream was last opened.
    #[must_use]
    pub fn openmode(&self) -> OpenMode {
        self.inner.openmode()
    }

    /// `true` iff the stream is available for I/O.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    /// `true` iff the stream is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    /// `true` iff the recorded open mode carries the binary bit.
    #[must_use]
    pub fn is_binary(&self) -> bool {
        self.inner.is_binary()
    }

    /// Native handle of the backing file, when known.
    #[must_use]
    pub fn native_handle(&self) -> Option<NativeHandle> {
        self.inner.native_handle()
    }

    /// Allocates buffer space before I/O begins; see [`GzStream::alloc`].
    pub fn alloc(&mut self, buf_size: usize) {
        self.inner.alloc(buf_size);
    }

    /// (Re)opens the stream on `path`, closing any current file first; see
    /// [`GzStream::open`].
    ///
    /// # Errors
    ///
    /// [`StreamError::OpenFailed`] when the file cannot be opened.
    pub fn open<P: AsRef<Path>>(&mut self, path: P, mode: OpenMode) -> Result<(), StreamError> {
        self.inner.open(path, mode)
    }

    /// Finalizes the compressed output; see [`GzStream::final_flush`].
    ///
    /// # Errors
    ///
    /// Propagates codec and downstream-write failures.
    pub fn final_flush(&mut self) -> Result<(), StreamError> {
        self.inner.final_flush()
    }

    /// Flushes and closes the stream; see [`GzStream::close`]. Never
    /// raises.
    pub fn close(&mut self) {
        self.inner.close();
    }

    /// Read position in plaintext bytes; see [`GzStream::tell_read`].
    #[must_use]
    pub fn tell_read(&self) -> u64 {
        self.inner.tell_read()
    }

    /// Write position in plaintext bytes; see [`GzStream::tell_write`].
    #[must_use]
    pub fn tell_write(&self) -> u64 {
        self.inner.tell_write()
    }

    /// Reads up to `dst.len() - 1` bytes into `dst`, always writing a
    /// terminating NUL after the stored bytes, and returns the stored count
    /// `nr` (the NUL excluded).
    ///
    /// With `check_delim` set, reading stops after the first occurrence of
    /// `delim`, which is *included* in the output; a delimiter in the first
    /// position therefore yields `nr == 1`. Without `check_delim` the call
    /// reads until `dst` is full or the stream ends. `nr == 0` means end of
    /// stream (or an empty `dst`).
    ///
    /// The NUL terminator exists for callers marshalling into C-style
    /// buffers; Rust callers usually want [`read_until`](Self::read_until).
    ///
    /// # Errors
    ///
    /// Propagates read-path failures from the adapter.
    pub fn read_until_into(
        &mut self,
        dst: &mut [u8],
        check_delim: bool,
        delim: u8,
    ) -> io::Result<usize> {
        if dst.is_empty() {
            return Ok(0);
        }

        let cap = dst.len() - 1;
        let mut nr = 0;

        while nr < cap {
            let chunk = self.inner.fill_buf()?;
            if chunk.is_empty() {
                break;
            }
            let take = chunk.len().min(cap - nr);

            if check_delim {
                if let Some(pos) = chunk[..take].iter().position(|&b| b == delim) {
                    dst[nr..nr + pos + 1].copy_from_slice(&chunk[..pos + 1]);
                    self.inner.consume(pos + 1);
                    nr += pos + 1;
                    break;
                }
            }

            dst[nr..nr + take].copy_from_slice(&chunk[..take]);
            self.inner.consume(take);
            nr += take;
        }

        dst[nr] = 0;
        Ok(nr)
    }

    /// Reads until after the first occurrence of `delim` (with
    /// `check_delim` set) or to end of stream, returning the bytes read.
    /// The delimiter is included in the result; an empty result means end
    /// of stream.
    ///
    /// Assembled from fixed-size blocks, so the cost is linear in the
    /// length of the result.
    ///
    /// # Errors
    ///
    /// Propagates read-path failures from the adapter.
    pub fn read_until(&mut self, check_delim: bool, delim: u8) -> io::Result<Vec<u8>> {
        let mut blocks: Vec<Vec<u8>> = Vec::new();
        let mut total = 0;

        loop {
            let mut block = vec![0u8; READ_UNTIL_BLOCK + 1];
            let nr = self.read_until_into(&mut block, check_delim, delim)?;
            block.truncate(nr);
            total += nr;

            let done = nr < READ_UNTIL_BLOCK
                || (check_delim && block.last() == Some(&delim));
            blocks.push(block);
            if done {
                break;
            }
        }

        let mut result = Vec::with_capacity(total);
        for block in blocks {
            result.extend_from_slice(&block);
        }
        Ok(result)
    }
}

impl Read for GzFile {
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        self.inner.read(dst)
    }
}

impl BufRead for GzFile {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt);
    }
}

impl Write for GzFile {
    fn write(&mut self, src: &[u8]) -> io::Result<usize> {
        self.inner.write(src)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl Seek for GzFile {
    /// Compressed streams cannot reposition; only the tell-equivalent
    /// `SeekFrom::Current(0)` is supported, reporting the write position on
    /// a writable stream and the read position otherwise. Every other
    /// argument combination fails with [`io::ErrorKind::Unsupported`].
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match pos {
            SeekFrom::Current(0) => Ok(if self.inner.openmode().is_write() {
                self.inner.tell_write()
            } else {
                self.inner.tell_read()
            }),
            _ => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "compressed streams only support position queries (SeekFrom::Current(0))",
            )),
        }
    }
}
