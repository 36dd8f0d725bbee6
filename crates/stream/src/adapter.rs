//! The byte-stream adapter: `std::io` traits over a pair of buffered codecs.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, BufRead, Read, Write};
use std::path::Path;

use codec::{BufferedDeflate, BufferedInflate, CodecError};
use tracing::{trace, warn};

use crate::channel::{file_handle, Channel, NativeHandle};
use crate::error::StreamError;
use crate::mode::OpenMode;

/// Sequential byte stream that decompresses what it reads and compresses
/// what it writes, against an exclusively-owned downstream [`Channel`]
/// carrying the gzip-framed data.
///
/// Both directions are always present; a read-only stream simply leaves its
/// deflate side dormant. All operations run on the caller's thread; the
/// stream owns no threads and blocks only where the channel blocks.
/// Distinct streams are independent; a single stream is not for concurrent
/// use.
///
/// Lifecycle:
///
/// ```text
///             adopt_channel / open
///  closed ------------------------> open
///  open   --(final_flush)---------> open-final   (writes error; reads OK)
///  open   --(close)---------------> closed
///  open-final --(close)-----------> closed
/// ```
///
/// A stream abandoned without [`final_flush`](Self::final_flush) (or
/// [`close`](Self::close), which performs it) leaves a truncated gzip
/// stream behind; decoders report that as corrupted input, not as a short
/// success.
pub struct GzStream {
    mode: OpenMode,
    closed: bool,
    final_flush_done: bool,
    /// Plaintext bytes handed to the caller since the last open.
    read_pos: u64,
    /// Plaintext bytes accepted from the caller since the last open.
    write_pos: u64,
    in_zs: BufferedInflate,
    out_zs: BufferedDeflate,
    channel: Option<Box<dyn Channel>>,
    handle: Option<NativeHandle>,
}

impl GzStream {
    /// Default size for each of the four internal buffers (64 KiB).
    pub const DEFAULT_BUF_SIZE: usize = BufferedInflate::DEFAULT_BUF_SIZE;

    /// Creates a closed stream. Attach a channel with
    /// [`adopt_channel`](Self::adopt_channel) or [`open`](Self::open)
    /// before performing I/O.
    ///
    /// `buf_size` sizes each of the four internal buffers ({compressed,
    /// plaintext} x {in, out}); pass 0 to defer allocation to
    /// [`alloc`](Self::alloc).
    #[must_use]
    pub fn new(buf_size: usize, mode: OpenMode) -> Self {
        Self {
            mode,
            closed: true,
            final_flush_done: false,
            read_pos: 0,
            write_pos: 0,
            in_zs: BufferedInflate::new(buf_size),
            out_zs: BufferedDeflate::new(buf_size),
            channel: None,
            handle: None,
        }
    }

    /// Creates an open stream over the supplied channel.
    #[must_use]
    pub fn with_channel(
        buf_size: usize,
        mode: OpenMode,
        channel: Box<dyn Channel>,
        handle: Option<NativeHandle>,
    ) -> Self {
        let mut stream = Self::new(buf_size, mode);
        stream.adopt_channel(channel, handle);
        stream
    }

    /// Allocates buffer space before I/O begins. Does not preserve buffer
    /// contents; not intended for use once compression or decompression
    /// work has started.
    pub fn alloc(&mut self, buf_size: usize) {
        self.in_zs.alloc(buf_size);
        self.out_zs.alloc(buf_size);
    }

    /// Open mode recorded when the stream was last opened.
    #[must_use]
    pub fn openmode(&self) -> OpenMode {
        self.mode
    }

    /// `true` iff the stream has a channel and is available for I/O.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.closed
    }

    /// `true` iff the stream is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// `true` iff the recorded open mode carries the binary bit.
    #[must_use]
    pub fn is_binary(&self) -> bool {
        self.mode.is_binary()
    }

    /// `true` once the compressed output has been finalized; writes are
    /// rejected from then on.
    #[must_use]
    pub fn is_final_flushed(&self) -> bool {
        self.final_flush_done
    }

    /// Native handle of the downstream channel, when known.
    #[must_use]
    pub fn native_handle(&self) -> Option<NativeHandle> {
        self.handle
    }

    /// Compressed bytes consumed from the channel since the last open.
    #[must_use]
    pub fn total_compressed_in(&self) -> u64 {
        self.in_zs.n_in_total()
    }

    /// Plaintext bytes decoded from the channel since the last open.
    #[must_use]
    pub fn total_plain_in(&self) -> u64 {
        self.in_zs.n_out_total()
    }

    /// Plaintext bytes consumed by the compressor since the last open.
    #[must_use]
    pub fn total_plain_out(&self) -> u64 {
        self.out_zs.n_in_total()
    }

    /// Compressed bytes emitted towards the channel since the last open.
    #[must_use]
    pub fn total_compressed_out(&self) -> u64 {
        self.out_zs.n_out_total()
    }

    /// Read position: plaintext bytes the caller has consumed since the
    /// last open.
    #[must_use]
    pub fn tell_read(&self) -> u64 {
        self.read_pos
    }

    /// Write position: plaintext bytes the caller has written since the
    /// last open.
    #[must_use]
    pub fn tell_write(&self) -> u64 {
        self.write_pos
    }

    /// Installs (or replaces) the downstream channel, transitioning the
    /// stream to the open state and re-arming output finalization.
    ///
    /// The channel is owned exclusively from here on; dropping the stream
    /// or closing it drops the channel, which is what flushes a backing
    /// file. `handle` is recorded for [`native_handle`](Self::native_handle)
    /// only. Codec and position state is not reset here: adopt onto a
    /// closed stream (the usual case) or call [`close`](Self::close) first.
    pub fn adopt_channel(&mut self, channel: Box<dyn Channel>, handle: Option<NativeHandle>) {
        self.channel = Some(channel);
        self.handle = handle;
        self.final_flush_done = false;
        self.closed = false;
        trace!(mode = %self.mode, "channel adopted");
    }

    /// Closes any current channel, then opens `path` as the new backing
    /// file in binary mode: truncated/created for writing modes, read-only
    /// otherwise.
    ///
    /// # Errors
    ///
    /// [`StreamError::OpenFailed`] when the file cannot be opened; the
    /// stream stays closed in that case.
    pub fn open<P: AsRef<Path>>(&mut self, path: P, mode: OpenMode) -> Result<(), StreamError> {
        self.close();
        self.mode = mode;

        let path = path.as_ref();
        let mut options = OpenOptions::new();
        if mode.is_write() {
            options.write(true).create(true).truncate(true);
        }
        if mode.is_read() || !mode.is_write() {
            options.read(true);
        }

        let file = options.open(path).map_err(|source| StreamError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let handle = file_handle(&file);
        trace!(path = %path.display(), mode = %mode, "opened backing file");
        self.adopt_channel(Box::new(file), handle);
        Ok(())
    }

    /// Finalizes the compressed output: compresses everything still staged,
    /// flushes the engine's held state, and emits the gzip trailer. Sticky:
    /// the stream accepts no further writes afterwards (until reopened).
    ///
    /// Exposed separately from [`close`](Self::close) so callers can
    /// observe the final byte counters before close resets them. Idempotent;
    /// a no-op on a closed or already-finalized stream.
    ///
    /// # Errors
    ///
    /// [`StreamError::Unallocated`] on a writable stream whose buffers were
    /// never allocated (nothing has been committed, and the flush can be
    /// retried after [`alloc`](Self::alloc)); otherwise propagates codec and
    /// downstream-write failures.
    pub fn final_flush(&mut self) -> Result<(), StreamError> {
        if self.final_flush_done || self.closed {
            return Ok(());
        }
        self.sync_impl(true)
    }

    /// Commits compressed bytes the engine has already produced to the
    /// channel without finalizing the stream. Bytes the engine is still
    /// holding internally are *not* forced out, since doing so repeatedly would
    /// degrade the compression ratio.
    ///
    /// # Errors
    ///
    /// [`StreamError::WriteAfterFinal`] when the output was already
    /// finalized or the stream is closed, [`StreamError::Unallocated`] on a
    /// writable stream whose buffers were never allocated; otherwise
    /// propagates codec and downstream-write failures.
    pub fn sync(&mut self) -> Result<(), StreamError> {
        self.sync_impl(false)
    }

    /// Flushes remaining output (best effort), releases the channel, and
    /// resets positions, counters, and both codecs. Idempotent; the stream
    /// can be reopened afterwards.
    ///
    /// Close never raises: a flush failure at this point is logged and
    /// teardown completes anyway. Callers that must observe flush errors
    /// call [`final_flush`](Self::final_flush) first. No other stream state
    /// is preserved or cleared beyond what is listed here.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }

        if let Err(err) = self.final_flush() {
            warn!(error = %err, "flush during close failed; output may be truncated");
        }

        self.closed = true;
        self.read_pos = 0;
        self.write_pos = 0;
        self.in_zs.clear_to_empty(false);
        self.out_zs.clear_to_empty(false);
        // Dropping the channel is what flushes and closes a backing file.
        self.channel = None;
        self.handle = None;
        trace!("stream closed");
    }

    /// Returns the next plaintext byte without consuming it, refilling the
    /// decode buffer as needed. `None` at end of stream.
    ///
    /// # Errors
    ///
    /// Same conditions as [`fill_buf`](BufRead::fill_buf).
    pub fn peek(&mut self) -> io::Result<Option<u8>> {
        Ok(self.fill_buf()?.first().copied())
    }

    /// Reads and consumes a single plaintext byte. `None` at end of stream.
    ///
    /// # Errors
    ///
    /// Same conditions as [`fill_buf`](BufRead::fill_buf).
    pub fn get_byte(&mut self) -> io::Result<Option<u8>> {
        let next = self.fill_buf()?.first().copied();
        if next.is_some() {
            self.consume(1);
        }
        Ok(next)
    }

    /// Refill loop for the read path: pulls compressed bytes from the
    /// channel and steps the inflater until the plaintext buffer fills, at
    /// least one plaintext byte exists alongside a short channel read, or
    /// the channel reports end of input.
    ///
    /// Only called when the plaintext buffer is empty.
    fn refill_plain(&mut self) -> Result<(), StreamError> {
        let Some(channel) = self.channel.as_mut() else {
            // Closed stream: nothing to decode, callers observe end of
            // stream.
            return Ok(());
        };

        if self.in_zs.compressed_avail().is_empty() && self.in_zs.plain_avail().is_empty() {
            // Zero-capacity buffers: without this check the loop below would
            // break without touching the channel and the caller would see a
            // permanent, bogus end of stream.
            return Err(StreamError::Unallocated);
        }

        let mut hit_eof = false;

        loop {
            if self.in_zs.is_stream_end() {
                break;
            }

            let zspan = self.in_zs.compressed_avail();
            let mut read_n = None;
            if !zspan.is_empty() {
                let n = channel
                    .read(self.in_zs.compressed_avail_mut())
                    .map_err(StreamError::DownstreamReadFailed)?;
                self.in_zs.compressed_produce(zspan.prefix(n));
                read_n = Some(n);
            }

            self.in_zs.step()?;

            if self.in_zs.plain_avail().is_empty() {
                break;
            }
            match read_n {
                Some(0) => {
                    hit_eof = true;
                    break;
                }
                Some(n) if n < zspan.len() && !self.in_zs.plain_contents().is_empty() => break,
                _ => {}
            }
        }

        if hit_eof
            && self.in_zs.plain_contents().is_empty()
            && !self.in_zs.is_stream_end()
            && self.in_zs.n_in_total() > 0
        {
            // The channel ended mid-stream: a truncated gzip stream is a
            // data error, never a silent short read.
            return Err(StreamError::Codec(CodecError::CorruptedInput(
                "compressed stream ends before its trailer".into(),
            )));
        }

        trace!(
            plain = self.in_zs.plain_contents().len(),
            eof = hit_eof,
            "read-side refill"
        );
        Ok(())
    }

    /// Deflate-and-drain loop for the write path: hands the staged
    /// plaintext to the engine and commits every produced compressed chunk
    /// to the channel. With `final_flag` the engine flushes everything and
    /// emits the trailer; the stream then accepts no more writes.
    fn sync_impl(&mut self, final_flag: bool) -> Result<(), StreamError> {
        if self.final_flush_done || self.closed {
            return Err(StreamError::WriteAfterFinal);
        }
        if self.mode.is_write()
            && self.out_zs.plain_avail().is_empty()
            && self.out_zs.plain_contents().is_empty()
        {
            // Zero-capacity buffers: finalizing would fabricate an empty
            // output file instead of a gzip frame. Checked before the final
            // latch so the flush can be retried after alloc().
            return Err(StreamError::Unallocated);
        }
        if final_flag {
            self.final_flush_done = true;
        }
        if !self.mode.is_write() {
            // An input-only stream has nothing to commit; final_flush on it
            // still latches the flag above.
            return Ok(());
        }
        let Some(channel) = self.channel.as_mut() else {
            return Ok(());
        };

        loop {
            self.out_zs.step(final_flag)?;

            let zspan = self.out_zs.compressed_contents_span();
            if zspan.is_empty() {
                break;
            }

            let chunk = self.out_zs.compressed_contents();
            let written = channel
                .write(chunk)
                .map_err(StreamError::DownstreamWriteFailed)?;
            if written < chunk.len() {
                return Err(StreamError::DownstreamShortWrite {
                    attempted: chunk.len(),
                    written,
                });
            }
            self.out_zs.compressed_consume(zspan);
        }

        debug_assert!(
            self.out_zs.plain_contents().is_empty(),
            "refill must leave the staged plaintext fully consumed"
        );
        trace!(
            final_flag,
            compressed_out = self.total_compressed_out(),
            "write-side refill"
        );
        Ok(())
    }

    fn write_plain(&mut self, src: &[u8]) -> Result<usize, StreamError> {
        if self.final_flush_done || self.closed {
            return Err(StreamError::WriteAfterFinal);
        }
        if !self.mode.is_write() {
            return Err(StreamError::ModeMismatch(
                "write on a stream not opened for writing",
            ));
        }

        let mut rest = src;
        while !rest.is_empty() {
            let avail = self.out_zs.plain_avail();
            if avail.is_empty() {
                self.sync_impl(false)?;
                if self.out_zs.plain_avail().is_empty() {
                    return Err(StreamError::Unallocated);
                }
                continue;
            }

            let n = rest.len().min(avail.len());
            self.out_zs.plain_avail_mut()[..n].copy_from_slice(&rest[..n]);
            self.out_zs.plain_produce(avail.prefix(n));
            self.write_pos += n as u64;
            rest = &rest[n..];
        }

        Ok(src.len())
    }
}

impl Read for GzStream {
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let n = available.len().min(dst.len());
        dst[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}

impl BufRead for GzStream {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if !self.mode.is_read() {
            return Err(StreamError::ModeMismatch(
                "read on a stream not opened for reading",
            )
            .into());
        }
        if self.in_zs.plain_contents().is_empty() {
            self.refill_plain()?;
        }
        Ok(self.in_zs.plain_contents())
    }

    fn consume(&mut self, amt: usize) {
        let span = self.in_zs.plain_contents_span().prefix(amt);
        self.in_zs.plain_consume(span);
        self.read_pos += amt as u64;
    }
}

impl Write for GzStream {
    fn write(&mut self, src: &[u8]) -> io::Result<usize> {
        self.write_plain(src).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sync().map_err(io::Error::from)
    }
}

impl fmt::Debug for GzStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GzStream")
            .field("mode", &self.mode)
            .field("closed", &self.closed)
            .field("final_flush_done", &self.final_flush_done)
            .field("read_pos", &self.read_pos)
            .field("write_pos", &self.write_pos)
            .field("has_channel", &self.channel.is_some())
            .field("handle", &self.handle)
            .finish()
    }
}

impl Drop for GzStream {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn open_reader(frame: Vec<u8>) -> GzStream {
        GzStream::with_channel(
            GzStream::DEFAULT_BUF_SIZE,
            OpenMode::READ,
            Box::new(Cursor::new(frame)),
            None,
        )
    }

    #[test]
    fn new_stream_starts_closed() {
        let stream = GzStream::new(1024, OpenMode::READ);
        assert!(stream.is_closed());
        assert!(!stream.is_open());
        assert_eq!(stream.native_handle(), None);
    }

    #[test]
    fn adopt_channel_opens_and_close_is_idempotent() {
        let mut stream = GzStream::new(1024, OpenMode::WRITE);
        stream.adopt_channel(Box::new(Cursor::new(Vec::new())), None);
        assert!(stream.is_open());

        stream.close();
        assert!(stream.is_closed());
        stream.close();
        assert!(stream.is_closed());
    }

    #[test]
    fn read_on_write_only_stream_is_a_mode_mismatch() {
        let mut stream = GzStream::with_channel(
            1024,
            OpenMode::WRITE,
            Box::new(Cursor::new(Vec::new())),
            None,
        );
        let mut buf = [0u8; 4];
        let err = stream.read(&mut buf).expect_err("mode mismatch");
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }

    #[test]
    fn write_on_read_only_stream_is_a_mode_mismatch() {
        let mut stream = open_reader(Vec::new());
        let err = stream.write(b"nope").expect_err("mode mismatch");
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }

    #[test]
    fn write_after_final_flush_is_rejected() {
        let mut stream = GzStream::with_channel(
            1024,
            OpenMode::WRITE,
            Box::new(Cursor::new(Vec::new())),
            None,
        );
        stream.write_all(b"payload").expect("write");
        stream.final_flush().expect("final flush");
        assert!(stream.is_final_flushed());

        let err = stream.write(b"more").expect_err("write after final");
        let inner = err.get_ref().expect("source");
        assert!(matches!(
            inner.downcast_ref::<StreamError>(),
            Some(StreamError::WriteAfterFinal)
        ));
    }

    #[test]
    fn reading_a_closed_stream_reports_end_of_stream() {
        let mut stream = GzStream::new(1024, OpenMode::READ);
        let mut buf = [0u8; 8];
        assert_eq!(stream.read(&mut buf).expect("closed read"), 0);
    }

    #[test]
    fn empty_channel_reports_end_of_stream_not_an_error() {
        let mut stream = open_reader(Vec::new());
        let mut buf = [0u8; 8];
        assert_eq!(stream.read(&mut buf).expect("empty channel"), 0);
    }

    #[test]
    fn close_resets_positions_and_counters() {
        let mut stream = GzStream::with_channel(
            1024,
            OpenMode::WRITE,
            Box::new(Cursor::new(Vec::new())),
            None,
        );
        stream.write_all(b"some bytes").expect("write");
        assert_eq!(stream.tell_write(), 10);

        stream.close();
        assert_eq!(stream.tell_write(), 0);
        assert_eq!(stream.total_plain_out(), 0);
        assert_eq!(stream.total_compressed_out(), 0);
    }

    #[test]
    fn zero_length_write_is_a_no_op() {
        let mut stream = GzStream::with_channel(
            1024,
            OpenMode::WRITE,
            Box::new(Cursor::new(Vec::new())),
            None,
        );
        assert_eq!(stream.write(b"").expect("empty write"), 0);
        assert_eq!(stream.tell_write(), 0);
    }

    #[test]
    fn unallocated_write_stream_errors_instead_of_spinning() {
        let mut stream =
            GzStream::with_channel(0, OpenMode::WRITE, Box::new(Cursor::new(Vec::new())), None);
        let err = stream.write(b"x").expect_err("no buffer space");
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn unallocated_read_stream_errors_instead_of_reporting_eof() {
        // The channel has real bytes; a zero-capacity pipeline must not
        // pass them off as an empty stream.
        let mut stream = GzStream::with_channel(
            0,
            OpenMode::READ,
            Box::new(Cursor::new(vec![0x1f, 0x8b, 0x08])),
            None,
        );
        let mut buf = [0u8; 4];
        let err = stream.read(&mut buf).expect_err("no buffer space");
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

        let inner = err.get_ref().expect("structured source");
        assert!(matches!(
            inner.downcast_ref::<StreamError>(),
            Some(StreamError::Unallocated)
        ));
    }

    #[test]
    fn finalizing_an_unallocated_write_stream_errors() {
        let mut stream =
            GzStream::with_channel(0, OpenMode::WRITE, Box::new(Cursor::new(Vec::new())), None);
        let err = stream.final_flush().expect_err("no buffer space");
        assert!(matches!(err, StreamError::Unallocated));
        assert!(
            !stream.is_final_flushed(),
            "a failed finalization must stay retryable"
        );

        stream.alloc(1024);
        stream.final_flush().expect("finalize after alloc");
        assert!(stream.is_final_flushed());
    }
}
