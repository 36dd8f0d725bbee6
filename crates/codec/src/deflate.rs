//! Streaming gzip compression: the raw engine session and its buffered form.

use flate2::{Compress, Compression, FlushCompress, Status};

use crate::buffer::Buffer;
use crate::error::CodecError;
use crate::session::{StepOutcome, GZIP_WINDOW_BITS};
use crate::span::Span;

/// Thin wrapper around one native deflate control block, configured to emit
/// gzip framing (RFC 1952 header and CRC32 trailer) around the compressed
/// stream.
///
/// The engine state is boxed: the control block must never be bitwise
/// relocated once initialised, so moving the session moves only the box
/// pointer. The session is deliberately not [`Clone`].
///
/// Callers own the input and output storage and pass the current windows to
/// every [`step`](Self::step) call; exclusive borrows guarantee that
/// unconsumed input can never be silently dropped between steps. See
/// [`BufferedDeflate`] for the variant that manages the windows itself.
#[derive(Debug)]
pub struct DeflateSession {
    engine: Box<Compress>,
    stream_end: bool,
}

impl DeflateSession {
    /// Creates a session with default compression level and gzip framing.
    ///
    /// # Panics
    ///
    /// Panics if the engine cannot initialise (allocation failure inside the
    /// engine); initialisation errors do not surface as values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            engine: Box::new(Compress::new_gzip(Compression::default(), GZIP_WINDOW_BITS)),
            stream_end: false,
        }
    }

    /// Runs the engine once over the supplied windows.
    ///
    /// `input` is the pending plaintext; `output` is writable space for
    /// compressed bytes. With `final_flag` set the engine is told the
    /// plaintext stream is complete and flushes everything it holds,
    /// finishing with the gzip trailer. Ideally the flag is raised exactly
    /// once, on the last step of the stream; raising it earlier costs
    /// compression ratio but stays correct.
    ///
    /// After the trailer has been emitted further steps move nothing.
    ///
    /// Progress guarantee (inherited from DEFLATE): as long as each call
    /// either offers at least one new input byte, removes at least one
    /// output byte, or raises `final_flag`, a sequence of steps terminates
    /// with all input consumed and the trailer produced.
    ///
    /// # Errors
    ///
    /// [`CodecError::EngineBug`] when the engine rejects its own state.
    pub fn step(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        final_flag: bool,
    ) -> Result<StepOutcome, CodecError> {
        if self.stream_end {
            return Ok(StepOutcome {
                stream_end: true,
                ..StepOutcome::default()
            });
        }

        let flush = if final_flag {
            FlushCompress::Finish
        } else {
            FlushCompress::None
        };

        let before_in = self.engine.total_in();
        let before_out = self.engine.total_out();

        let status = self
            .engine
            .compress(input, output, flush)
            .map_err(CodecError::from_deflate)?;

        if status == Status::StreamEnd {
            self.stream_end = true;
        }

        Ok(StepOutcome {
            consumed: (self.engine.total_in() - before_in) as usize,
            produced: (self.engine.total_out() - before_out) as usize,
            stream_end: self.stream_end,
        })
    }

    /// `true` once the gzip trailer has been emitted.
    #[must_use]
    pub fn is_stream_end(&self) -> bool {
        self.stream_end
    }

    /// Plaintext bytes consumed since creation or the last
    /// [`rebuild`](Self::rebuild).
    #[must_use]
    pub fn n_in_total(&self) -> u64 {
        self.engine.total_in()
    }

    /// Compressed bytes produced since creation or the last
    /// [`rebuild`](Self::rebuild).
    #[must_use]
    pub fn n_out_total(&self) -> u64 {
        self.engine.total_out()
    }

    /// Tears the engine down and reinitialises it in place, resetting both
    /// counters. The session object keeps its identity so owners can reuse
    /// attached buffers.
    pub fn rebuild(&mut self) {
        self.engine = Box::new(Compress::new_gzip(Compression::default(), GZIP_WINDOW_BITS));
        self.stream_end = false;
    }
}

impl Default for DeflateSession {
    fn default() -> Self {
        Self::new()
    }
}

/// A [`DeflateSession`] bundled with owned plaintext-side and
/// compressed-side buffers.
///
/// Steady-state operation performs no allocation: callers stage plaintext
/// into [`plain_avail_mut`](Self::plain_avail_mut), announce it with
/// [`plain_produce`](Self::plain_produce), run [`step`](Self::step), and
/// drain [`compressed_contents`](Self::compressed_contents) with
/// [`compressed_consume`](Self::compressed_consume). Between public calls
/// the session's pending input is exactly the plaintext buffer's contents
/// and its output window is the compressed buffer's writable tail.
#[derive(Debug)]
pub struct BufferedDeflate {
    plain_buf: Buffer,
    session: DeflateSession,
    z_buf: Buffer,
}

impl BufferedDeflate {
    /// Default size for each of the two buffers (64 KiB).
    pub const DEFAULT_BUF_SIZE: usize = 64 * 1024;

    /// Creates a buffered deflate stream with two buffers of `buf_size`
    /// bytes. Pass 0 to defer allocation to [`alloc`](Self::alloc).
    #[must_use]
    pub fn new(buf_size: usize) -> Self {
        Self {
            plain_buf: Buffer::new(buf_size),
            session: DeflateSession::new(),
            z_buf: Buffer::new(buf_size),
        }
    }

    /// Allocates (or reallocates) both buffers. Existing contents are
    /// discarded; intended only before compression work begins.
    pub fn alloc(&mut self, buf_size: usize) {
        self.plain_buf.alloc(buf_size);
        self.z_buf.alloc(buf_size);
    }

    /// Resets to the freshly-constructed state without releasing buffer
    /// storage: both buffers empty, engine rebuilt, counters zeroed. With
    /// `zero` set the buffer blocks are scrubbed as well.
    pub fn clear_to_empty(&mut self, zero: bool) {
        self.plain_buf.clear_to_empty(zero);
        self.z_buf.clear_to_empty(zero);
        self.session.rebuild();
    }

    /// Plaintext bytes consumed by the engine since the last reset.
    #[must_use]
    pub fn n_in_total(&self) -> u64 {
        self.session.n_in_total()
    }

    /// Compressed bytes produced by the engine since the last reset.
    #[must_use]
    pub fn n_out_total(&self) -> u64 {
        self.session.n_out_total()
    }

    /// `true` once the final gzip trailer has been produced.
    #[must_use]
    pub fn is_stream_end(&self) -> bool {
        self.session.is_stream_end()
    }

    /// Writable space in the plaintext buffer, as buffer indices.
    #[must_use]
    pub fn plain_avail(&self) -> Span {
        self.plain_buf.avail_span()
    }

    /// Writable space in the plaintext buffer. Fill a prefix, then announce
    /// it with [`plain_produce`](Self::plain_produce).
    #[must_use]
    pub fn plain_avail_mut(&mut self) -> &mut [u8] {
        self.plain_buf.avail_mut()
    }

    /// Plaintext staged for compression and not yet consumed by the engine.
    #[must_use]
    pub fn plain_contents(&self) -> &[u8] {
        self.plain_buf.contents()
    }

    /// Announces that `span.len()` new plaintext bytes were written at the
    /// start of [`plain_avail`](Self::plain_avail).
    ///
    /// # Panics
    ///
    /// Panics unless `span` is a prefix of the current plaintext avail
    /// region.
    pub fn plain_produce(&mut self, span: Span) {
        if !span.is_empty() {
            self.plain_buf.produce(span);
        }
    }

    /// Compressed bytes ready to be drained. Consuming at least one byte
    /// when this is non-empty keeps the engine's progress guarantee alive.
    #[must_use]
    pub fn compressed_contents(&self) -> &[u8] {
        self.z_buf.contents()
    }

    /// The compressed contents as buffer indices.
    #[must_use]
    pub fn compressed_contents_span(&self) -> Span {
        self.z_buf.contents_span()
    }

    /// Releases a consumed prefix of the compressed contents. Drained space
    /// becomes part of the engine's output window again once the buffer
    /// empties.
    ///
    /// # Panics
    ///
    /// Panics unless `span` is a prefix of the current compressed contents.
    pub fn compressed_consume(&mut self, span: Span) {
        self.z_buf.consume(span);
    }

    /// Releases all buffered compressed output.
    pub fn compressed_consume_all(&mut self) {
        self.z_buf.consume(self.z_buf.contents_span());
    }

    /// Runs the engine once over the staged plaintext and the compressed
    /// buffer's writable space, advancing both buffers by what the engine
    /// actually moved. Returns the number of compressed bytes appended.
    ///
    /// A step with no staged plaintext and `final_flag` unset is a no-op.
    ///
    /// # Errors
    ///
    /// Propagates [`CodecError`] from the underlying session.
    pub fn step(&mut self, final_flag: bool) -> Result<usize, CodecError> {
        if self.plain_buf.is_empty() && !final_flag {
            return Ok(0);
        }

        let outcome = self.session.step(
            self.plain_buf.contents(),
            self.z_buf.avail_mut(),
            final_flag,
        )?;

        let consumed = self.plain_buf.contents_span().prefix(outcome.consumed);
        self.plain_buf.consume(consumed);
        let produced = self.z_buf.avail_span().prefix(outcome.produced);
        self.z_buf.produce(produced);

        Ok(outcome.produced)
    }
}

/// Compresses `input` into a fresh gzip frame in one call.
///
/// # Errors
///
/// Propagates [`CodecError`] from the engine; with well-formed session
/// bookkeeping compression itself cannot fail on any input.
pub fn compress_to_vec(input: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut zs = BufferedDeflate::new(BufferedDeflate::DEFAULT_BUF_SIZE);
    let mut out = Vec::new();
    let mut rest = input;

    loop {
        let avail = zs.plain_avail();
        let n = rest.len().min(avail.len());
        zs.plain_avail_mut()[..n].copy_from_slice(&rest[..n]);
        zs.plain_produce(avail.prefix(n));
        rest = &rest[n..];

        let final_flag = rest.is_empty();
        loop {
            zs.step(final_flag)?;
            let span = zs.compressed_contents_span();
            if span.is_empty() {
                break;
            }
            out.extend_from_slice(zs.compressed_contents());
            zs.compressed_consume(span);
        }

        if rest.is_empty() {
            return Ok(out);
        }
    }
}
