//! Streaming decompression: the raw engine session and its buffered form.

use flate2::{Decompress, FlushDecompress, Status};

use crate::buffer::Buffer;
use crate::error::CodecError;
use crate::session::{StepOutcome, GZIP_WINDOW_BITS};
use crate::span::Span;

/// How the compressed stream is framed, decided from its first byte.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Framing {
    Gzip,
    Zlib,
}

/// Thin wrapper around one native inflate control block that accepts either
/// gzip-framed or zlib-framed DEFLATE input.
///
/// The engine itself must be told the framing up front, so the session defers
/// the choice until the first input byte arrives: `0x1f` is the gzip magic
/// and cannot open a zlib stream, whose leading CMF byte always carries
/// method 8 in its low nibble. The matching engine is installed before any
/// byte is consumed, which reproduces the auto-detect inflate mode of zlib
/// proper.
///
/// The engine state is boxed for the same reason as in
/// [`DeflateSession`](crate::deflate::DeflateSession): the control block must
/// not be bitwise relocated, so only the box pointer moves.
#[derive(Debug)]
pub struct InflateSession {
    engine: Box<Decompress>,
    framing: Option<Framing>,
    stream_end: bool,
}

impl InflateSession {
    /// Creates a session; the gzip/zlib decision is made on the first input
    /// byte.
    ///
    /// # Panics
    ///
    /// Panics if the engine cannot initialise (allocation failure inside the
    /// engine); initialisation errors do not surface as values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            engine: Box::new(Decompress::new_gzip(GZIP_WINDOW_BITS)),
            framing: None,
            stream_end: false,
        }
    }

    /// Runs the engine once over the supplied windows.
    ///
    /// `input` is pending compressed data; `output` is writable space for
    /// decompressed bytes. Once the stream's terminal trailer has been
    /// verified, further steps move nothing and any input beyond the trailer
    /// is left untouched.
    ///
    /// # Errors
    ///
    /// - [`CodecError::CorruptedInput`] for malformed input, a failed
    ///   trailer check, or a stream demanding a preset dictionary.
    /// - [`CodecError::EngineOom`] when the engine runs out of memory.
    pub fn step(&mut self, input: &[u8], output: &mut [u8]) -> Result<StepOutcome, CodecError> {
        if self.stream_end {
            return Ok(StepOutcome {
                stream_end: true,
                ..StepOutcome::default()
            });
        }

        if self.framing.is_none() {
            match input.first() {
                Some(&0x1f) => self.framing = Some(Framing::Gzip),
                Some(_) => {
                    self.engine = Box::new(Decompress::new(true));
                    self.framing = Some(Framing::Zlib);
                }
                // No input yet; keep deferring.
                None => {}
            }
        }

        let before_in = self.engine.total_in();
        let before_out = self.engine.total_out();

        let status = self
            .engine
            .decompress(input, output, FlushDecompress::None)
            .map_err(CodecError::from_inflate)?;

        if status == Status::StreamEnd {
            self.stream_end = true;
        }

        Ok(StepOutcome {
            consumed: (self.engine.total_in() - before_in) as usize,
            produced: (self.engine.total_out() - before_out) as usize,
            stream_end: self.stream_end,
        })
    }

    /// `true` once the stream's terminal trailer has been consumed and
    /// verified.
    #[must_use]
    pub fn is_stream_end(&self) -> bool {
        self.stream_end
    }

    /// Compressed bytes consumed since creation or the last
    /// [`rebuild`](Self::rebuild).
    #[must_use]
    pub fn n_in_total(&self) -> u64 {
        self.engine.total_in()
    }

    /// Decompressed bytes produced since creation or the last
    /// [`rebuild`](Self::rebuild).
    #[must_use]
    pub fn n_out_total(&self) -> u64 {
        self.engine.total_out()
    }

    /// Tears the engine down and reinitialises it in place, resetting the
    /// counters and re-arming framing detection.
    pub fn rebuild(&mut self) {
        self.engine = Box::new(Decompress::new_gzip(GZIP_WINDOW_BITS));
        self.framing = None;
        self.stream_end = false;
    }
}

impl Default for InflateSession {
    fn default() -> Self {
        Self::new()
    }
}

/// An [`InflateSession`] bundled with owned compressed-side and
/// plaintext-side buffers.
///
/// Callers pull compressed bytes from upstream into
/// [`compressed_avail_mut`](Self::compressed_avail_mut), announce them with
/// [`compressed_produce`](Self::compressed_produce), run
/// [`step`](Self::step), and take decompressed bytes from
/// [`plain_contents`](Self::plain_contents), releasing them with
/// [`plain_consume`](Self::plain_consume). Between public calls the
/// session's pending input is exactly the compressed buffer's contents and
/// its output window is the plaintext buffer's writable tail.
#[derive(Debug)]
pub struct BufferedInflate {
    z_buf: Buffer,
    session: InflateSession,
    plain_buf: Buffer,
}

impl BufferedInflate {
    /// Default size for each of the two buffers (64 KiB).
    pub const DEFAULT_BUF_SIZE: usize = 64 * 1024;

    /// Creates a buffered inflate stream with two buffers of `buf_size`
    /// bytes. Pass 0 to defer allocation to [`alloc`](Self::alloc).
    #[must_use]
    pub fn new(buf_size: usize) -> Self {
        Self {
            z_buf: Buffer::new(buf_size),
            session: InflateSession::new(),
            plain_buf: Buffer::new(buf_size),
        }
    }

    /// Allocates (or reallocates) both buffers. Existing contents are
    /// discarded; intended only before decompression work begins.
    pub fn alloc(&mut self, buf_size: usize) {
        self.z_buf.alloc(buf_size);
        self.plain_buf.alloc(buf_size);
    }

    /// Resets to the freshly-constructed state without releasing buffer
    /// storage: both buffers empty, engine rebuilt, counters zeroed. With
    /// `zero` set the buffer blocks are scrubbed as well.
    pub fn clear_to_empty(&mut self, zero: bool) {
        self.z_buf.clear_to_empty(zero);
        self.plain_buf.clear_to_empty(zero);
        self.session.rebuild();
    }

    /// Compressed bytes consumed by the engine since the last reset.
    #[must_use]
    pub fn n_in_total(&self) -> u64 {
        self.session.n_in_total()
    }

    /// Decompressed bytes produced by the engine since the last reset.
    #[must_use]
    pub fn n_out_total(&self) -> u64 {
        self.session.n_out_total()
    }

    /// `true` once the stream's terminal trailer has been verified.
    #[must_use]
    pub fn is_stream_end(&self) -> bool {
        self.session.is_stream_end()
    }

    /// Writable space in the compressed buffer, as buffer indices.
    #[must_use]
    pub fn compressed_avail(&self) -> Span {
        self.z_buf.avail_span()
    }

    /// Writable space in the compressed buffer. Fill a prefix from
    /// upstream, then announce it with
    /// [`compressed_produce`](Self::compressed_produce).
    #[must_use]
    pub fn compressed_avail_mut(&mut self) -> &mut [u8] {
        self.z_buf.avail_mut()
    }

    /// Announces that `span.len()` new compressed bytes were written at the
    /// start of [`compressed_avail`](Self::compressed_avail).
    ///
    /// # Panics
    ///
    /// Panics unless `span` is a prefix of the current compressed avail
    /// region.
    pub fn compressed_produce(&mut self, span: Span) {
        if !span.is_empty() {
            self.z_buf.produce(span);
        }
    }

    /// Writable space remaining in the plaintext buffer, as buffer indices.
    #[must_use]
    pub fn plain_avail(&self) -> Span {
        self.plain_buf.avail_span()
    }

    /// Decompressed bytes ready for the caller. Consuming at least one byte
    /// when this is non-empty keeps the engine's progress guarantee alive.
    #[must_use]
    pub fn plain_contents(&self) -> &[u8] {
        self.plain_buf.contents()
    }

    /// The decompressed contents as buffer indices.
    #[must_use]
    pub fn plain_contents_span(&self) -> Span {
        self.plain_buf.contents_span()
    }

    /// Releases a consumed prefix of the decompressed contents. Drained
    /// space becomes part of the engine's output window again once the
    /// buffer empties.
    ///
    /// # Panics
    ///
    /// Panics unless `span` is a prefix of the current plaintext contents.
    pub fn plain_consume(&mut self, span: Span) {
        self.plain_buf.consume(span);
    }

    /// Releases all buffered decompressed output.
    pub fn plain_consume_all(&mut self) {
        self.plain_buf.consume(self.plain_buf.contents_span());
    }

    /// Runs the engine once over the buffered compressed input and the
    /// plaintext buffer's writable space, advancing both buffers by what
    /// the engine actually moved. Returns the number of plaintext bytes
    /// appended.
    ///
    /// Unlike the deflate side this never short-circuits on empty input:
    /// the engine may still hold decodable state from a step whose output
    /// window filled up.
    ///
    /// # Errors
    ///
    /// Propagates [`CodecError`] from the underlying session.
    pub fn step(&mut self) -> Result<usize, CodecError> {
        let outcome = self
            .session
            .step(self.z_buf.contents(), self.plain_buf.avail_mut())?;

        let consumed = self.z_buf.contents_span().prefix(outcome.consumed);
        self.z_buf.consume(consumed);
        let produced = self.plain_buf.avail_span().prefix(outcome.produced);
        self.plain_buf.produce(produced);

        Ok(outcome.produced)
    }
}

/// Decompresses a complete gzip- or zlib-framed buffer in one call.
///
/// # Errors
///
/// [`CodecError::CorruptedInput`] when `input` is malformed or stops before
/// the stream's terminal trailer (a truncated stream is a data error, not a
/// short success).
pub fn decompress_to_vec(input: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut zs = BufferedInflate::new(BufferedInflate::DEFAULT_BUF_SIZE);
    let mut out = Vec::new();
    let mut rest = input;

    loop {
        let avail = zs.compressed_avail();
        let n = rest.len().min(avail.len());
        zs.compressed_avail_mut()[..n].copy_from_slice(&rest[..n]);
        zs.compressed_produce(avail.prefix(n));
        rest = &rest[n..];

        loop {
            let produced = zs.step()?;
            out.extend_from_slice(zs.plain_contents());
            zs.plain_consume_all();
            if produced == 0 {
                break;
            }
        }

        if rest.is_empty() || zs.is_stream_end() {
            break;
        }
    }

    if zs.is_stream_end() {
        Ok(out)
    } else {
        Err(CodecError::CorruptedInput(
            "compressed stream ends before its trailer".into(),
        ))
    }
}
