//! Fixed-capacity byte buffer with a single contiguous occupied region.
//!
//! ```text
//!   +------------------------------------------+
//!   |  |  ...  |  | X|  ... | X|  |    ...  |  |
//!   +------------------------------------------+
//!    ^             ^            ^              ^
//!    0             lo_pos       hi_pos         capacity
//! ```
//!
//! Bytes are appended at `hi_pos` ([`Buffer::produce`]) and removed from
//! `lo_pos` ([`Buffer::consume`]); content never wraps. Whenever the occupied
//! region drains completely, both indices snap back to zero so the full
//! capacity becomes writable again. The codec pipeline relies on that
//! compact-on-empty step to recycle buffer space without ever moving bytes.

use crate::span::Span;

/// Exclusive owner of a fixed-capacity byte block with occupied region
/// `[lo_pos, hi_pos)`.
///
/// A buffer constructed with capacity 0 is a valid placeholder; give it
/// storage later with [`alloc`](Self::alloc) or
/// [`replace_storage`](Self::replace_storage).
#[derive(Debug, Default)]
pub struct Buffer {
    buf: Vec<u8>,
    lo_pos: usize,
    hi_pos: usize,
}

impl Buffer {
    /// Creates a buffer owning `capacity` zeroed bytes.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity],
            lo_pos: 0,
            hi_pos: 0,
        }
    }

    /// Discards any existing storage and contents, then owns `capacity`
    /// fresh zeroed bytes.
    pub fn alloc(&mut self, capacity: usize) {
        self.buf = vec![0; capacity];
        self.lo_pos = 0;
        self.hi_pos = 0;
    }

    /// Adopts caller-supplied storage, discarding any existing storage and
    /// contents. The new capacity is `storage.len()`.
    ///
    /// Returns the previous storage so callers pinning their own allocations
    /// can recover it.
    pub fn replace_storage(&mut self, storage: Vec<u8>) -> Vec<u8> {
        self.lo_pos = 0;
        self.hi_pos = 0;
        std::mem::replace(&mut self.buf, storage)
    }

    /// Total capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Lower bound of the occupied region.
    #[must_use]
    pub fn lo_pos(&self) -> usize {
        self.lo_pos
    }

    /// Upper bound of the occupied region.
    #[must_use]
    pub fn hi_pos(&self) -> usize {
        self.hi_pos
    }

    /// `true` iff no bytes are buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lo_pos == self.hi_pos
    }

    /// The buffered bytes, `[lo_pos, hi_pos)`.
    #[must_use]
    pub fn contents(&self) -> &[u8] {
        &self.buf[self.lo_pos..self.hi_pos]
    }

    /// The occupied region as a [`Span`] of buffer indices.
    #[must_use]
    pub fn contents_span(&self) -> Span {
        Span::new(self.lo_pos, self.hi_pos)
    }

    /// The writable tail, `[hi_pos, capacity)`.
    #[must_use]
    pub fn avail_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.hi_pos..]
    }

    /// The writable region as a [`Span`] of buffer indices.
    #[must_use]
    pub fn avail_span(&self) -> Span {
        Span::new(self.hi_pos, self.buf.len())
    }

    /// Marks `span` as occupied. The caller must already have written the
    /// bytes through [`avail_mut`](Self::avail_mut).
    ///
    /// # Panics
    ///
    /// Panics unless `span` is a prefix of [`avail_span`](Self::avail_span):
    /// appends must start exactly at `hi_pos` and stay within capacity.
    pub fn produce(&mut self, span: Span) {
        assert_eq!(
            span.lo(),
            self.hi_pos,
            "produce must start at hi_pos ({})",
            self.hi_pos
        );
        assert!(
            span.hi() <= self.buf.len(),
            "produce past capacity ({} > {})",
            span.hi(),
            self.buf.len()
        );
        self.hi_pos = span.hi();
    }

    /// Releases `span` from the front of the occupied region.
    ///
    /// An empty span is accepted regardless of its position; it still
    /// triggers the empty-buffer reset below, so callers may pass a span
    /// captured before an earlier reset.
    ///
    /// Whenever the buffer drains, both indices reset to 0 and the full
    /// capacity becomes writable again.
    ///
    /// # Panics
    ///
    /// Panics when a non-empty `span` is not a prefix of
    /// [`contents_span`](Self::contents_span).
    pub fn consume(&mut self, span: Span) {
        if !span.is_empty() {
            assert_eq!(
                span.lo(),
                self.lo_pos,
                "consume must start at lo_pos ({})",
                self.lo_pos
            );
            assert!(
                span.hi() <= self.hi_pos,
                "consume past hi_pos ({} > {})",
                span.hi(),
                self.hi_pos
            );
            self.lo_pos = span.hi();
        }

        if self.lo_pos == self.hi_pos {
            self.lo_pos = 0;
            self.hi_pos = 0;
        }
    }

    /// Empties the buffer without releasing storage. With `zero` set the
    /// whole block is overwritten with zeroes first (plain scrubbing; no
    /// stronger guarantee intended).
    pub fn clear_to_empty(&mut self, zero: bool) {
        if zero {
            self.buf.fill(0);
        }
        self.lo_pos = 0;
        self.hi_pos = 0;
    }
}
