//! Pieces shared by the deflate and inflate session wrappers.

/// Byte movement reported by a single engine step.
///
/// `consumed` bytes were taken from the front of the input window and
/// `produced` bytes were appended to the output window. Either count may be
/// zero; a step that moves nothing on both sides signals that the engine
/// needs more of one side before it can continue.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StepOutcome {
    /// Input bytes the engine consumed during this step.
    pub consumed: usize,
    /// Output bytes the engine produced during this step.
    pub produced: usize,
    /// `true` once the engine has seen the stream's terminal trailer
    /// (inflate) or emitted it (deflate with the final flag).
    pub stream_end: bool,
}

/// zlib window size used on both sides: the full 32 KiB history window.
pub(crate) const GZIP_WINDOW_BITS: u8 = 15;
