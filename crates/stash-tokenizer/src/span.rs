//! Byte ranges in the input stream.

/// Byte offsets `[start, end)` of a token or node in the decoded stream.
///
/// Offsets count bytes of the UTF-8 input, not characters, so they can be
/// used directly to slice the source or to label it in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    #[inline]
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// A zero-width span, e.g. for the end of the stream.
    #[inline]
    pub fn empty(at: u32) -> Self {
        Self::new(at, at)
    }

    /// From the start of `self` to the end of `last`.
    ///
    /// Used to cover a whole block, from its opening keyword to its closing brace.
    #[inline]
    pub fn to(self, last: Span) -> Span {
        Span::new(self.start.min(last.start), last.end.max(self.end))
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }
}

impl From<Span> for std::ops::Range<usize> {
    fn from(span: Span) -> Self {
        span.start as usize..span.end as usize
    }
}
