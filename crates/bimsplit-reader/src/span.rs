//! Byte-offset spans into the source file.

use std::ops::Range;

/// A half-open byte range into the source text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Span(Range<usize>);

impl Span {
    /// Creates a span from a byte range.
    pub fn new(range: Range<usize>) -> Self {
        Self(range)
    }

    /// Returns the start offset.
    pub fn start(&self) -> usize {
        self.0.start
    }

    /// Returns the end offset.
    pub fn end(&self) -> usize {
        self.0.end
    }

    /// Returns the span length in bytes.
    pub fn len(&self) -> usize {
        self.0.end.saturating_sub(self.0.start)
    }

    /// Returns whether the span is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self(range)
    }
}
