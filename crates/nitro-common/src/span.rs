use std::ops::Range;

use serde::Serialize;

/// Byte-offset span into source text. Start is inclusive, end is exclusive.
///
/// Line/column information is derived on demand through [`LineIndex`];
/// diagnostics renderers consume spans as plain byte ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "span start ({start}) must be <= end ({end})");
        Self { start, end }
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `other` begins exactly where `self` ends.
    ///
    /// Route paths are written without blanks, so the parser uses this to
    /// tell `/users/{id}` apart from `/users /{id}`.
    pub fn touches(&self, other: Span) -> bool {
        self.end == other.start
    }

    /// Byte range suitable for report labels. Empty spans are widened to one
    /// byte so a caret still has something to point at.
    pub fn to_range(&self) -> Range<usize> {
        let start = self.start as usize;
        start..(self.end as usize).max(start + 1)
    }
}

/// Pre-computed line starts for (line, column) lookup.
#[derive(Debug)]
pub struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(
                source
                    .bytes()
                    .enumerate()
                    .filter(|&(_, b)| b == b'\n')
                    .map(|(i, _)| (i + 1) as u32),
            )
            .collect();
        Self { line_starts }
    }

    /// Convert a byte offset to a 1-based (line, column) pair.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let line_idx = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let col = offset - self.line_starts[line_idx] + 1;
        (line_idx as u32 + 1, col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_len_and_empty() {
        let span = Span::new(5, 10);
        assert_eq!(span.len(), 5);
        assert!(!span.is_empty());
        assert!(Span::new(3, 3).is_empty());
    }

    #[test]
    fn adjacent_spans_touch() {
        assert!(Span::new(0, 1).touches(Span::new(1, 6)));
        assert!(!Span::new(0, 1).touches(Span::new(2, 6)));
    }

    #[test]
    fn empty_span_range_is_widened() {
        assert_eq!(Span::new(4, 4).to_range(), 4..5);
        assert_eq!(Span::new(4, 9).to_range(), 4..9);
    }

    #[test]
    fn line_index_multiple_lines() {
        let idx = LineIndex::new("get /\n{\n  x\n}");
        assert_eq!(idx.line_col(0), (1, 1));
        assert_eq!(idx.line_col(6), (2, 1));
        assert_eq!(idx.line_col(10), (3, 3));
    }

    #[test]
    fn line_index_newline_belongs_to_its_line() {
        let idx = LineIndex::new("ab\ncd");
        assert_eq!(idx.line_col(2), (1, 3));
        assert_eq!(idx.line_col(3), (2, 1));
    }
}
