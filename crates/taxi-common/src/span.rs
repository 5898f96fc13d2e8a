use std::ops::Range;

use serde::Serialize;

/// Byte-offset span into a source text. `start` is inclusive, `end` exclusive.
///
/// The compiler tracks every position as a byte offset into the source it
/// came from. Line/column pairs are derived on demand through [`LineIndex`]
/// when a diagnostic is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "span start ({start}) must be <= end ({end})");
        Self { start, end }
    }

    /// A zero-length span at `offset`.
    pub fn empty_at(offset: u32) -> Self {
        Self::new(offset, offset)
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest span covering both `self` and `other`.
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// The span as a `usize` range, suitable for slicing or for ariadne labels.
    pub fn to_range(self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl From<Range<u32>> for Span {
    fn from(range: Range<u32>) -> Self {
        Span::new(range.start, range.end)
    }
}

/// Line start offsets of one source text, for offset to line/column lookup.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset at which each line begins. Always starts with 0.
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(
                source
                    .bytes()
                    .enumerate()
                    .filter(|(_, b)| *b == b'\n')
                    .map(|(i, _)| (i + 1) as u32),
            )
            .collect();
        Self { line_starts }
    }

    /// Convert a byte offset into a 1-based `(line, column)` pair.
    ///
    /// Columns count bytes from the start of the line.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        // partition_point yields the first line starting after `offset`.
        let line_idx = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let line = line_idx as u32 + 1;
        let col = offset - self.line_starts[line_idx] + 1;
        (line, col)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_len_and_empty() {
        let span = Span::new(4, 9);
        assert_eq!(span.len(), 5);
        assert!(!span.is_empty());
        assert!(Span::empty_at(7).is_empty());
    }

    #[test]
    fn span_merge_covers_both() {
        let merged = Span::new(10, 12).merge(Span::new(3, 11));
        assert_eq!(merged, Span::new(3, 12));
    }

    #[test]
    fn span_to_range() {
        assert_eq!(Span::new(2, 6).to_range(), 2..6);
    }

    #[test]
    fn line_index_first_line() {
        let idx = LineIndex::new("type Foo");
        assert_eq!(idx.line_col(0), (1, 1));
        assert_eq!(idx.line_col(5), (1, 6));
    }

    #[test]
    fn line_index_later_lines() {
        let idx = LineIndex::new("type A {}\ntype B {\n  b : A\n}");
        assert_eq!(idx.line_col(10), (2, 1));
        // `b` on the third line, after two spaces of indentation
        assert_eq!(idx.line_col(21), (3, 3));
        assert_eq!(idx.line_count(), 4);
    }

    #[test]
    fn line_index_newline_belongs_to_its_line() {
        let idx = LineIndex::new("ab\ncd");
        assert_eq!(idx.line_col(2), (1, 3));
        assert_eq!(idx.line_col(3), (2, 1));
    }
}
