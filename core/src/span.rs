//! Source position tracking.

use serde::{Deserialize, Serialize};

/// A byte-exact region of the original source, carried by every token,
/// AST node, and diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
    /// 0-based byte offset into the (already `\r\n`-normalized) source.
    pub offset: u32,
    /// Length in bytes.
    pub length: u32,
}

impl Span {
    pub fn new(line: u32, column: u32, offset: u32, length: u32) -> Self {
        Self {
            line,
            column,
            offset,
            length,
        }
    }

    /// A zero-length span at the given position, used for synthetic nodes
    /// (e.g. `Unknown` recovery) that still need a reportable location.
    pub fn point(line: u32, column: u32, offset: u32) -> Self {
        Self::new(line, column, offset, 0)
    }

    pub fn end_offset(&self) -> u32 {
        self.offset + self.length
    }

    /// Merge two spans from the same source into the smallest span
    /// covering both.
    pub fn merge(&self, other: &Span) -> Span {
        let (start, start_line, start_col) = if self.offset <= other.offset {
            (self.offset, self.line, self.column)
        } else {
            (other.offset, other.line, other.column)
        };
        let end = self.end_offset().max(other.end_offset());
        Span::new(start_line, start_col, start, end - start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_takes_earliest_start_and_latest_end() {
        let a = Span::new(1, 5, 4, 3);
        let b = Span::new(1, 1, 0, 4);
        let merged = a.merge(&b);
        assert_eq!(merged.offset, 0);
        assert_eq!(merged.length, 7);
        assert_eq!(merged.line, 1);
        assert_eq!(merged.column, 1);
    }

    #[test]
    fn point_span_has_zero_length() {
        let p = Span::point(3, 2, 10);
        assert_eq!(p.length, 0);
        assert_eq!(p.end_offset(), 10);
    }
}
