use serde::Serialize;
use std::ops::Range;

/// Position in a document as the host addresses it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    /// Line number (0-indexed)
    pub line: usize,
    /// Column number (0-indexed, in characters)
    pub column: usize,
}

/// Half-open character range on a single line
///
/// Invariant: `start <= end <= ` the line's length in characters, and `line`
/// is a valid index into the document's lines at the time it was computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    /// Line index (0-indexed)
    pub line: usize,
    /// Starting column (inclusive)
    pub start: usize,
    /// Ending column (exclusive)
    pub end: usize,
}

impl Span {
    pub fn new(line: usize, start: usize, end: usize) -> Self {
        Self { line, start, end }
    }

    pub fn start(&self) -> Position {
        Position { line: self.line, column: self.start }
    }

    pub fn end(&self) -> Position {
        Position { line: self.line, column: self.end }
    }

    /// Number of characters covered
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert the span to absolute byte offsets into `content`
    ///
    /// Lines are delimited by `\n`. Returns `None` when the line does not
    /// exist or a column lies past the end of the line.
    pub fn byte_range(&self, content: &str) -> Option<Range<usize>> {
        if self.start > self.end {
            return None;
        }

        let mut line_start = 0;
        for (index, line) in content.split('\n').enumerate() {
            if index == self.line {
                let start = column_to_byte(line, self.start)?;
                let end = column_to_byte(line, self.end)?;
                return Some(line_start + start..line_start + end);
            }
            line_start += line.len() + 1; // +1 for newline
        }

        None
    }
}

/// Convert a character column to a byte offset within `line`
///
/// The column equal to the line's character count maps to `line.len()`.
pub fn column_to_byte(line: &str, column: usize) -> Option<usize> {
    if column == 0 {
        return Some(0);
    }
    match line.char_indices().nth(column) {
        Some((byte, _)) => Some(byte),
        None if line.chars().count() == column => Some(line.len()),
        None => None,
    }
}

/// Convert a byte offset within `line` to a character column
///
/// Offsets inside a multi-byte character count the characters that start
/// before them.
pub fn byte_to_column(line: &str, byte_offset: usize) -> usize {
    line.char_indices()
        .take_while(|(byte, _)| *byte < byte_offset)
        .count()
}
