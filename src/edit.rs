use thiserror::Error;

use crate::document::checksum;
use crate::position::Span;

/// A replacement over one span of a document
#[derive(Debug, Clone)]
pub struct TextEdit {
    /// Range to replace
    pub span: Span,
    /// Replacement text
    pub replacement: String,
    /// Expected checksum of the document before this edit
    pub expected_checksum: String,
}

/// Result of applying an edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedEdit {
    /// Content after the edit
    pub content: String,
    /// Checksum of `content`
    pub new_checksum: String,
    /// Byte shift (positive = content grew, negative = shrank)
    pub byte_shift: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("Line {line} out of bounds (document has {line_count} lines)")]
    LineOutOfBounds { line: usize, line_count: usize },
    #[error("Invalid span: end ({end}) < start ({start})")]
    InvalidSpan { start: usize, end: usize },
    #[error("Column {column} out of bounds on line {line} (line length: {line_len})")]
    ColumnOutOfBounds {
        line: usize,
        column: usize,
        line_len: usize,
    },
    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },
}

/// Validate a span against document content
///
/// # Returns
/// * `Ok(())` if `start <= end <= line length` on an existing line
/// * `Err(EditError)` otherwise
pub fn validate_span(span: &Span, content: &str) -> Result<(), EditError> {
    if span.end < span.start {
        return Err(EditError::InvalidSpan {
            start: span.start,
            end: span.end,
        });
    }

    let line_count = content.split('\n').count();
    let line = content
        .split('\n')
        .nth(span.line)
        .ok_or(EditError::LineOutOfBounds {
            line: span.line,
            line_count,
        })?;

    let line_len = line.chars().count();
    if span.end > line_len {
        return Err(EditError::ColumnOutOfBounds {
            line: span.line,
            column: span.end,
            line_len,
        });
    }

    Ok(())
}

/// Verify that document content matches the expected checksum
pub fn verify_checksum(content: &str, expected_checksum: &str) -> Result<(), EditError> {
    let actual = checksum(content);

    if actual == expected_checksum {
        Ok(())
    } else {
        Err(EditError::ChecksumMismatch {
            expected: expected_checksum.to_string(),
            actual,
        })
    }
}

/// Apply a single edit to document content
///
/// This function:
/// 1. Verifies the checksum matches
/// 2. Validates the span against the content
/// 3. Splices the replacement in
/// 4. Computes the new checksum
pub fn apply_text_edit(content: &str, edit: &TextEdit) -> Result<AppliedEdit, EditError> {
    verify_checksum(content, &edit.expected_checksum)?;
    validate_span(&edit.span, content)?;

    // validate_span guarantees the conversion succeeds
    let range = edit.span.byte_range(content).ok_or(EditError::ColumnOutOfBounds {
        line: edit.span.line,
        column: edit.span.end,
        line_len: 0,
    })?;

    let mut new_content = String::with_capacity(content.len() + edit.replacement.len());
    new_content.push_str(&content[..range.start]);
    new_content.push_str(&edit.replacement);
    new_content.push_str(&content[range.end..]);

    let byte_shift = edit.replacement.len() as i64 - (range.end - range.start) as i64;
    let new_checksum = checksum(&new_content);

    Ok(AppliedEdit {
        content: new_content,
        new_checksum,
        byte_shift,
    })
}
