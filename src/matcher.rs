//! Locating the last-modified field inside free-form header comments.
//!
//! A field is the configured label, optional whitespace, at most one
//! separator character, at least one whitespace character, and then a
//! timestamp in the grammar of [`crate::timestamp`]:
//!
//! ```text
//!  * @last-modified: Tue Jan 16 2018 11:39:37 GMT-0800 (PST)
//!    ^^^^^^^^^^^^^^  ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^
//!    label        sep  timestamp (the replacement span)
//! ```
//!
//! The label is matched literally, and only the first matching line in the
//! document counts.

use regex::Regex;
use thiserror::Error;

use crate::position::{Span, byte_to_column};
use crate::timestamp::TIMESTAMP_PATTERN;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Label is empty")]
    EmptyLabel,
    #[error("Failed to build pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Compiled pattern for one label
#[derive(Debug, Clone)]
pub struct TimestampPattern {
    label: String,
    regex: Regex,
}

impl TimestampPattern {
    pub fn new(label: &str) -> Result<Self, MatchError> {
        if label.trim().is_empty() {
            return Err(MatchError::EmptyLabel);
        }

        let regex = Regex::new(&format!(
            r"{}\s*.?\s+(?P<timestamp>{})",
            regex::escape(label),
            TIMESTAMP_PATTERN
        ))?;

        Ok(Self {
            label: label.to_string(),
            regex,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Span of the timestamp on `line`, if the line carries the field
    pub fn find_in_line(&self, line_number: usize, line: &str) -> Option<Span> {
        let timestamp = self.regex.captures(line)?.name("timestamp")?;

        let start = byte_to_column(line, timestamp.start());
        let end = start + timestamp.as_str().chars().count();
        Some(Span::new(line_number, start, end))
    }

    /// Span of the timestamp on the first line carrying the field
    pub fn find_in_lines<S: AsRef<str>>(&self, lines: &[S]) -> Option<Span> {
        lines
            .iter()
            .enumerate()
            .find_map(|(number, line)| self.find_in_line(number, line.as_ref()))
    }
}

/// Find the replacement span for `label` in `lines`
///
/// An empty label never matches.
pub fn find_timestamp_span<S: AsRef<str>>(lines: &[S], label: &str) -> Option<Span> {
    TimestampPattern::new(label).ok()?.find_in_lines(lines)
}
