//! Index entry line format
//!
//! One entry per line: `key:documentFilename`. The key is everything before
//! the first `:`, the filename everything after it.

/// Separator between key and document filename
pub const DELIMITER: char = ':';

/// A single `key:document` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub key: String,
    pub document: String,
}

impl IndexEntry {
    pub fn new(key: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            document: document.into(),
        }
    }

    /// Parse one line (without its line terminator).
    ///
    /// Returns `None` if the line has no delimiter.
    pub fn parse(line: &str) -> Option<Self> {
        let (key, document) = line.split_once(DELIMITER)?;
        Some(Self::new(key, document))
    }

    /// Render as a line, newline included
    pub fn to_line(&self) -> String {
        format!("{}{}{}\n", self.key, DELIMITER, self.document)
    }

    /// Whether `key` can be stored without escaping
    pub fn is_valid_key(key: &str) -> bool {
        !key.contains([DELIMITER, '\n', '\r'])
    }
}
