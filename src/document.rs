use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// Identity of a document: the path it is persisted to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DocumentId(PathBuf);

impl DocumentId {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<&Path> for DocumentId {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}

impl From<PathBuf> for DocumentId {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

impl From<&str> for DocumentId {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// A document's text as read at one moment
#[derive(Debug, Clone)]
pub struct Document {
    pub id: DocumentId,
    /// Full text as valid UTF-8
    pub text: String,
    /// BLAKE3 hash of `text` (hex-encoded)
    pub checksum: String,
}

impl Document {
    pub fn new(id: DocumentId, text: String) -> Self {
        let checksum = checksum(&text);
        Self { id, text, checksum }
    }

    /// The document's lines, delimited by `\n`
    pub fn lines(&self) -> Vec<&str> {
        self.text.split('\n').collect()
    }
}

/// Hex-encoded BLAKE3 hash of `text`
pub fn checksum(text: &str) -> String {
    blake3::hash(text.as_bytes()).to_hex().to_string()
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid UTF-8 in document: {0}")]
    InvalidUtf8(String),
}

/// Read a document from disk with UTF-8 validation
pub fn read_document<P: AsRef<Path>>(path: P) -> Result<Document, DocumentError> {
    let path_ref = path.as_ref();

    if !path_ref.exists() {
        return Err(DocumentError::NotFound(path_ref.display().to_string()));
    }

    let bytes = fs::read(path_ref)?;
    let text = String::from_utf8(bytes)
        .map_err(|_| DocumentError::InvalidUtf8(path_ref.display().to_string()))?;

    Ok(Document::new(DocumentId::new(path_ref), text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_document_valid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("header.js");
        let content = "/*\n * @author someone\n */\nconst x = 1;";
        fs::write(&path, content).unwrap();

        let document = read_document(&path).unwrap();

        assert_eq!(document.text, content);
        assert_eq!(document.id.path(), path.as_path());
        assert_eq!(document.checksum, checksum(content));
        assert!(document.checksum.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_read_document_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.dat");
        fs::write(&path, [0xFF, 0xFE, 0xFD]).unwrap();

        match read_document(&path) {
            Err(DocumentError::InvalidUtf8(p)) => assert_eq!(p, path.display().to_string()),
            other => panic!("Expected DocumentError::InvalidUtf8, got {:?}", other),
        }
    }

    #[test]
    fn test_read_document_not_found() {
        let result = read_document("/nonexistent/path/that/does/not/exist.rs");

        match result {
            Err(DocumentError::NotFound(p)) => assert!(p.contains("nonexistent")),
            other => panic!("Expected DocumentError::NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_lines_keep_trailing_empty_line() {
        let document = Document::new(DocumentId::from("a.txt"), "one\r\ntwo\n".to_string());

        assert_eq!(document.lines(), vec!["one\r", "two", ""]);
    }
}
