//! Capabilities consumed from the host editor or environment.

use thiserror::Error;

use crate::document::{Document, DocumentError, DocumentId};
use crate::edit::EditError;
use crate::position::Span;

/// Configuration namespace holding every setting this crate reads
pub const CONFIG_NAMESPACE: &str = "topper";
/// Key of the last-modified label
pub const LAST_MODIFIED_KEY: &str = "lastModified";
/// Key of the IANA zone timestamps are rendered in
pub const TIMEZONE_KEY: &str = "timezone";
/// Key of the zone display-name override
pub const ZONE_NAME_KEY: &str = "zoneName";

#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("Edit rejected: {0}")]
    Edit(#[from] EditError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unknown document: {0}")]
    UnknownDocument(DocumentId),
}

/// The host's document model
pub trait DocumentHost: Send + Sync {
    /// Resolve an identifier to the document's current text
    fn open_document(&self, id: &DocumentId) -> Result<Document, HostError>;

    /// The document currently focused by the user, if any
    fn active_document(&self) -> Option<DocumentId>;

    /// Replace the text within `span` of `document`
    ///
    /// Implementations must reject the edit when the document no longer
    /// matches `document.checksum`.
    fn apply_edit(&self, document: &Document, span: Span, replacement: &str) -> Result<(), HostError>;
}

/// Read-only access to host-managed settings
pub trait ConfigSource: Send + Sync {
    fn get(&self, namespace: &str, key: &str) -> Option<String>;
}

/// Callback invoked just before a document is persisted
pub type WillSaveHandler = Box<dyn Fn(&DocumentId) + Send + Sync>;

/// A source of will-save notifications
pub trait WillSaveEvents {
    fn subscribe(&self, handler: WillSaveHandler);
}
