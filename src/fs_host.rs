use std::collections::HashMap;
use std::fs;
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use crate::document::{Document, DocumentId, checksum, read_document};
use crate::edit::{TextEdit, apply_text_edit};
use crate::host::{DocumentHost, HostError};
use crate::position::Span;

/// A host whose documents are files on disk
///
/// The active document is whichever file is focused: the watcher focuses
/// each file while its save is dispatched, or one file can be pinned.
#[derive(Debug, Default)]
pub struct FsHost {
    pinned: Option<DocumentId>,
    focused: Mutex<Option<DocumentId>>,
    /// Checksum of the last content this host wrote, per document
    written: Mutex<HashMap<DocumentId, String>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl FsHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only ever treat `id` as active
    pub fn pinned(id: DocumentId) -> Self {
        Self {
            pinned: Some(id),
            ..Self::default()
        }
    }

    pub fn focus(&self, id: Option<DocumentId>) {
        *lock(&self.focused) = id;
    }

    /// Whether the file's content is exactly what this host last wrote to it
    pub fn is_own_write(&self, id: &DocumentId) -> bool {
        let written = lock(&self.written);
        let Some(expected) = written.get(id) else {
            return false;
        };
        match fs::read(id.path()) {
            Ok(bytes) => String::from_utf8(bytes)
                .map(|text| checksum(&text) == *expected)
                .unwrap_or(false),
            Err(_) => false,
        }
    }
}

impl DocumentHost for FsHost {
    fn open_document(&self, id: &DocumentId) -> Result<Document, HostError> {
        Ok(read_document(id.path())?)
    }

    fn active_document(&self) -> Option<DocumentId> {
        match &self.pinned {
            Some(id) => Some(id.clone()),
            None => lock(&self.focused).clone(),
        }
    }

    fn apply_edit(&self, document: &Document, span: Span, replacement: &str) -> Result<(), HostError> {
        let current = read_document(document.id.path())?;
        let applied = apply_text_edit(
            &current.text,
            &TextEdit {
                span,
                replacement: replacement.to_string(),
                expected_checksum: document.checksum.clone(),
            },
        )?;

        fs::write(document.id.path(), &applied.content)?;
        debug!(document = %document.id, byte_shift = applied.byte_shift, "edit written");

        lock(&self.written).insert(document.id.clone(), applied.new_checksum);
        Ok(())
    }
}
