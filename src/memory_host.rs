use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::document::{Document, DocumentId};
use crate::edit::{TextEdit, apply_text_edit};
use crate::host::{DocumentHost, HostError, WillSaveEvents, WillSaveHandler};
use crate::position::Span;

/// A host that keeps documents in memory
///
/// `save` plays the role of the editor's save command: it notifies every
/// subscriber before counting the save.
#[derive(Default)]
pub struct MemoryHost {
    documents: Mutex<HashMap<DocumentId, String>>,
    active: Mutex<Option<DocumentId>>,
    handlers: Mutex<Vec<WillSaveHandler>>,
    edits: Mutex<usize>,
    saves: Mutex<usize>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a document
    pub fn insert<I: Into<DocumentId>>(&self, id: I, text: &str) {
        lock(&self.documents).insert(id.into(), text.to_string());
    }

    pub fn text(&self, id: &DocumentId) -> Option<String> {
        lock(&self.documents).get(id).cloned()
    }

    pub fn set_active(&self, id: Option<DocumentId>) {
        *lock(&self.active) = id;
    }

    /// Number of edits applied so far
    pub fn edit_count(&self) -> usize {
        *lock(&self.edits)
    }

    /// Number of completed saves
    pub fn save_count(&self) -> usize {
        *lock(&self.saves)
    }

    /// Fire will-save handlers for `id`, then record the save
    pub fn save(&self, id: &DocumentId) {
        for handler in lock(&self.handlers).iter() {
            handler(id);
        }
        *lock(&self.saves) += 1;
    }
}

impl DocumentHost for MemoryHost {
    fn open_document(&self, id: &DocumentId) -> Result<Document, HostError> {
        let text = self
            .text(id)
            .ok_or_else(|| HostError::UnknownDocument(id.clone()))?;
        Ok(Document::new(id.clone(), text))
    }

    fn active_document(&self) -> Option<DocumentId> {
        lock(&self.active).clone()
    }

    fn apply_edit(&self, document: &Document, span: Span, replacement: &str) -> Result<(), HostError> {
        let mut documents = lock(&self.documents);
        let current = documents
            .get_mut(&document.id)
            .ok_or_else(|| HostError::UnknownDocument(document.id.clone()))?;

        let applied = apply_text_edit(
            current,
            &TextEdit {
                span,
                replacement: replacement.to_string(),
                expected_checksum: document.checksum.clone(),
            },
        )?;

        *current = applied.content;
        *lock(&self.edits) += 1;
        Ok(())
    }
}

impl WillSaveEvents for MemoryHost {
    fn subscribe(&self, handler: WillSaveHandler) {
        lock(&self.handlers).push(handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::EditError;

    #[test]
    fn test_edit_rejected_after_concurrent_change() {
        let host = MemoryHost::new();
        let id = DocumentId::from("a.js");
        host.insert(id.clone(), "// stamp: old");

        let snapshot = host.open_document(&id).unwrap();
        host.insert(id.clone(), "// stamp: changed by user");

        let result = host.apply_edit(&snapshot, Span::new(0, 10, 13), "new");

        assert!(matches!(
            result,
            Err(HostError::Edit(EditError::ChecksumMismatch { .. }))
        ));
        assert_eq!(host.text(&id).unwrap(), "// stamp: changed by user");
        assert_eq!(host.edit_count(), 0);
    }

    #[test]
    fn test_unknown_document() {
        let host = MemoryHost::new();

        let result = host.open_document(&DocumentId::from("missing.rs"));
        assert!(matches!(result, Err(HostError::UnknownDocument(_))));
    }

    #[test]
    fn test_save_notifies_subscribers() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let host = MemoryHost::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        host.subscribe(Box::new(move |_: &DocumentId| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        host.save(&DocumentId::from("a.js"));
        host.save(&DocumentId::from("b.js"));

        assert_eq!(seen.load(Ordering::SeqCst), 2);
        assert_eq!(host.save_count(), 2);
    }
}
