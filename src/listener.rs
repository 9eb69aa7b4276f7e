use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::document::DocumentId;
use crate::host::WillSaveEvents;
use crate::updater::{UpdateOutcome, Updater};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListenerError {
    #[error("Save listener is already subscribed")]
    AlreadyStarted,
}

/// Bridges will-save notifications to the [`Updater`]
///
/// A failed update never reaches the host: errors and panics are logged and
/// the save proceeds.
pub struct SaveListener {
    updater: Updater,
    started: AtomicBool,
}

impl SaveListener {
    pub fn new(updater: Updater) -> Arc<Self> {
        Arc::new(Self {
            updater,
            started: AtomicBool::new(false),
        })
    }

    /// Subscribe to `events`. Only the first call registers a handler.
    pub fn start(self: &Arc<Self>, events: &dyn WillSaveEvents) -> Result<(), ListenerError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(ListenerError::AlreadyStarted);
        }

        let listener = Arc::clone(self);
        events.subscribe(Box::new(move |id: &DocumentId| listener.on_will_save(id)));
        info!("save listener started");
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Run one update for `id`, absorbing every failure
    pub fn on_will_save(&self, id: &DocumentId) {
        let event_id = Uuid::new_v4();
        let event_span = info_span!("will_save", %event_id, document = %id);
        let _guard = event_span.enter();

        match catch_unwind(AssertUnwindSafe(|| self.updater.update_last_modified(id))) {
            Ok(Ok(UpdateOutcome::Updated { span, timestamp, .. })) => {
                info!(line = span.line, %timestamp, "last-modified updated");
            }
            Ok(Ok(outcome)) => debug!(?outcome, "nothing to update"),
            Ok(Err(err)) => warn!("Error while updating modified date: {}", err),
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!("update panicked: {}", message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::document::Document;
    use crate::host::{DocumentHost, HostError};
    use crate::memory_host::MemoryHost;
    use crate::position::Span;
    use crate::timestamp::SystemClock;

    fn listener(host: Arc<dyn DocumentHost>) -> Arc<SaveListener> {
        SaveListener::new(Updater::new(
            host,
            Arc::new(AppConfig::default()),
            Arc::new(SystemClock),
        ))
    }

    #[test]
    fn test_start_only_once() {
        let host = Arc::new(MemoryHost::new());
        let listener = listener(host.clone());

        assert!(!listener.is_started());
        assert_eq!(listener.start(host.as_ref()), Ok(()));
        assert_eq!(listener.start(host.as_ref()), Err(ListenerError::AlreadyStarted));
        assert!(listener.is_started());
    }

    #[test]
    fn test_host_error_swallowed() {
        let host = Arc::new(MemoryHost::new());
        let listener = listener(host.clone());
        listener.start(host.as_ref()).unwrap();

        // Unknown document: open fails inside the handler
        host.save(&DocumentId::from("missing.rs"));

        assert_eq!(host.save_count(), 1);
    }

    struct PanickingHost;

    impl DocumentHost for PanickingHost {
        fn open_document(&self, _id: &DocumentId) -> Result<Document, HostError> {
            panic!("host exploded");
        }

        fn active_document(&self) -> Option<DocumentId> {
            None
        }

        fn apply_edit(&self, _: &Document, _: Span, _: &str) -> Result<(), HostError> {
            Ok(())
        }
    }

    #[test]
    fn test_panic_swallowed() {
        let listener = listener(Arc::new(PanickingHost));

        listener.on_will_save(&DocumentId::from("any.rs"));
    }
}
