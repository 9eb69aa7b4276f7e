//! Save notifications derived from filesystem events.
//!
//! A file watcher only learns about a save after the bytes hit the disk, so
//! the header edit lands as a second write. Raw events are debounced first: an
//! editor may write a file in several chunks, and editing it between chunks
//! would interleave our bytes with the editor's. A path is only dispatched once
//! it has been quiet for the whole debounce window.
//!
//! Our own edit would itself look like a save; [`FsHost::is_own_write`]
//! filters it out, and content already handled is never dispatched twice.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use notify::RecursiveMode;
use notify_debouncer_mini::{DebounceEventResult, DebouncedEventKind, new_debouncer};
use thiserror::Error;
use tracing::{info, trace, warn};

use crate::document::{DocumentId, read_document};
use crate::fs_host::FsHost;
use crate::host::{WillSaveEvents, WillSaveHandler};
use crate::language::FileFilter;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("File watcher error: {0}")]
    Notify(#[from] notify::Error),
    #[error("Nothing to watch")]
    NoPaths,
}

/// Will-save source backed by `notify`
pub struct FsSaveEvents {
    host: Arc<FsHost>,
    filter: FileFilter,
    handlers: Mutex<Vec<WillSaveHandler>>,
    /// Checksum of the content each file had when last dispatched
    seen: Mutex<HashMap<DocumentId, String>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl FsSaveEvents {
    pub fn new(host: Arc<FsHost>, filter: FileFilter) -> Self {
        Self {
            host,
            filter,
            handlers: Mutex::new(Vec::new()),
            seen: Mutex::new(HashMap::new()),
        }
    }

    /// Notify subscribers that `path` was saved, with the file focused
    ///
    /// The caller must only pass files whose writer has finished. Returns
    /// false when the file is filtered out, unreadable, unchanged since the
    /// last dispatch, or the change was the host's own edit.
    pub fn dispatch(&self, path: &Path) -> bool {
        if !path.is_file() || !self.filter.accepts(path) {
            return false;
        }

        let id = DocumentId::new(path.canonicalize().unwrap_or_else(|_| path.to_path_buf()));
        if self.host.is_own_write(&id) {
            trace!(document = %id, "ignoring own write");
            return false;
        }

        let current = match read_document(id.path()) {
            Ok(document) => document.checksum,
            Err(err) => {
                trace!(document = %id, "skipping unreadable file: {}", err);
                return false;
            }
        };
        if lock(&self.seen).get(&id) == Some(&current) {
            trace!(document = %id, "content unchanged");
            return false;
        }

        self.host.focus(Some(id.clone()));
        for handler in lock(&self.handlers).iter() {
            handler(&id);
        }
        self.host.focus(None);

        let handled = read_document(id.path())
            .map(|document| document.checksum)
            .unwrap_or(current);
        lock(&self.seen).insert(id, handled);
        true
    }

    /// Block, dispatching settled saves under `paths` until the watcher shuts down
    ///
    /// A file is dispatched once no event has touched it for `debounce`.
    pub fn watch(
        &self,
        paths: &[PathBuf],
        recursive: bool,
        debounce: Duration,
    ) -> Result<(), WatchError> {
        if paths.is_empty() {
            return Err(WatchError::NoPaths);
        }

        let (tx, rx) = mpsc::channel();
        let mut debouncer = new_debouncer(debounce, move |res: DebounceEventResult| {
            let _ = tx.send(res);
        })?;

        let mode = if recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        for path in paths {
            debouncer.watcher().watch(path, mode)?;
            info!(path = %path.display(), recursive, ?debounce, "watching");
        }

        for res in rx {
            match res {
                Ok(events) => {
                    for event in events {
                        match event.kind {
                            DebouncedEventKind::Any => {
                                self.dispatch(&event.path);
                            }
                            // Still being written
                            _ => trace!(path = %event.path.display(), "write in progress"),
                        }
                    }
                }
                Err(err) => warn!("watch error: {:?}", err),
            }
        }

        Ok(())
    }
}

impl WillSaveEvents for FsSaveEvents {
    fn subscribe(&self, handler: WillSaveHandler) {
        lock(&self.handlers).push(handler);
    }
}
