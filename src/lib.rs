// Line/column addressing
pub mod position;

// Documents and checksums
pub mod document;

// Checksum-verified span edits
pub mod edit;

// Timestamp grammar and clocks
pub mod timestamp;

// Locating the last-modified field
pub mod matcher;

// Host capabilities
pub mod host;

// Settings file
pub mod config;

// Open -> match -> guard -> edit pipeline
pub mod updater;

// Will-save subscription
pub mod listener;

// Hosts
pub mod memory_host;
pub mod fs_host;

// Filesystem save events
pub mod watcher;

// File type detection
pub mod language;

// Re-exports
pub use position::{Position, Span, byte_to_column, column_to_byte};
pub use document::{Document, DocumentError, DocumentId, checksum, read_document};
pub use edit::{AppliedEdit, EditError, TextEdit, apply_text_edit, validate_span, verify_checksum};
pub use timestamp::{
    Clock, FixedClock, SystemClock, TIMESTAMP_PATTERN, TimestampError, TimestampFormat, Zone,
    is_timestamp,
};
pub use matcher::{MatchError, TimestampPattern, find_timestamp_span};
pub use host::{ConfigSource, DocumentHost, HostError, WillSaveEvents, WillSaveHandler};
pub use config::{AppConfig, ConfigError, TopperConfig, WatchConfig};
pub use updater::{UpdateError, UpdateOutcome, Updater};
pub use listener::{ListenerError, SaveListener};
pub use memory_host::MemoryHost;
pub use fs_host::FsHost;
pub use watcher::{FsSaveEvents, WatchError};
pub use language::{FileFilter, Language, detect_language};
