use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::document::DocumentId;
use crate::host::{
    CONFIG_NAMESPACE, ConfigSource, DocumentHost, HostError, LAST_MODIFIED_KEY, TIMEZONE_KEY,
    ZONE_NAME_KEY,
};
use crate::matcher::{MatchError, TimestampPattern};
use crate::position::Span;
use crate::timestamp::{Clock, TimestampError, TimestampFormat};

/// What one update did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpdateOutcome {
    /// The timestamp was replaced
    Updated {
        document: DocumentId,
        span: Span,
        previous: String,
        timestamp: String,
    },
    /// No line carries the configured field
    NoMatch { document: DocumentId },
    /// The document is not the one the user is focused on
    NotActive { document: DocumentId },
}

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("Host error for {document}: {source}")]
    Host {
        document: DocumentId,
        source: HostError,
    },
    #[error("Invalid timestamp settings: {0}")]
    Timestamp(#[from] TimestampError),
    #[error(transparent)]
    Pattern(MatchError),
}

/// Rewrites the last-modified field of one document per call
pub struct Updater {
    host: Arc<dyn DocumentHost>,
    config: Arc<dyn ConfigSource>,
    clock: Arc<dyn Clock>,
}

impl Updater {
    pub fn new(
        host: Arc<dyn DocumentHost>,
        config: Arc<dyn ConfigSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { host, config, clock }
    }

    /// Find the field in `id` without editing anything
    pub fn locate(&self, id: &DocumentId) -> Result<Option<Span>, UpdateError> {
        let document = self.host.open_document(id).map_err(|source| UpdateError::Host {
            document: id.clone(),
            source,
        })?;
        let Some(pattern) = self.pattern()? else {
            return Ok(None);
        };
        Ok(pattern.find_in_lines(&document.lines()))
    }

    /// Replace the first last-modified timestamp in `id` with the current time
    ///
    /// Steps, each returning early:
    /// 1. open the document
    /// 2. read the label and find the first matching line
    /// 3. check that `id` is the active document
    /// 4. render the current time and apply one edit over the span
    pub fn update_last_modified(&self, id: &DocumentId) -> Result<UpdateOutcome, UpdateError> {
        let document = self.host.open_document(id).map_err(|source| UpdateError::Host {
            document: id.clone(),
            source,
        })?;

        let Some(pattern) = self.pattern()? else {
            return Ok(UpdateOutcome::NoMatch { document: id.clone() });
        };

        let lines = document.lines();
        let Some(span) = pattern.find_in_lines(&lines) else {
            debug!(document = %id, label = pattern.label(), "no last-modified field");
            return Ok(UpdateOutcome::NoMatch { document: id.clone() });
        };

        if self.host.active_document().as_ref() != Some(id) {
            debug!(document = %id, "document is not active, leaving header alone");
            return Ok(UpdateOutcome::NotActive { document: id.clone() });
        }

        let previous: String = lines[span.line]
            .chars()
            .skip(span.start)
            .take(span.len())
            .collect();

        let format = self.timestamp_format()?;
        let timestamp = format.render(self.clock.now());

        self.host
            .apply_edit(&document, span, &timestamp)
            .map_err(|source| UpdateError::Host {
                document: id.clone(),
                source,
            })?;

        Ok(UpdateOutcome::Updated {
            document: id.clone(),
            span,
            previous,
            timestamp,
        })
    }

    /// The pattern for the configured label, or `None` when no usable label is set
    fn pattern(&self) -> Result<Option<TimestampPattern>, UpdateError> {
        let Some(label) = self.config.get(CONFIG_NAMESPACE, LAST_MODIFIED_KEY) else {
            warn!("{}.{} is not configured", CONFIG_NAMESPACE, LAST_MODIFIED_KEY);
            return Ok(None);
        };

        match TimestampPattern::new(&label) {
            Ok(pattern) => Ok(Some(pattern)),
            Err(MatchError::EmptyLabel) => {
                warn!("{}.{} is empty", CONFIG_NAMESPACE, LAST_MODIFIED_KEY);
                Ok(None)
            }
            Err(err) => Err(UpdateError::Pattern(err)),
        }
    }

    fn timestamp_format(&self) -> Result<TimestampFormat, TimestampError> {
        let timezone = self.config.get(CONFIG_NAMESPACE, TIMEZONE_KEY);
        let zone_name = self.config.get(CONFIG_NAMESPACE, ZONE_NAME_KEY);
        TimestampFormat::from_settings(timezone.as_deref(), zone_name.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::memory_host::MemoryHost;
    use crate::timestamp::FixedClock;
    use chrono::{TimeZone, Utc};

    const HEADER: &str = "/*\n * @author Someone\n * @last-modified: Tue Jan 16 2018 11:39:37 GMT-0800 (PST)\n */\n";

    fn updater(host: Arc<MemoryHost>, config: AppConfig) -> Updater {
        let clock = FixedClock(Utc.with_ymd_and_hms(2019, 2, 20, 3, 11, 41).unwrap());
        Updater::new(host, Arc::new(config), Arc::new(clock))
    }

    fn pacific() -> AppConfig {
        let mut config = AppConfig::default();
        config.topper.timezone = Some("America/Los_Angeles".to_string());
        config
    }

    #[test]
    fn test_updates_active_document() {
        let host = Arc::new(MemoryHost::new());
        let id = DocumentId::from("src/app.js");
        host.insert(id.clone(), HEADER);
        host.set_active(Some(id.clone()));

        let outcome = updater(host.clone(), pacific()).update_last_modified(&id).unwrap();

        assert_eq!(
            outcome,
            UpdateOutcome::Updated {
                document: id.clone(),
                span: Span::new(2, 19, 58),
                previous: "Tue Jan 16 2018 11:39:37 GMT-0800 (PST)".to_string(),
                timestamp: "Tue Feb 19 2019 19:11:41 GMT-0800 (PST)".to_string(),
            }
        );
        assert_eq!(
            host.text(&id).unwrap(),
            "/*\n * @author Someone\n * @last-modified: Tue Feb 19 2019 19:11:41 GMT-0800 (PST)\n */\n"
        );
    }

    #[test]
    fn test_inactive_document_untouched() {
        let host = Arc::new(MemoryHost::new());
        let id = DocumentId::from("src/app.js");
        host.insert(id.clone(), HEADER);
        host.set_active(Some(DocumentId::from("src/other.js")));

        let outcome = updater(host.clone(), pacific()).update_last_modified(&id).unwrap();

        assert_eq!(outcome, UpdateOutcome::NotActive { document: id.clone() });
        assert_eq!(host.text(&id).unwrap(), HEADER);
        assert_eq!(host.edit_count(), 0);
    }

    #[test]
    fn test_empty_label_is_no_match() {
        let host = Arc::new(MemoryHost::new());
        let id = DocumentId::from("src/app.js");
        host.insert(id.clone(), HEADER);
        host.set_active(Some(id.clone()));

        let mut config = pacific();
        config.topper.last_modified = String::new();

        let outcome = updater(host.clone(), config).update_last_modified(&id).unwrap();

        assert_eq!(outcome, UpdateOutcome::NoMatch { document: id.clone() });
        assert_eq!(host.edit_count(), 0);
    }

    #[test]
    fn test_invalid_timezone_is_error() {
        let host = Arc::new(MemoryHost::new());
        let id = DocumentId::from("src/app.js");
        host.insert(id.clone(), HEADER);
        host.set_active(Some(id.clone()));

        let mut config = AppConfig::default();
        config.topper.timezone = Some("Nowhere/Special".to_string());

        let result = updater(host.clone(), config).update_last_modified(&id);

        assert!(matches!(result, Err(UpdateError::Timestamp(TimestampError::UnknownZone(_)))));
        assert_eq!(host.text(&id).unwrap(), HEADER);
    }

    #[test]
    fn test_locate_does_not_edit() {
        let host = Arc::new(MemoryHost::new());
        let id = DocumentId::from("src/app.js");
        host.insert(id.clone(), HEADER);

        let span = updater(host.clone(), pacific()).locate(&id).unwrap();

        assert_eq!(span, Some(Span::new(2, 19, 58)));
        assert_eq!(host.edit_count(), 0);
    }
}
