//! Rendering of last-modified timestamps.
//!
//! The grammar is `Weekday Month DD YYYY HH:MM:SS GMT±HHMM (Zone Name)`,
//! for example `Tue Jan 16 2018 11:39:37 GMT-0800 (PST)`. Weekday and month
//! are English three-letter abbreviations. The zone name may contain letters,
//! spaces, dots and slashes but never digits or parentheses.

use chrono::{DateTime, Local, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Regular expression for one timestamp literal (unanchored)
pub const TIMESTAMP_PATTERN: &str = r"[A-Za-z]{3} [A-Za-z]{3} [0-9]{2} [0-9]{4} [0-9]{2}:[0-9]{2}:[0-9]{2} [A-Za-z]{3}[-+][0-9]{4} \([^0-9()\n]*\)";

/// Zone name used for the local offset when no IANA zone can be determined
pub const LOCAL_ZONE_NAME: &str = "Local Time";

static EXACT_TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("^{}$", TIMESTAMP_PATTERN)).expect("timestamp pattern is valid")
});

/// Whether `text` is exactly one timestamp in the fixed grammar
pub fn is_timestamp(text: &str) -> bool {
    EXACT_TIMESTAMP.is_match(text)
}

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimestampError {
    #[error("Unknown time zone: {0}")]
    UnknownZone(String),
    #[error("Zone name {0:?} must be non-empty and contain no digits or parentheses")]
    InvalidZoneName(String),
}

/// Which clock offset timestamps are rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// The process's local offset
    Local,
    /// An IANA time zone
    Named(Tz),
}

impl Zone {
    /// Parse an IANA zone name such as `America/Los_Angeles`
    pub fn parse(name: &str) -> Result<Self, TimestampError> {
        name.trim()
            .parse::<Tz>()
            .map(Zone::Named)
            .map_err(|_| TimestampError::UnknownZone(name.to_string()))
    }

    /// The zone named by `$TZ`, else the system zone, else the local offset
    pub fn from_env() -> Self {
        let system = iana_time_zone::get_timezone().ok();
        Self::resolve(std::env::var("TZ").ok().as_deref(), system.as_deref())
    }

    /// Pick a zone from a `$TZ` value and the system's IANA zone id
    ///
    /// Values that are not IANA names (POSIX rules such as `PST8PDT,M3.2.0`)
    /// are skipped.
    pub fn resolve(tz_var: Option<&str>, system: Option<&str>) -> Self {
        tz_var
            .map(|value| value.trim_start_matches(':'))
            .into_iter()
            .chain(system)
            .filter(|name| !name.trim().is_empty())
            .find_map(|name| Zone::parse(name).ok())
            .unwrap_or(Zone::Local)
    }
}

/// How the current time is written into the header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampFormat {
    zone: Zone,
    zone_name: Option<String>,
}

impl TimestampFormat {
    /// Build a format, validating any display-name override
    pub fn new(zone: Zone, zone_name: Option<String>) -> Result<Self, TimestampError> {
        if let Some(name) = &zone_name {
            if !is_valid_zone_name(name) {
                return Err(TimestampError::InvalidZoneName(name.clone()));
            }
        }
        Ok(Self { zone, zone_name })
    }

    /// Build a format from the optional `timezone` and `zoneName` settings
    pub fn from_settings(
        timezone: Option<&str>,
        zone_name: Option<&str>,
    ) -> Result<Self, TimestampError> {
        let zone = match timezone.filter(|name| !name.trim().is_empty()) {
            Some(name) => Zone::parse(name)?,
            None => Zone::from_env(),
        };
        Self::new(zone, zone_name.map(str::to_string))
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    /// Render `now` in the fixed grammar
    ///
    /// The result always satisfies [`is_timestamp`].
    pub fn render(&self, now: DateTime<Utc>) -> String {
        match self.zone {
            Zone::Local => {
                let local = now.with_timezone(&Local);
                let name = self.zone_name.as_deref().unwrap_or(LOCAL_ZONE_NAME);
                format!("{} ({})", local.format("%a %b %d %Y %H:%M:%S GMT%z"), name)
            }
            Zone::Named(tz) => {
                let zoned = now.with_timezone(&tz);
                let name = match &self.zone_name {
                    Some(name) => name.clone(),
                    None => {
                        // Some zones abbreviate to a bare offset like "-03"
                        let abbreviation = zoned.format("%Z").to_string();
                        if is_valid_zone_name(&abbreviation) {
                            abbreviation
                        } else {
                            tz.name().to_string()
                        }
                    }
                };
                format!("{} ({})", zoned.format("%a %b %d %Y %H:%M:%S GMT%z"), name)
            }
        }
    }
}

fn is_valid_zone_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_ascii_digit() || c == '(' || c == ')' || c == '\n')
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec).unwrap()
    }

    fn named(zone: &str) -> TimestampFormat {
        TimestampFormat::new(Zone::parse(zone).unwrap(), None).unwrap()
    }

    #[test]
    fn test_render_pacific_standard_time() {
        let rendered = named("America/Los_Angeles").render(at(2018, 1, 16, 19, 39, 37));

        assert_eq!(rendered, "Tue Jan 16 2018 11:39:37 GMT-0800 (PST)");
        assert!(is_timestamp(&rendered));
    }

    #[test]
    fn test_render_daylight_saving() {
        let rendered = named("Europe/Berlin").render(at(2018, 9, 26, 19, 47, 26));

        assert_eq!(rendered, "Wed Sep 26 2018 21:47:26 GMT+0200 (CEST)");
    }

    #[test]
    fn test_numeric_abbreviation_falls_back_to_zone_id() {
        let rendered = named("America/Sao_Paulo").render(at(2024, 6, 1, 12, 0, 0));

        assert_eq!(rendered, "Sat Jun 01 2024 09:00:00 GMT-0300 (America/Sao_Paulo)");
        assert!(is_timestamp(&rendered));
    }

    #[test]
    fn test_zone_name_override() {
        let format = TimestampFormat::new(
            Zone::parse("Europe/Amsterdam").unwrap(),
            Some("W. Europe Daylight Time".to_string()),
        )
        .unwrap();

        let rendered = format.render(at(2018, 9, 26, 19, 47, 26));
        assert_eq!(rendered, "Wed Sep 26 2018 21:47:26 GMT+0200 (W. Europe Daylight Time)");
        assert!(is_timestamp(&rendered));
    }

    #[test]
    fn test_local_zone_is_matchable() {
        let format = TimestampFormat::new(Zone::Local, None).unwrap();
        let rendered = format.render(at(2020, 2, 29, 23, 59, 59));

        assert!(rendered.ends_with("(Local Time)"));
        assert!(is_timestamp(&rendered));
    }

    #[test]
    fn test_resolve_zone_prefers_tz_then_system() {
        let berlin = Zone::parse("Europe/Berlin").unwrap();
        let pacific = Zone::parse("America/Los_Angeles").unwrap();

        assert_eq!(Zone::resolve(Some(":Europe/Berlin"), Some("America/Los_Angeles")), berlin);
        assert_eq!(Zone::resolve(None, Some("America/Los_Angeles")), pacific);
        assert_eq!(Zone::resolve(Some("PST8PDT,M3.2.0,M11.1.0"), Some("America/Los_Angeles")), pacific);
        assert_eq!(Zone::resolve(Some(""), Some("Not/A_Zone")), Zone::Local);
        assert_eq!(Zone::resolve(None, None), Zone::Local);
    }

    #[test]
    fn test_system_zone_renders_real_name() {
        let format = TimestampFormat::new(Zone::resolve(None, Some("America/Los_Angeles")), None).unwrap();

        assert_eq!(
            format.render(at(2018, 1, 16, 19, 39, 37)),
            "Tue Jan 16 2018 11:39:37 GMT-0800 (PST)"
        );
    }

    #[test]
    fn test_invalid_settings() {
        assert_eq!(
            TimestampFormat::from_settings(Some("Mars/Olympus_Mons"), None),
            Err(TimestampError::UnknownZone("Mars/Olympus_Mons".to_string()))
        );
        assert_eq!(
            TimestampFormat::new(Zone::Local, Some("UTC+1".to_string())),
            Err(TimestampError::InvalidZoneName("UTC+1".to_string()))
        );
    }

    #[test]
    fn test_is_timestamp() {
        assert!(is_timestamp("Tue Jan 16 2018 11:39:37 GMT-0800 (PST)"));
        assert!(!is_timestamp("Tue Jan 16 2018 11:39:37 GMT-0800"));
        assert!(!is_timestamp("2018-01-16T11:39:37Z"));
        assert!(!is_timestamp("Tue Jan 16 2018 11:39:37 GMT-0800 (UTC+8)"));
    }
}
