//! Event record model.
//!
//! # Responsibility
//! - Define `EventRecord`, the canonical calendar entry.
//! - Define `EventTime` with a stable ISO-8601-like text form.
//! - Define `EventId`, the opaque identity used for update/remove matching.
//!
//! # Invariants
//! - `EventTime` text form round-trips exactly through `Display`/`FromStr`.
//! - `EventId::new` never accepts a blank identifier.
//! - Serialized field names match the stored slot format
//!   (`id`, `title`, `start`, `end`, `allDay`).

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";
const FLOATING_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const FLOATING_MINUTES_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Opaque event identifier.
///
/// Values produced by the widget or read from storage are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

/// Error returned when an identifier is blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventIdError;

impl Display for EventIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "event id cannot be empty")
    }
}

impl Error for EventIdError {}

impl EventId {
    /// Wraps a caller-provided identifier.
    ///
    /// # Errors
    /// - Returns `EventIdError` when `value` is empty or whitespace only.
    pub fn new(value: impl Into<String>) -> Result<Self, EventIdError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(EventIdError);
        }
        Ok(Self(value))
    }

    /// Generates a fresh identifier that is unique for practical purposes.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for EventId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EventId {
    type Err = EventIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Start or end of an event.
///
/// The widget hands out three shapes: plain dates for all-day cells,
/// absolute instants, and zone-less wall-clock times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTime {
    /// `YYYY-MM-DD`.
    Date(NaiveDate),
    /// RFC 3339 instant, normalized to UTC.
    DateTimeUtc(DateTime<Utc>),
    /// `YYYY-MM-DDTHH:MM:SS` without zone.
    Floating(NaiveDateTime),
}

/// Error returned when a timestamp string matches none of the known shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventTimeParseError {
    input: String,
}

impl EventTimeParseError {
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl Display for EventTimeParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid event time `{}`; expected YYYY-MM-DD, RFC 3339 or YYYY-MM-DDTHH:MM[:SS]",
            self.input
        )
    }
}

impl Error for EventTimeParseError {}

impl EventTime {
    /// Returns whether this value carries no time-of-day.
    pub fn is_date_only(&self) -> bool {
        matches!(self, Self::Date(_))
    }
}

impl Display for EventTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{}", date.format(DATE_FORMAT)),
            Self::DateTimeUtc(instant) => {
                f.write_str(&instant.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Self::Floating(local) => write!(f, "{}", local.format(FLOATING_FORMAT)),
        }
    }
}

impl FromStr for EventTime {
    type Err = EventTimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
            return Ok(Self::Date(date));
        }
        if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self::DateTimeUtc(instant.with_timezone(&Utc)));
        }
        if let Ok(local) = NaiveDateTime::parse_from_str(trimmed, FLOATING_FORMAT) {
            return Ok(Self::Floating(local));
        }
        if let Ok(local) = NaiveDateTime::parse_from_str(trimmed, FLOATING_MINUTES_FORMAT) {
            return Ok(Self::Floating(local));
        }

        Err(EventTimeParseError {
            input: s.to_string(),
        })
    }
}

impl From<NaiveDate> for EventTime {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<DateTime<Utc>> for EventTime {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTimeUtc(value)
    }
}

impl From<NaiveDateTime> for EventTime {
    fn from(value: NaiveDateTime) -> Self {
        Self::Floating(value)
    }
}

impl Serialize for EventTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EventTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One calendar entry.
///
/// Records are replaced wholesale on change; there is no field-level patching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: EventId,
    pub title: String,
    pub start: EventTime,
    /// `None` means a point event (or a single all-day cell).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<EventTime>,
    #[serde(default)]
    pub all_day: bool,
}

impl EventRecord {
    /// Creates a point event without an end.
    pub fn new(
        id: EventId,
        title: impl Into<String>,
        start: impl Into<EventTime>,
        all_day: bool,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            start: start.into(),
            end: None,
            all_day,
        }
    }

    /// Returns this record with `end` set.
    pub fn with_end(mut self, end: impl Into<EventTime>) -> Self {
        self.end = Some(end.into());
        self
    }
}
