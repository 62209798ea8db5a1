//! RFC 3339 timestamp type
//!
//! Row metadata (`create_date`, `last_updated`) travels on the wire as
//! ISO-8601 / RFC 3339 strings, so the canonical in-memory representation
//! wraps a UTC datetime rather than raw epoch arithmetic.
//!
//! ## Precision
//!
//! Timestamps carry microsecond precision. [`Timestamp::now`] truncates the
//! system clock to whole microseconds so a value always round-trips exactly
//! through its RFC 3339 string form.

use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// UTC timestamp with microsecond precision
///
/// The canonical time representation for row metadata. Serializes as an
/// RFC 3339 string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp for the current moment
    ///
    /// Truncated to whole microseconds so the RFC 3339 wire form parses
    /// back to an equal value.
    pub fn now() -> Self {
        let now = Utc::now();
        let micros = now.nanosecond() / 1_000 * 1_000;
        Timestamp(now.with_nanosecond(micros).unwrap_or(now))
    }

    /// Create a timestamp from a UTC datetime
    pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Timestamp(datetime)
    }

    /// Parse a timestamp from an RFC 3339 string
    ///
    /// # Errors
    /// Returns a parse error if the string is not valid RFC 3339.
    pub fn parse(s: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(s).map(|dt| Timestamp(dt.with_timezone(&Utc)))
    }

    /// Format as an RFC 3339 string with microsecond precision
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    /// Get the underlying UTC datetime
    #[inline]
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Check if this timestamp is before another
    #[inline]
    pub fn is_before(&self, other: Timestamp) -> bool {
        self.0 < other.0
    }

    /// Check if this timestamp is after another
    #[inline]
    pub fn is_after(&self, other: Timestamp) -> bool {
        self.0 > other.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(datetime: DateTime<Utc>) -> Self {
        Timestamp(datetime)
    }
}
