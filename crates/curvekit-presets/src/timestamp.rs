//! Preset timestamps.
//!
//! Written as naive local ISO-8601 with microsecond precision:
//! ```text
//! 2024-05-01T12:00:00.123456
//! ```
//! Read back from that form (fraction optional), from RFC 3339 with an
//! offset, or from bare Unix seconds.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A point in time on a preset document. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimestamp", into = "String")]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Current local time, truncated to microseconds.
    pub fn now() -> Self {
        Self(Local::now().naive_local().trunc_subsecs(6))
    }

    pub fn from_unix_seconds(secs: i64) -> Option<Self> {
        DateTime::<Utc>::from_timestamp(secs, 0).map(|t| Self(t.naive_utc()))
    }

    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }
}

/// The Unix epoch; documents missing a timestamp sort last.
impl Default for Timestamp {
    fn default() -> Self {
        Self(DateTime::<Utc>::default().naive_utc())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(ISO_FORMAT))
    }
}

impl FromStr for Timestamp {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match NaiveDateTime::parse_from_str(s, ISO_FORMAT) {
            Ok(naive) => Ok(Self(naive)),
            Err(_) => DateTime::parse_from_rfc3339(s).map(|t| Self(t.naive_utc())),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    Seconds(i64),
}

impl TryFrom<RawTimestamp> for Timestamp {
    type Error = String;

    fn try_from(raw: RawTimestamp) -> Result<Self, Self::Error> {
        match raw {
            RawTimestamp::Text(text) => text.parse().map_err(|e| format!("invalid timestamp {text:?}: {e}")),
            RawTimestamp::Seconds(secs) => {
                Self::from_unix_seconds(secs).ok_or_else(|| format!("timestamp {secs} out of range"))
            }
        }
    }
}

impl From<Timestamp> for String {
    fn from(t: Timestamp) -> Self {
        t.to_string()
    }
}
