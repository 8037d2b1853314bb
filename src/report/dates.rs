use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub const DISPLAY_FORMAT: &str = "%d/%m/%y %H:%M:%S";

#[derive(Error, Debug)]
#[error("invalid ISO-8601 timestamp {input:?}")]
pub struct DateError {
    pub input: String,
}

/// A remote timestamp. Keeps the offset it was sent with so display uses the
/// wall time the server reported, while ordering compares instants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timestamp(DateTime<FixedOffset>);

impl Timestamp {
    pub fn parse(raw: &str) -> Result<Self, DateError> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(Timestamp(dt));
        }
        // No offset given: treat as UTC.
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .map(|naive| Timestamp(naive.and_utc().fixed_offset()))
            .map_err(|_| DateError {
                input: raw.to_string(),
            })
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.0.with_timezone(&Utc)
    }

    pub fn display(&self) -> String {
        self.0.format(DISPLAY_FORMAT).to_string()
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.instant().cmp(&other.instant())
    }
}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_rfc3339())
    }
}

/// `2024-03-01T09:05:30+08:00` -> `01/03/24 09:05:30`.
pub fn format_timestamp(raw: &str) -> Result<String, DateError> {
    Timestamp::parse(raw).map(|ts| ts.display())
}
