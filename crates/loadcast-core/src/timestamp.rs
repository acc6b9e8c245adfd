//! ISO-8601 timestamps as they arrive on the wire.
//!
//! A `Timestamp` keeps the wall-clock fields exactly as written plus the
//! UTC offset, if any. Feature extraction reads the wall-clock fields in
//! the timestamp's own offset; nothing is converted to UTC.

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike,
};
use thiserror::Error;

/// Offset-bearing layouts tried after RFC 3339 fails, in order. Covers
/// minute precision and the basic `+HHMM` offset form.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%d %H:%M%z",
];

/// Naive layouts tried after the offset layouts, in order.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Errors produced while reading or shifting a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid timestamp '{0}'")]
    Invalid(String),

    #[error("timestamp '{0}' is out of range")]
    OutOfRange(String),
}

/// A parsed ISO-8601 date-time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    local: NaiveDateTime,
    offset: Option<FixedOffset>,
}

impl Timestamp {
    /// Parse an ISO-8601 string. A trailing `Z` means `+00:00`.
    /// Surrounding whitespace is rejected.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        if raw.starts_with(char::is_whitespace) || raw.ends_with(char::is_whitespace) {
            return Err(ParseError::Invalid(raw.to_string()));
        }

        let zoned;
        let s = match raw.strip_suffix(['Z', 'z']) {
            Some(rest) => {
                zoned = format!("{rest}+00:00");
                zoned.as_str()
            }
            None => raw,
        };

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self::from_fixed(dt));
        }

        for fmt in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
                return Ok(Self::from_fixed(dt));
            }
        }

        for fmt in NAIVE_FORMATS {
            if let Ok(local) = NaiveDateTime::parse_from_str(s, fmt) {
                return Ok(Self {
                    local,
                    offset: None,
                });
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(Self {
                local: date.and_time(NaiveTime::MIN),
                offset: None,
            });
        }

        Err(ParseError::Invalid(raw.to_string()))
    }

    fn from_fixed(dt: DateTime<FixedOffset>) -> Self {
        Self {
            local: dt.naive_local(),
            offset: Some(*dt.offset()),
        }
    }

    /// Hour of day, 0-23.
    pub fn hour(&self) -> u32 {
        self.local.hour()
    }

    /// Minute of hour, 0-59.
    pub fn minute(&self) -> u32 {
        self.local.minute()
    }

    /// Day of week, Monday = 0 through Sunday = 6.
    pub fn weekday(&self) -> u32 {
        self.local.weekday().num_days_from_monday()
    }

    /// UTC offset, `None` for naive timestamps.
    pub fn offset(&self) -> Option<FixedOffset> {
        self.offset
    }

    /// Shift forward by `minutes`, keeping the same offset.
    pub fn plus_minutes(&self, minutes: i64) -> Result<Self, ParseError> {
        let local = TimeDelta::try_minutes(minutes)
            .and_then(|delta| self.local.checked_add_signed(delta))
            .ok_or_else(|| ParseError::OutOfRange(self.to_string()))?;
        Ok(Self {
            local,
            offset: self.offset,
        })
    }
}

impl fmt::Display for Timestamp {
    /// `YYYY-MM-DDTHH:MM:SS[.ffffff][Z|±HH:MM]`; microseconds only when
    /// non-zero, and a zero offset is written as `Z`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.local.format("%Y-%m-%dT%H:%M:%S"))?;

        let micros = (self.local.nanosecond() % 1_000_000_000) / 1_000;
        if micros != 0 {
            write!(f, ".{micros:06}")?;
        }

        if let Some(offset) = self.offset {
            let total = offset.local_minus_utc();
            if total == 0 {
                f.write_str("Z")?;
            } else {
                let sign = if total < 0 { '-' } else { '+' };
                let abs = total.unsigned_abs();
                write!(f, "{sign}{:02}:{:02}", abs / 3600, (abs % 3600) / 60)?;
                if abs % 60 != 0 {
                    write!(f, ":{:02}", abs % 60)?;
                }
            }
        }
        Ok(())
    }
}

impl FromStr for Timestamp {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
