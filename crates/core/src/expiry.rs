//! Presigned URL validity
//!
//! A caller can say how long a presigned URL should live in three ways: a
//! relative span ("15 minutes", "2h", "P1D"), an absolute instant
//! ("2030-01-01T00:00:00Z") or epoch seconds ("1893456000").

use std::str::FromStr;
use std::time::Duration;

use jiff::{Span, Timestamp, tz::TimeZone};

use crate::error::{Error, Result};

/// Default validity of a presigned URL
pub const DEFAULT_EXPIRY: &str = "15 minutes";

/// How long a presigned URL stays valid
#[derive(Debug, Clone)]
pub enum Expiry {
    /// Relative to the moment of signing
    In(Span),
    /// Until an absolute instant
    At(Timestamp),
}

impl Expiry {
    /// Validity relative to now
    pub fn resolve(&self) -> Result<Duration> {
        self.resolve_at(Timestamp::now())
    }

    /// Validity relative to `now`
    pub fn resolve_at(&self, now: Timestamp) -> Result<Duration> {
        let until = match self {
            Expiry::In(span) => now
                .to_zoned(TimeZone::UTC)
                .checked_add(*span)
                .map_err(|e| Error::InvalidExpiry(e.to_string()))?
                .timestamp(),
            Expiry::At(ts) => *ts,
        };

        let remaining = until.duration_since(now);
        Duration::try_from(remaining)
            .ok()
            .filter(|d| !d.is_zero())
            .ok_or_else(|| Error::InvalidExpiry(format!("{until} is not in the future")))
    }
}

impl Default for Expiry {
    fn default() -> Self {
        Expiry::In(Span::new().minutes(15))
    }
}

impl TryFrom<Duration> for Expiry {
    type Error = Error;

    fn try_from(duration: Duration) -> Result<Self> {
        let secs = i64::try_from(duration.as_secs())
            .map_err(|_| Error::InvalidExpiry(format!("{duration:?} is out of range")))?;
        Span::new()
            .try_seconds(secs)
            .map(Expiry::In)
            .map_err(|e| Error::InvalidExpiry(e.to_string()))
    }
}

impl From<Timestamp> for Expiry {
    fn from(ts: Timestamp) -> Self {
        Expiry::At(ts)
    }
}

impl FromStr for Expiry {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidExpiry("empty expiry".into()));
        }

        if s.bytes().all(|b| b.is_ascii_digit()) {
            let secs: i64 = s
                .parse()
                .map_err(|_| Error::InvalidExpiry(format!("epoch seconds out of range: {s}")))?;
            let ts = Timestamp::from_second(secs).map_err(|e| Error::InvalidExpiry(e.to_string()))?;
            return Ok(Expiry::At(ts));
        }

        if let Ok(ts) = s.parse::<Timestamp>() {
            return Ok(Expiry::At(ts));
        }

        let span = s.trim_start_matches('+');
        span.parse::<Span>()
            .map(Expiry::In)
            .map_err(|e| Error::InvalidExpiry(format!("'{s}': {e}")))
    }
}
