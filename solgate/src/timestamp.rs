//! UTC timestamps for session expiry and payment records.
//!
//! The gateway is not consistent about how it writes times, so [`Timestamp`]
//! deserializes leniently:
//!
//! - RFC 3339 strings (`"2025-01-01T00:00:00Z"`)
//! - integer seconds since the Unix epoch (`1735689600` or `"1735689600"`)
//! - integer milliseconds since the epoch (`1735689600000`), recognised by magnitude
//!
//! It always serializes as an RFC 3339 string.

use std::fmt::{Display, Formatter};
use std::ops::Add;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Integers at or above this value are read as milliseconds.
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// A point in time, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current system time.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from seconds since the Unix epoch.
    ///
    /// Returns `None` if the value is out of range.
    #[must_use]
    pub fn from_secs(secs: i64) -> Option<Self> {
        Utc.timestamp_opt(secs, 0).single().map(Self)
    }

    /// Creates a timestamp from milliseconds since the Unix epoch.
    ///
    /// Returns `None` if the value is out of range.
    #[must_use]
    pub fn from_millis(millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis).single().map(Self)
    }

    /// Seconds since the Unix epoch.
    #[must_use]
    pub fn as_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Returns the inner [`DateTime`].
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Time left until this timestamp, measured from `now`.
    ///
    /// Zero when the timestamp is not in the future.
    #[must_use]
    pub fn duration_since(&self, now: Self) -> Duration {
        (self.0 - now.0).to_std().unwrap_or(Duration::ZERO)
    }

    fn from_integer(value: i64) -> Option<Self> {
        if value.unsigned_abs() >= MILLIS_THRESHOLD.unsigned_abs() {
            Self::from_millis(value)
        } else {
            Self::from_secs(value)
        }
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

impl Add<Duration> for Timestamp {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        let delta = chrono::Duration::from_std(rhs).unwrap_or(chrono::Duration::MAX);
        Self(self.0.checked_add_signed(delta).unwrap_or(DateTime::<Utc>::MAX_UTC))
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(TimestampVisitor)
    }
}

struct TimestampVisitor;

impl Visitor<'_> for TimestampVisitor {
    type Value = Timestamp;

    fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("an RFC 3339 string or an integer Unix timestamp")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Timestamp::from_integer(v).ok_or_else(|| E::custom("timestamp out of range"))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        let v = i64::try_from(v).map_err(|_| E::custom("timestamp out of range"))?;
        self.visit_i64(v)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        self.visit_i64(v.trunc() as i64)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        if let Ok(int) = v.trim().parse::<i64>() {
            return self.visit_i64(int);
        }
        DateTime::parse_from_rfc3339(v)
            .map(|dt| Timestamp(dt.with_timezone(&Utc)))
            .map_err(|e| E::custom(format!("invalid timestamp {v:?}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_rfc3339() {
        let ts: Timestamp = serde_json::from_str("\"2025-01-01T00:00:00Z\"").unwrap();
        assert_eq!(ts.as_secs(), 1_735_689_600);
    }

    #[test]
    fn test_deserialize_rfc3339_with_offset() {
        let ts: Timestamp = serde_json::from_str("\"2025-01-01T02:00:00+02:00\"").unwrap();
        assert_eq!(ts.as_secs(), 1_735_689_600);
    }

    #[test]
    fn test_deserialize_integer_seconds_and_millis() {
        let secs: Timestamp = serde_json::from_str("1735689600").unwrap();
        let millis: Timestamp = serde_json::from_str("1735689600000").unwrap();
        let string: Timestamp = serde_json::from_str("\"1735689600\"").unwrap();
        assert_eq!(secs, millis);
        assert_eq!(secs, string);
    }

    #[test]
    fn test_deserialize_garbage_fails() {
        let result: Result<Timestamp, _> = serde_json::from_str("\"tomorrow\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_extreme_integers_fail() {
        for raw in ["-9223372036854775808", "9223372036854775807"] {
            let result: Result<Timestamp, _> = serde_json::from_str(raw);
            assert!(result.is_err(), "{raw}");
        }
        let negative_millis: Timestamp = serde_json::from_str("-1735689600000").unwrap();
        assert_eq!(negative_millis, Timestamp::from_secs(-1_735_689_600).unwrap());
    }

    #[test]
    fn test_serializes_as_rfc3339() {
        let ts = Timestamp::from_secs(1_735_689_600).unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2025-01-01T00:00:00+00:00\"");
    }

    #[test]
    fn test_duration_since_saturates() {
        let now = Timestamp::now();
        let later = now + Duration::from_secs(60);
        assert_eq!(later.duration_since(now), Duration::from_secs(60));
        assert_eq!(now.duration_since(later), Duration::ZERO);
    }
}
