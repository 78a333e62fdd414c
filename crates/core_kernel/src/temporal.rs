//! Business clock
//!
//! Age rules are evaluated against "today" in the bank's business timezone,
//! not the server's local time. Every component that needs the current date
//! receives a [`Clock`] so tests can pin it.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

/// Timezone wrapper with string (IANA name) serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl FromStr for Timezone {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tz::from_str(s)
            .map(Timezone)
            .map_err(|_| TemporalError::InvalidTimezone(s.to_string()))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Returns the calendar date of a UTC instant in this timezone
    pub fn date_of(&self, utc: DateTime<Utc>) -> NaiveDate {
        utc.with_timezone(&self.0).date_naive()
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::UTC)
    }
}

/// Errors related to temporal configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
}

/// Source of the current instant and business date
pub trait Clock: Send + Sync {
    /// The current instant
    fn now(&self) -> DateTime<Utc>;

    /// Today's date in the business timezone
    fn today(&self) -> NaiveDate;
}

/// Wall-clock time evaluated in a fixed business timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    timezone: Timezone,
}

impl SystemClock {
    pub fn new(timezone: Timezone) -> Self {
        Self { timezone }
    }

    pub fn timezone(&self) -> Timezone {
        self.timezone
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        self.timezone.date_of(Utc::now())
    }
}

/// A clock pinned to a single instant, for tests and replays
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<Utc>,
    timezone: Timezone,
}

impl FixedClock {
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self {
            instant,
            timezone: Timezone::default(),
        }
    }

    /// Pins the clock to midday UTC of the given date
    pub fn on(date: NaiveDate) -> Self {
        let instant = date
            .and_hms_opt(12, 0, 0)
            .map(|naive| naive.and_utc())
            .unwrap_or_else(Utc::now);
        Self::at(instant)
    }

    pub fn in_timezone(mut self, timezone: Timezone) -> Self {
        self.timezone = timezone;
        self
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }

    fn today(&self) -> NaiveDate {
        self.timezone.date_of(self.instant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timezone_parse_and_serialize() {
        let tz: Timezone = "Europe/Istanbul".parse().unwrap();
        assert_eq!(tz.name(), "Europe/Istanbul");

        let json = serde_json::to_string(&tz).unwrap();
        assert_eq!(json, "\"Europe/Istanbul\"");

        let back: Timezone = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tz);
    }

    #[test]
    fn test_invalid_timezone() {
        let err = "Mars/Olympus".parse::<Timezone>().unwrap_err();
        assert_eq!(err, TemporalError::InvalidTimezone("Mars/Olympus".to_string()));
    }

    #[test]
    fn test_fixed_clock_today_respects_timezone() {
        // 22:30 UTC is already the next day in Istanbul (UTC+3)
        let instant = Utc.with_ymd_and_hms(2024, 3, 10, 22, 30, 0).unwrap();
        let utc_clock = FixedClock::at(instant);
        let local_clock = FixedClock::at(instant)
            .in_timezone("Europe/Istanbul".parse().unwrap());

        assert_eq!(utc_clock.today(), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(local_clock.today(), NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
    }

    #[test]
    fn test_fixed_clock_on_date() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let clock = FixedClock::on(date);
        assert_eq!(clock.today(), date);
        assert_eq!(clock.now(), clock.now());
    }
}
