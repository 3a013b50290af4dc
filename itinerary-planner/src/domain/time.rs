//! Clock time handling for the tournament timetable.
//!
//! Every time in the input datasets is an "HH:MM" string relative to the
//! service day it belongs to. Planning arithmetic happens in whole minutes
//! since midnight, so this module wraps that count in a validated type.

use chrono::Duration;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Sub};

/// Minutes in one day.
const MINUTES_PER_DAY: i64 = 24 * 60;

/// Latest representable minute. Activities may run past midnight into the
/// small hours of the following calendar date without changing service day.
const MAX_MINUTES: i64 = 2 * MINUTES_PER_DAY - 1;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A time of day within one service day, at minute resolution.
///
/// Arithmetic saturates at midnight (start of the service day) and at the end
/// of the following day, so subtracting a buffer from an early kickoff never
/// produces a negative time.
///
/// # Examples
///
/// ```
/// use itinerary_planner::domain::ClockTime;
/// use chrono::Duration;
///
/// let kickoff = ClockTime::parse_hhmm("18:00").unwrap();
/// let deadline = kickoff - Duration::minutes(40);
/// assert_eq!(deadline.to_string(), "17:20");
/// assert_eq!(kickoff.minutes_since(deadline), 40);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(i64);

impl ClockTime {
    /// Midnight at the start of the service day.
    pub const MIDNIGHT: ClockTime = ClockTime(0);

    /// Create a time from minutes since midnight, clamped to the valid range.
    pub fn from_minutes(minutes: i64) -> Self {
        Self(minutes.clamp(0, MAX_MINUTES))
    }

    /// Parse a time from "HH:MM" format.
    ///
    /// Hours 24-47 denote the small hours after midnight, still within the
    /// same service day.
    ///
    /// # Examples
    ///
    /// ```
    /// use itinerary_planner::domain::ClockTime;
    ///
    /// assert!(ClockTime::parse_hhmm("00:00").is_ok());
    /// assert!(ClockTime::parse_hhmm("23:59").is_ok());
    /// assert_eq!(ClockTime::parse_hhmm("24:15").unwrap().minutes(), 1455);
    ///
    /// assert!(ClockTime::parse_hhmm("1430").is_err());
    /// assert!(ClockTime::parse_hhmm("14:3").is_err());
    /// assert!(ClockTime::parse_hhmm("48:00").is_err());
    /// ```
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        // Must be exactly 5 characters: HH:MM
        if s.len() != 5 {
            return Err(TimeError::new("expected HH:MM format"));
        }

        let bytes = s.as_bytes();

        if bytes[2] != b':' {
            return Err(TimeError::new("expected colon at position 2"));
        }

        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        if hour > 47 {
            return Err(TimeError::new("hour must be 0-47"));
        }

        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        Ok(Self(i64::from(hour) * 60 + i64::from(minute)))
    }

    /// Minutes since midnight of the service day.
    pub fn minutes(&self) -> i64 {
        self.0
    }

    /// Returns the hour within the service day (0-47).
    pub fn hour(&self) -> u32 {
        (self.0 / 60) as u32
    }

    /// Returns the wall-clock minute (0-59).
    pub fn minute(&self) -> u32 {
        (self.0 % 60) as u32
    }

    /// Signed minutes from `other` to `self`.
    ///
    /// Negative if `other` is later than `self`.
    pub fn minutes_since(&self, other: Self) -> i64 {
        self.0 - other.0
    }

    /// Returns the duration between two times.
    pub fn signed_duration_since(&self, other: Self) -> Duration {
        Duration::minutes(self.minutes_since(other))
    }
}

impl Add<Duration> for ClockTime {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self::from_minutes(self.0.saturating_add(rhs.num_minutes()))
    }
}

impl Sub<Duration> for ClockTime {
    type Output = Self;

    fn sub(self, rhs: Duration) -> Self::Output {
        Self::from_minutes(self.0.saturating_sub(rhs.num_minutes()))
    }
}

impl fmt::Debug for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClockTime({:02}:{:02})", self.hour(), self.minute())
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ClockTime::parse_hhmm(&s).map_err(serde::de::Error::custom)
    }
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> ClockTime {
        ClockTime::parse_hhmm(s).unwrap()
    }

    #[test]
    fn parse_valid_times() {
        assert_eq!(t("00:00").minutes(), 0);
        assert_eq!(t("09:05").minutes(), 545);
        assert_eq!(t("23:59").minutes(), 1439);
        assert_eq!(t("24:00").minutes(), 1440);
        assert_eq!(t("47:59").minutes(), MAX_MINUTES);
    }

    #[test]
    fn reject_malformed_times() {
        assert!(ClockTime::parse_hhmm("").is_err());
        assert!(ClockTime::parse_hhmm("9:05").is_err());
        assert!(ClockTime::parse_hhmm("09-05").is_err());
        assert!(ClockTime::parse_hhmm("48:00").is_err());
        assert!(ClockTime::parse_hhmm("12:60").is_err());
        assert!(ClockTime::parse_hhmm("ab:cd").is_err());
    }

    #[test]
    fn subtraction_saturates_at_midnight() {
        let early = t("00:20");
        assert_eq!(early - Duration::minutes(40), ClockTime::MIDNIGHT);
    }

    #[test]
    fn times_past_midnight_keep_their_order() {
        let late = t("23:50") + Duration::minutes(25);
        assert_eq!(late.minutes(), 1465);
        assert_eq!(late.to_string(), "24:15");
        assert!(late > t("23:50"));

        let json = serde_json::to_string(&late).unwrap();
        assert_eq!(json, "\"24:15\"");
        let back: ClockTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, late);
        assert!(back > t("23:50"));
    }

    #[test]
    fn upper_bound_saturates() {
        let end = t("47:30") + Duration::minutes(60);
        assert_eq!(end.to_string(), "47:59");
    }

    #[test]
    fn signed_durations() {
        assert_eq!(t("18:00").minutes_since(t("17:25")), 35);
        assert_eq!(t("17:25").minutes_since(t("18:00")), -35);
        assert_eq!(
            t("18:00").signed_duration_since(t("17:20")),
            Duration::minutes(40)
        );
    }

    #[test]
    fn serde_uses_hhmm_strings() {
        let json = serde_json::to_string(&t("07:45")).unwrap();
        assert_eq!(json, "\"07:45\"");
        let back: ClockTime = serde_json::from_str("\"07:45\"").unwrap();
        assert_eq!(back, t("07:45"));
        assert!(serde_json::from_str::<ClockTime>("\"7:45\"").is_err());
    }

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", t("08:03")), "ClockTime(08:03)");
    }
}
