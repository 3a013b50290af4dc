//! Tournament service days.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown service day code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid service day: {0:?}")]
pub struct InvalidServiceDay(String);

/// One operating day of the tournament.
///
/// The timetable, the fixture list and all itinerary segments are keyed by
/// service day. Ordering follows the tournament calendar (Friday first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ServiceDay {
    #[serde(rename = "fri")]
    Friday,
    #[serde(rename = "sat")]
    Saturday,
    #[serde(rename = "sun")]
    Sunday,
}

impl ServiceDay {
    /// All service days in calendar order.
    pub const ALL: [ServiceDay; 3] = [ServiceDay::Friday, ServiceDay::Saturday, ServiceDay::Sunday];

    /// Parse a short day code ("fri", "sat", "sun").
    ///
    /// ```
    /// use itinerary_planner::domain::ServiceDay;
    ///
    /// assert_eq!(ServiceDay::parse("sat").unwrap(), ServiceDay::Saturday);
    /// assert!(ServiceDay::parse("mon").is_err());
    /// ```
    pub fn parse(code: &str) -> Result<Self, InvalidServiceDay> {
        match code {
            "fri" => Ok(ServiceDay::Friday),
            "sat" => Ok(ServiceDay::Saturday),
            "sun" => Ok(ServiceDay::Sunday),
            other => Err(InvalidServiceDay(other.to_string())),
        }
    }

    /// The short day code used in datasets.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceDay::Friday => "fri",
            ServiceDay::Saturday => "sat",
            ServiceDay::Sunday => "sun",
        }
    }

    /// Position in the tournament calendar, starting at 1.
    pub fn rank(&self) -> u8 {
        match self {
            ServiceDay::Friday => 1,
            ServiceDay::Saturday => 2,
            ServiceDay::Sunday => 3,
        }
    }
}

impl fmt::Display for ServiceDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
