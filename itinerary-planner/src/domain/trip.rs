//! Scheduled trip instances.
//!
//! A `TripInstance` is one concrete run of a bus route on one service day,
//! with its ordered stop times. `TripKey` is the identity the capacity
//! ledger counts headcount against.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ClockTime, DomainError, RouteId, ServiceDay, StopId, TripIndex};

/// Identity of a trip instance: (service day, route, trip index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TripKey {
    pub day: ServiceDay,
    pub route: RouteId,
    pub index: TripIndex,
}

impl TripKey {
    /// Creates a new trip key.
    pub fn new(day: ServiceDay, route: RouteId, index: TripIndex) -> Self {
        Self { day, route, index }
    }
}

impl fmt::Display for TripKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.day, self.route, self.index)
    }
}

/// A scheduled stop on a trip instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopTime {
    pub stop: StopId,
    /// Scheduled time at the stop. The timetable carries one time per stop,
    /// used both as arrival and departure.
    pub time: ClockTime,
    /// Stop order along the route, strictly increasing within a trip.
    pub position: u16,
}

/// One concrete scheduled run of a route on one service day.
///
/// # Invariants
///
/// - At least two stops
/// - Stops are sorted by `position`, and times never decrease along the trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripInstance {
    key: TripKey,
    stops: Vec<StopTime>,
}

impl TripInstance {
    /// Construct a trip instance, sorting stops by position and validating times.
    ///
    /// # Errors
    ///
    /// Returns `Err` if there are fewer than two stops or times run backwards.
    pub fn new(key: TripKey, mut stops: Vec<StopTime>) -> Result<Self, DomainError> {
        if stops.len() < 2 {
            return Err(DomainError::TooFewStops(key));
        }

        stops.sort_by_key(|s| s.position);

        if stops.windows(2).any(|w| w[1].time < w[0].time) {
            return Err(DomainError::UnorderedStopTimes(key));
        }

        Ok(Self { key, stops })
    }

    /// Returns the identity of this trip instance.
    pub fn key(&self) -> TripKey {
        self.key
    }

    pub fn day(&self) -> ServiceDay {
        self.key.day
    }

    pub fn route(&self) -> RouteId {
        self.key.route
    }

    pub fn index(&self) -> TripIndex {
        self.key.index
    }

    /// Returns all stop times in route order.
    pub fn stops(&self) -> &[StopTime] {
        &self.stops
    }

    /// Find the first call at a stop strictly after the given stop index.
    ///
    /// Returns the index into `stops()` so candidates can be built without
    /// ambiguity on routes that loop back through a stop.
    pub fn find_stop_after(&self, stop: StopId, after: usize) -> Option<usize> {
        self.stops
            .iter()
            .enumerate()
            .skip(after + 1)
            .find(|(_, st)| st.stop == stop)
            .map(|(i, _)| i)
    }

    /// Returns every index at which this trip calls at `stop`.
    pub fn indices_of(&self, stop: StopId) -> impl Iterator<Item = usize> + '_ {
        self.stops
            .iter()
            .enumerate()
            .filter(move |(_, st)| st.stop == stop)
            .map(|(i, _)| i)
    }
}
