//! Trip candidate type.
//!
//! A `TripCandidate` is a single bus ride from boarding to alighting on one
//! trip instance. It uses `Arc<TripInstance>` so candidate lists can be
//! cloned and cached cheaply.

use std::sync::Arc;

use super::{ClockTime, DomainError, RouteId, ServiceDay, StopId, TripIndex, TripInstance, TripKey};

/// A ride on one trip instance.
///
/// Times are validated at construction.
///
/// # Invariants
///
/// - `alight_idx > board_idx` (must travel forward along the route)
/// - Both indices are valid for the trip's stops
#[derive(Debug, Clone)]
pub struct TripCandidate {
    trip: Arc<TripInstance>,
    board_idx: usize,
    alight_idx: usize,
}

impl TripCandidate {
    /// Construct a candidate, validating that indices are in order and in bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use itinerary_planner::domain::{
    ///     ClockTime, RouteId, ServiceDay, StopId, StopTime, TripCandidate, TripIndex,
    ///     TripInstance, TripKey,
    /// };
    /// use std::sync::Arc;
    ///
    /// let key = TripKey::new(ServiceDay::Friday, RouteId(1), TripIndex(1));
    /// let trip = TripInstance::new(
    ///     key,
    ///     vec![
    ///         StopTime { stop: StopId(1), time: ClockTime::parse_hhmm("10:00").unwrap(), position: 1 },
    ///         StopTime { stop: StopId(2), time: ClockTime::parse_hhmm("10:25").unwrap(), position: 2 },
    ///     ],
    /// )
    /// .unwrap();
    ///
    /// let ride = TripCandidate::new(Arc::new(trip), 0, 1).unwrap();
    /// assert_eq!(ride.departure_time().to_string(), "10:00");
    /// assert_eq!(ride.travel_minutes(), 25);
    /// ```
    pub fn new(
        trip: Arc<TripInstance>,
        board_idx: usize,
        alight_idx: usize,
    ) -> Result<Self, DomainError> {
        if alight_idx <= board_idx {
            return Err(DomainError::InvalidCandidate(
                "alight index must be after board index",
            ));
        }
        if alight_idx >= trip.stops().len() {
            return Err(DomainError::InvalidStopIndex(trip.key()));
        }

        Ok(Self {
            trip,
            board_idx,
            alight_idx,
        })
    }

    /// Returns the trip instance this ride is on.
    pub fn trip(&self) -> &Arc<TripInstance> {
        &self.trip
    }

    /// Returns the ledger key of the trip instance.
    pub fn key(&self) -> TripKey {
        self.trip.key()
    }

    pub fn day(&self) -> ServiceDay {
        self.trip.day()
    }

    pub fn route(&self) -> RouteId {
        self.trip.route()
    }

    pub fn trip_index(&self) -> TripIndex {
        self.trip.index()
    }

    /// Returns the boarding stop.
    pub fn origin(&self) -> StopId {
        self.trip.stops()[self.board_idx].stop
    }

    /// Returns the alighting stop.
    pub fn destination(&self) -> StopId {
        self.trip.stops()[self.alight_idx].stop
    }

    /// Returns the boarding stop index.
    pub fn board_idx(&self) -> usize {
        self.board_idx
    }

    /// Returns the alighting stop index.
    pub fn alight_idx(&self) -> usize {
        self.alight_idx
    }

    pub fn departure_time(&self) -> ClockTime {
        self.trip.stops()[self.board_idx].time
    }

    pub fn arrival_time(&self) -> ClockTime {
        self.trip.stops()[self.alight_idx].time
    }

    /// Minutes on board, arrival minus departure.
    pub fn travel_minutes(&self) -> i64 {
        self.arrival_time().minutes_since(self.departure_time())
    }

    /// Returns the number of intermediate stops (excluding board and alight).
    pub fn intermediate_stop_count(&self) -> usize {
        self.alight_idx - self.board_idx - 1
    }
}

impl PartialEq for TripCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.trip.key() == other.trip.key()
            && self.board_idx == other.board_idx
            && self.alight_idx == other.alight_idx
    }
}

impl Eq for TripCandidate {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StopTime;

    fn t(s: &str) -> ClockTime {
        ClockTime::parse_hhmm(s).unwrap()
    }

    fn make_trip() -> Arc<TripInstance> {
        let key = TripKey::new(ServiceDay::Saturday, RouteId(3), TripIndex(2));
        let stops = [("08:00", 10), ("08:12", 11), ("08:30", 12), ("08:41", 13)]
            .iter()
            .enumerate()
            .map(|(i, (time, stop))| StopTime {
                stop: StopId(*stop),
                time: t(time),
                position: i as u16 + 1,
            })
            .collect();
        Arc::new(TripInstance::new(key, stops).unwrap())
    }

    #[test]
    fn valid_candidate() {
        let ride = TripCandidate::new(make_trip(), 1, 3).unwrap();
        assert_eq!(ride.origin(), StopId(11));
        assert_eq!(ride.destination(), StopId(13));
        assert_eq!(ride.departure_time(), t("08:12"));
        assert_eq!(ride.arrival_time(), t("08:41"));
        assert_eq!(ride.travel_minutes(), 29);
        assert_eq!(ride.intermediate_stop_count(), 1);
        assert_eq!(ride.route(), RouteId(3));
        assert_eq!(ride.trip_index(), TripIndex(2));
    }

    #[test]
    fn rejects_backwards_ride() {
        assert!(matches!(
            TripCandidate::new(make_trip(), 2, 1),
            Err(DomainError::InvalidCandidate(_))
        ));
        assert!(matches!(
            TripCandidate::new(make_trip(), 2, 2),
            Err(DomainError::InvalidCandidate(_))
        ));
    }

    #[test]
    fn rejects_out_of_bounds() {
        assert!(matches!(
            TripCandidate::new(make_trip(), 0, 4),
            Err(DomainError::InvalidStopIndex(_))
        ));
    }

    #[test]
    fn equality_by_key_and_indices() {
        let trip = make_trip();
        let a = TripCandidate::new(trip.clone(), 0, 2).unwrap();
        let b = TripCandidate::new(trip.clone(), 0, 2).unwrap();
        let c = TripCandidate::new(trip, 0, 3).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
