//! Timetable queries for the planner.
//!
//! The planner never touches timetable storage directly. It asks two narrow
//! questions through [`TimetableQuery`]: which trips leave a stop after a
//! given time, and from which stops a destination can be reached later on
//! the same trip. [`Timetable`] answers them from an in-memory index;
//! [`CachedTimetable`] memoises any implementation.

mod cache;
mod links;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::domain::{ClockTime, ServiceDay, Stop, StopId, TripInstance, TripKey};

pub use cache::{CacheConfig, CachedTimetable};
pub use links::{HallAlias, LinkRow, StopLinks};

/// Errors building a timetable index.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TimetableError {
    /// Two trip instances share the same (day, route, index) identity
    #[error("duplicate trip instance {0}")]
    DuplicateTrip(TripKey),

    /// A trip calls at a stop that is not in the stop list
    #[error("{trip} calls at unknown {stop}")]
    UnknownStop { trip: TripKey, stop: StopId },
}

/// A scheduled departure: a trip instance and the stop index where it is boarded.
#[derive(Debug, Clone)]
pub struct Departure {
    pub trip: Arc<TripInstance>,
    pub board_idx: usize,
}

impl Departure {
    /// Scheduled departure time at the boarding stop.
    pub fn time(&self) -> ClockTime {
        self.trip.stops()[self.board_idx].time
    }

    /// Sort key giving a deterministic total order over departures.
    fn order_key(&self) -> (ClockTime, TripKey, usize) {
        (self.time(), self.trip.key(), self.board_idx)
    }
}

/// Trait for answering timetable questions.
///
/// This abstraction keeps the planner independent of how the timetable is
/// stored, and lets tests supply small hand-built networks.
pub trait TimetableQuery {
    /// Trips boarding at `stop` on `day` at or after `after`.
    ///
    /// Returned in departure order, ties broken by trip key.
    fn trips_from(&self, day: ServiceDay, stop: StopId, after: ClockTime) -> Vec<Departure>;

    /// Stops from which `dest` is reachable later on the same trip on `day`.
    fn transfer_stops_to(&self, day: ServiceDay, dest: StopId) -> HashSet<StopId>;
}

/// In-memory timetable indexed by boarding stop.
#[derive(Debug, Clone, Default)]
pub struct Timetable {
    stops: HashMap<StopId, Stop>,
    trips: BTreeMap<TripKey, Arc<TripInstance>>,
    /// Every (trip, stop index) pair keyed by (day, stop), sorted by departure.
    boards: HashMap<(ServiceDay, StopId), Vec<Departure>>,
}

impl Timetable {
    /// Build the index from stops and trip instances.
    ///
    /// # Errors
    ///
    /// Returns `Err` on duplicate trip identities or calls at unknown stops.
    pub fn new(stops: Vec<Stop>, trips: Vec<TripInstance>) -> Result<Self, TimetableError> {
        let stops: HashMap<StopId, Stop> = stops.into_iter().map(|s| (s.id, s)).collect();
        let mut by_key = BTreeMap::new();
        let mut boards: HashMap<(ServiceDay, StopId), Vec<Departure>> = HashMap::new();

        for trip in trips {
            let key = trip.key();
            if by_key.contains_key(&key) {
                return Err(TimetableError::DuplicateTrip(key));
            }
            if let Some(unknown) = trip.stops().iter().find(|st| !stops.contains_key(&st.stop)) {
                return Err(TimetableError::UnknownStop {
                    trip: key,
                    stop: unknown.stop,
                });
            }

            let trip = Arc::new(trip);
            // The last stop is never a boarding point.
            for (idx, st) in trip.stops().iter().enumerate().take(trip.stops().len() - 1) {
                boards.entry((key.day, st.stop)).or_default().push(Departure {
                    trip: trip.clone(),
                    board_idx: idx,
                });
            }
            by_key.insert(key, trip);
        }

        for departures in boards.values_mut() {
            departures.sort_by_key(|d| d.order_key());
        }

        Ok(Self {
            stops,
            trips: by_key,
            boards,
        })
    }

    /// Look up a stop by id.
    pub fn stop(&self, id: StopId) -> Option<&Stop> {
        self.stops.get(&id)
    }

    /// Display label for a stop, falling back to its id.
    pub fn stop_label(&self, id: StopId) -> String {
        self.stop(id)
            .map(|s| s.label().to_string())
            .unwrap_or_else(|| id.to_string())
    }

    /// All stops, in no particular order.
    pub fn stops(&self) -> impl Iterator<Item = &Stop> {
        self.stops.values()
    }

    /// Look up a trip instance by identity.
    pub fn trip(&self, key: &TripKey) -> Option<&Arc<TripInstance>> {
        self.trips.get(key)
    }

    /// Returns the number of trip instances.
    pub fn trip_count(&self) -> usize {
        self.trips.len()
    }

    /// Returns true if there are no trip instances.
    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    /// Full-day departure board for a stop.
    pub fn board(&self, day: ServiceDay, stop: StopId) -> &[Departure] {
        self.boards.get(&(day, stop)).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl TimetableQuery for Timetable {
    fn trips_from(&self, day: ServiceDay, stop: StopId, after: ClockTime) -> Vec<Departure> {
        let board = self.board(day, stop);
        let start = board.partition_point(|d| d.time() < after);
        board[start..].to_vec()
    }

    fn transfer_stops_to(&self, day: ServiceDay, dest: StopId) -> HashSet<StopId> {
        let mut result = HashSet::new();
        for trip in self.trips.values().filter(|t| t.day() == day) {
            for dest_idx in trip.indices_of(dest) {
                result.extend(trip.stops()[..dest_idx].iter().map(|st| st.stop));
            }
        }
        result.remove(&dest);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RouteId, StopTime, TripIndex};

    fn t(s: &str) -> ClockTime {
        ClockTime::parse_hhmm(s).unwrap()
    }

    fn stops(ids: &[u32]) -> Vec<Stop> {
        ids.iter()
            .map(|id| Stop::new(StopId(*id), format!("Stop {id}")))
            .collect()
    }

    fn trip(day: ServiceDay, route: u32, index: u32, calls: &[(u32, &str)]) -> TripInstance {
        let key = TripKey::new(day, RouteId(route), TripIndex(index));
        let stops = calls
            .iter()
            .enumerate()
            .map(|(i, (stop, time))| StopTime {
                stop: StopId(*stop),
                time: t(time),
                position: i as u16 + 1,
            })
            .collect();
        TripInstance::new(key, stops).unwrap()
    }

    fn sample() -> Timetable {
        Timetable::new(
            stops(&[1, 2, 3, 4]),
            vec![
                trip(ServiceDay::Saturday, 1, 2, &[(1, "10:00"), (2, "10:10"), (3, "10:20")]),
                trip(ServiceDay::Saturday, 1, 1, &[(1, "09:00"), (2, "09:10"), (3, "09:20")]),
                trip(ServiceDay::Saturday, 2, 1, &[(4, "09:00"), (2, "09:30")]),
                trip(ServiceDay::Friday, 1, 1, &[(1, "09:00"), (3, "09:20")]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn trips_from_in_departure_order() {
        let tt = sample();
        let deps = tt.trips_from(ServiceDay::Saturday, StopId(1), t("08:00"));
        let times: Vec<String> = deps.iter().map(|d| d.time().to_string()).collect();
        assert_eq!(times, vec!["09:00", "10:00"]);
    }

    #[test]
    fn trips_from_respects_after_bound() {
        let tt = sample();
        let deps = tt.trips_from(ServiceDay::Saturday, StopId(1), t("09:01"));
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].trip.index(), TripIndex(2));

        // Inclusive bound
        let deps = tt.trips_from(ServiceDay::Saturday, StopId(2), t("09:10"));
        assert_eq!(deps.len(), 2);
    }

    #[test]
    fn last_stop_is_not_a_boarding_point() {
        let tt = sample();
        assert!(tt.trips_from(ServiceDay::Saturday, StopId(3), t("00:00")).is_empty());
    }

    #[test]
    fn days_are_separate() {
        let tt = sample();
        let deps = tt.trips_from(ServiceDay::Friday, StopId(1), t("00:00"));
        assert_eq!(deps.len(), 1);
        assert!(tt.trips_from(ServiceDay::Sunday, StopId(1), t("00:00")).is_empty());
    }

    #[test]
    fn transfer_stops() {
        let tt = sample();
        let to_three = tt.transfer_stops_to(ServiceDay::Saturday, StopId(3));
        assert_eq!(to_three, HashSet::from([StopId(1), StopId(2)]));

        let to_two = tt.transfer_stops_to(ServiceDay::Saturday, StopId(2));
        assert_eq!(to_two, HashSet::from([StopId(1), StopId(4)]));

        assert!(tt.transfer_stops_to(ServiceDay::Saturday, StopId(4)).is_empty());
    }

    #[test]
    fn rejects_duplicate_trip() {
        let result = Timetable::new(
            stops(&[1, 2]),
            vec![
                trip(ServiceDay::Saturday, 1, 1, &[(1, "09:00"), (2, "09:10")]),
                trip(ServiceDay::Saturday, 1, 1, &[(1, "10:00"), (2, "10:10")]),
            ],
        );
        assert!(matches!(result, Err(TimetableError::DuplicateTrip(_))));
    }

    #[test]
    fn rejects_unknown_stop() {
        let result = Timetable::new(
            stops(&[1]),
            vec![trip(ServiceDay::Saturday, 1, 1, &[(1, "09:00"), (2, "09:10")])],
        );
        assert!(matches!(
            result,
            Err(TimetableError::UnknownStop { stop: StopId(2), .. })
        ));
    }

    #[test]
    fn stop_labels() {
        let tt = sample();
        assert_eq!(tt.stop_label(StopId(2)), "Stop 2");
        assert_eq!(tt.stop_label(StopId(99)), "stop#99");
        assert_eq!(tt.trip_count(), 4);
        assert!(!tt.is_empty());
    }
}
