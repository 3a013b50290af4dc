//! Caching layer for timetable queries.
//!
//! Planning asks the same questions many times: every squad travelling from
//! the same lodging on the same day scans the same departure board. We cache
//! the full-day board per (day, stop) and filter by time on read, so the
//! cache key never depends on the query time.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache as MokaCache;

use super::{Departure, TimetableQuery};
use crate::domain::{ClockTime, ServiceDay, StopId};

/// Cache key: (service day, stop).
type StopKey = (ServiceDay, StopId);

/// Cached full-day departure board.
type BoardEntry = Arc<Vec<Departure>>;

/// Cached set of stops that reach a destination.
type TransferEntry = Arc<HashSet<StopId>>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries. `None` keeps entries for the cache's lifetime.
    pub ttl: Option<Duration>,

    /// Maximum number of cached entries per table.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: None,
            max_capacity: 10_000,
        }
    }
}

/// Timetable query with caching.
///
/// Wraps any `TimetableQuery` and memoises departure boards and transfer
/// stop sets.
pub struct CachedTimetable<Q> {
    inner: Q,
    boards: MokaCache<StopKey, BoardEntry>,
    transfers: MokaCache<StopKey, TransferEntry>,
}

impl<Q: TimetableQuery> CachedTimetable<Q> {
    /// Create a new cached timetable.
    pub fn new(inner: Q, config: &CacheConfig) -> Self {
        Self {
            inner,
            boards: build_cache(config),
            transfers: build_cache(config),
        }
    }

    /// Full-day departure board, fetched from the inner timetable on a miss.
    fn board(&self, day: ServiceDay, stop: StopId) -> BoardEntry {
        self.boards.get_with((day, stop), || {
            Arc::new(self.inner.trips_from(day, stop, ClockTime::MIDNIGHT))
        })
    }

    /// Access the underlying timetable for operations that bypass cache.
    pub fn inner(&self) -> &Q {
        &self.inner
    }

    /// Get cache statistics.
    pub fn cache_entry_count(&self) -> u64 {
        self.boards.entry_count() + self.transfers.entry_count()
    }
}

fn build_cache<V>(config: &CacheConfig) -> MokaCache<StopKey, V>
where
    V: Clone + Send + Sync + 'static,
{
    let mut builder = MokaCache::builder().max_capacity(config.max_capacity);
    if let Some(ttl) = config.ttl {
        builder = builder.time_to_live(ttl);
    }
    builder.build()
}

impl<Q: TimetableQuery> TimetableQuery for CachedTimetable<Q> {
    fn trips_from(&self, day: ServiceDay, stop: StopId, after: ClockTime) -> Vec<Departure> {
        let board = self.board(day, stop);
        let start = board.partition_point(|d| d.time() < after);
        board[start..].to_vec()
    }

    fn transfer_stops_to(&self, day: ServiceDay, dest: StopId) -> HashSet<StopId> {
        let entry = self.transfers.get_with((day, dest), || {
            Arc::new(self.inner.transfer_stops_to(day, dest))
        });
        (*entry).clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::domain::{RouteId, Stop, StopTime, TripIndex, TripInstance, TripKey};
    use crate::timetable::Timetable;

    /// Counts calls through to the wrapped timetable.
    struct Counting {
        inner: Timetable,
        board_calls: AtomicUsize,
        transfer_calls: AtomicUsize,
    }

    impl TimetableQuery for Counting {
        fn trips_from(&self, day: ServiceDay, stop: StopId, after: ClockTime) -> Vec<Departure> {
            self.board_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.trips_from(day, stop, after)
        }

        fn transfer_stops_to(&self, day: ServiceDay, dest: StopId) -> HashSet<StopId> {
            self.transfer_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.transfer_stops_to(day, dest)
        }
    }

    fn t(s: &str) -> ClockTime {
        ClockTime::parse_hhmm(s).unwrap()
    }

    fn counting() -> Counting {
        let trips = ["09:00", "10:00", "11:00"]
            .iter()
            .enumerate()
            .map(|(i, dep)| {
                let key = TripKey::new(ServiceDay::Saturday, RouteId(1), TripIndex(i as u32 + 1));
                TripInstance::new(
                    key,
                    vec![
                        StopTime { stop: StopId(1), time: t(dep), position: 1 },
                        StopTime {
                            stop: StopId(2),
                            time: t(dep) + chrono::Duration::minutes(15),
                            position: 2,
                        },
                    ],
                )
                .unwrap()
            })
            .collect();
        let inner = Timetable::new(
            vec![Stop::new(StopId(1), "Lodging"), Stop::new(StopId(2), "Hall")],
            trips,
        )
        .unwrap();
        Counting {
            inner,
            board_calls: AtomicUsize::new(0),
            transfer_calls: AtomicUsize::new(0),
        }
    }

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, None);
        assert_eq!(config.max_capacity, 10_000);
    }

    #[test]
    fn board_is_fetched_once_and_filtered_per_query() {
        let cached = CachedTimetable::new(counting(), &CacheConfig::default());

        let all = cached.trips_from(ServiceDay::Saturday, StopId(1), t("08:00"));
        let later = cached.trips_from(ServiceDay::Saturday, StopId(1), t("10:00"));
        let none = cached.trips_from(ServiceDay::Saturday, StopId(1), t("11:01"));

        assert_eq!(all.len(), 3);
        assert_eq!(later.len(), 2);
        assert!(none.is_empty());
        assert_eq!(cached.inner().board_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn matches_uncached_answers() {
        let cached = CachedTimetable::new(counting(), &CacheConfig::default());
        for after in ["00:00", "09:00", "09:30", "10:59"] {
            let a = cached.trips_from(ServiceDay::Saturday, StopId(1), t(after));
            let b = cached.inner().inner.trips_from(ServiceDay::Saturday, StopId(1), t(after));
            let a: Vec<_> = a.iter().map(|d| d.trip.key()).collect();
            let b: Vec<_> = b.iter().map(|d| d.trip.key()).collect();
            assert_eq!(a, b, "after {after}");
        }
    }

    #[test]
    fn transfer_sets_are_memoised() {
        let cached = CachedTimetable::new(counting(), &CacheConfig::default());
        let first = cached.transfer_stops_to(ServiceDay::Saturday, StopId(2));
        let second = cached.transfer_stops_to(ServiceDay::Saturday, StopId(2));
        assert_eq!(first, HashSet::from([StopId(1)]));
        assert_eq!(first, second);
        assert_eq!(cached.inner().transfer_calls.load(Ordering::SeqCst), 1);
    }
}
