//! Shared bus capacity ledger.
//!
//! Every squad planned in a run commits its headcount to the trip instances
//! it rides. The ledger is the single source of truth for those loads; the
//! planner holds it by `&mut` for the duration of a run so commits and
//! releases are never interleaved between squads.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::TripKey;

/// Committed headcount per trip instance.
#[derive(Debug, Clone)]
pub struct CapacityLedger {
    limit: u32,
    loads: BTreeMap<TripKey, u32>,
}

impl CapacityLedger {
    /// Create an empty ledger with a per-trip headcount limit.
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            loads: BTreeMap::new(),
        }
    }

    /// Returns the per-trip headcount limit.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Committed headcount on a trip instance (zero if never used).
    pub fn current(&self, key: &TripKey) -> u32 {
        self.loads.get(key).copied().unwrap_or(0)
    }

    /// Would committing `headcount` keep the trip within the limit?
    pub fn fits(&self, key: &TripKey, headcount: u32) -> bool {
        self.current(key).saturating_add(headcount) <= self.limit
    }

    /// Commit headcount to a trip.
    ///
    /// Rides with no trip identity (charters) always succeed and change
    /// nothing. Otherwise the commit succeeds if it fits under the limit, or
    /// unconditionally when `force` is set.
    pub fn assign(&mut self, key: Option<TripKey>, headcount: u32, force: bool) -> bool {
        let Some(key) = key else {
            return true;
        };
        if !force && !self.fits(&key, headcount) {
            return false;
        }
        let load = self.loads.entry(key).or_insert(0);
        *load = load.saturating_add(headcount);
        debug!(trip = %key, headcount, load = *load, force, "committed");
        true
    }

    /// Release previously committed headcount, never going below zero.
    pub fn release(&mut self, key: Option<TripKey>, headcount: u32) {
        let Some(key) = key else {
            return;
        };
        if let Some(load) = self.loads.get_mut(&key) {
            *load = load.saturating_sub(headcount);
            debug!(trip = %key, headcount, load = *load, "released");
            if *load == 0 {
                self.loads.remove(&key);
            }
        }
    }

    /// Non-zero loads in trip key order.
    pub fn loads(&self) -> impl Iterator<Item = (TripKey, u32)> + '_ {
        self.loads.iter().map(|(k, v)| (*k, *v))
    }

    /// Trips loaded beyond the limit (only possible through forced commits).
    pub fn over_limit(&self) -> Vec<(TripKey, u32)> {
        self.loads().filter(|(_, load)| *load > self.limit).collect()
    }

    /// Total committed headcount across all trips.
    pub fn total(&self) -> u64 {
        self.loads.values().map(|v| u64::from(*v)).sum()
    }

    /// Returns true if nothing is committed.
    pub fn is_empty(&self) -> bool {
        self.loads.is_empty()
    }
}
