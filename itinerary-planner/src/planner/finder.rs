//! Trip search over the timetable.
//!
//! Answers "which scheduled rides go from here to there in this window",
//! and commits the first one that fits under the capacity ledger.

use tracing::debug;

use crate::domain::{ClockTime, ServiceDay, StopId, TripCandidate};
use crate::timetable::TimetableQuery;

use super::config::PlannerConfig;
use super::ledger::CapacityLedger;

/// Which candidates a selection tries first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preference {
    /// Earliest departure first (timetable order).
    #[default]
    EarliestDeparture,
    /// Earliest arrival first, departure breaking ties.
    EarliestArrival,
}

/// A request for one ride between two stops.
#[derive(Debug, Clone)]
pub struct RideRequest {
    pub day: ServiceDay,
    pub origin: StopId,
    pub destination: StopId,
    /// Board no earlier than this.
    pub earliest: ClockTime,
    /// Arrive no later than this, if set.
    pub latest: Option<ClockTime>,
    /// Arrive no earlier than this, if set.
    pub min_arrival: Option<ClockTime>,
    pub headcount: u32,
    /// Take the first candidate over capacity when nothing fits.
    pub allow_force: bool,
    pub prefer: Preference,
}

impl RideRequest {
    /// Create a request with no arrival bounds, no forcing and timetable order.
    pub fn new(
        day: ServiceDay,
        origin: StopId,
        destination: StopId,
        earliest: ClockTime,
        headcount: u32,
    ) -> Self {
        Self {
            day,
            origin,
            destination,
            earliest,
            latest: None,
            min_arrival: None,
            headcount,
            allow_force: false,
            prefer: Preference::default(),
        }
    }

    pub fn arriving_by(mut self, latest: ClockTime) -> Self {
        self.latest = Some(latest);
        self
    }

    pub fn arriving_after(mut self, min_arrival: ClockTime) -> Self {
        self.min_arrival = Some(min_arrival);
        self
    }

    pub fn forcing(mut self) -> Self {
        self.allow_force = true;
        self
    }

    pub fn preferring(mut self, prefer: Preference) -> Self {
        self.prefer = prefer;
        self
    }
}

/// A ride committed to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ride {
    pub candidate: TripCandidate,
    /// Committed over the capacity limit.
    pub forced: bool,
}

/// Finds and commits scheduled rides.
pub struct TripFinder<'a, Q: TimetableQuery> {
    timetable: &'a Q,
    config: &'a PlannerConfig,
}

impl<'a, Q: TimetableQuery> TripFinder<'a, Q> {
    /// Create a new finder.
    pub fn new(timetable: &'a Q, config: &'a PlannerConfig) -> Self {
        Self { timetable, config }
    }

    /// Direct rides from `origin` to `destination` in departure order.
    ///
    /// Only rides boarding at or after `earliest`, arriving inside
    /// `[min_arrival, latest]` and taking some time are returned. A trip that calls at the origin
    /// more than once yields one candidate per boarding point.
    pub fn find_direct(
        &self,
        day: ServiceDay,
        origin: StopId,
        destination: StopId,
        earliest: ClockTime,
        latest: Option<ClockTime>,
        min_arrival: Option<ClockTime>,
    ) -> Vec<TripCandidate> {
        if origin == destination {
            return Vec::new();
        }

        let mut candidates: Vec<TripCandidate> = self
            .timetable
            .trips_from(day, origin, earliest)
            .into_iter()
            .filter_map(|dep| {
                let alight = dep.trip.find_stop_after(destination, dep.board_idx)?;
                TripCandidate::new(dep.trip, dep.board_idx, alight).ok()
            })
            .filter(|c| c.travel_minutes() > 0)
            .filter(|c| latest.is_none_or(|l| c.arrival_time() <= l))
            .filter(|c| min_arrival.is_none_or(|m| c.arrival_time() >= m))
            .collect();

        candidates.sort_by_key(|c| (c.departure_time(), c.arrival_time(), c.key()));
        candidates
    }

    /// Commit the first direct ride that fits under capacity.
    ///
    /// Falls back to the first candidate with a forced commit when the
    /// request allows it. Returns `None` without touching the ledger when no
    /// candidate exists or nothing fits and forcing is not allowed.
    pub fn select(&self, ledger: &mut CapacityLedger, request: &RideRequest) -> Option<Ride> {
        let mut candidates = self.find_direct(
            request.day,
            request.origin,
            request.destination,
            request.earliest,
            request.latest,
            request.min_arrival,
        );
        if request.prefer == Preference::EarliestArrival {
            candidates.sort_by_key(|c| (c.arrival_time(), c.departure_time(), c.key()));
        }

        if let Some(pos) = candidates
            .iter()
            .position(|c| ledger.assign(Some(c.key()), request.headcount, false))
        {
            return Some(Ride {
                candidate: candidates.swap_remove(pos),
                forced: false,
            });
        }

        if request.allow_force {
            let candidate = candidates.into_iter().next()?;
            ledger.assign(Some(candidate.key()), request.headcount, true);
            debug!(
                trip = %candidate.key(),
                headcount = request.headcount,
                load = ledger.current(&candidate.key()),
                "forced over capacity"
            );
            return Some(Ride {
                candidate,
                forced: true,
            });
        }

        None
    }

    /// Commit a two-leg ride with one transfer.
    ///
    /// Transfer points are tried in the order they are passed on departing
    /// trips, and the first one with both legs satisfiable under the ledger
    /// wins. The second leg departs at least the transfer slack after the
    /// first arrives. Neither leg is forced. On failure the ledger is left
    /// as it was.
    pub fn find_multi_leg(
        &self,
        ledger: &mut CapacityLedger,
        request: &RideRequest,
    ) -> Option<(Ride, Ride)> {
        let transfer_stops = self
            .timetable
            .transfer_stops_to(request.day, request.destination);
        if transfer_stops.is_empty() {
            return None;
        }

        let slack = self.config.transfer_slack();

        for dep in self
            .timetable
            .trips_from(request.day, request.origin, request.earliest)
        {
            for st in &dep.trip.stops()[dep.board_idx + 1..] {
                if request.latest.is_some_and(|l| st.time + slack > l) {
                    break;
                }
                if st.stop == request.destination
                    || st.stop == request.origin
                    || !transfer_stops.contains(&st.stop)
                {
                    continue;
                }

                let first_request = RideRequest::new(
                    request.day,
                    request.origin,
                    st.stop,
                    request.earliest,
                    request.headcount,
                )
                .arriving_by(st.time);
                let Some(first) = self.select(ledger, &first_request) else {
                    continue;
                };

                let mut second_request = RideRequest::new(
                    request.day,
                    st.stop,
                    request.destination,
                    first.candidate.arrival_time() + slack,
                    request.headcount,
                );
                second_request.latest = request.latest;
                second_request.min_arrival = request.min_arrival;

                match self.select(ledger, &second_request) {
                    Some(second) => {
                        debug!(via = %st.stop, "one-transfer ride found");
                        return Some((first, second));
                    }
                    None => {
                        ledger.release(Some(first.candidate.key()), request.headcount);
                    }
                }
            }
        }

        None
    }
}
