//! Getting a squad to its next game.
//!
//! Travel to a game is planned by trying strategies from strictest to most
//! permissive. Each strategy either commits its rides to the ledger and
//! returns the segments, or leaves the ledger exactly as it found it. The
//! last rung is a charter, which cannot fail.

use chrono::Duration;
use tracing::{debug, warn};

use crate::domain::{ClockTime, Game, Segment, SegmentRef, Squad, StopId};
use crate::timetable::TimetableQuery;

use super::activity::{ActivityPlanner, Cursor};
use super::builder::{self, Charter};
use super::finder::{Preference, RideRequest};
use super::ledger::CapacityLedger;

/// One way of reaching a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelStrategy {
    /// Direct ride meeting the target buffer, earliest arrival first.
    /// Forces capacity when every candidate is full.
    Direct,
    /// Ride back to the lodging, then direct from there.
    ViaLodging,
    /// Direct ride meeting a smaller buffer (minutes).
    RelaxedBuffer(i64),
    /// Earliest direct ride with no buffer requirement.
    AnyBuffer,
    /// Two rides with one transfer, meeting the target buffer.
    Transfer,
    /// Unscheduled ride arranged by hand.
    Charter,
}

impl TravelStrategy {
    /// Strategies in the order they are tried, ending with the charter.
    pub fn ladder(relaxed_buffers_mins: &[i64]) -> Vec<TravelStrategy> {
        let mut ladder = vec![TravelStrategy::Direct, TravelStrategy::ViaLodging];
        ladder.extend(
            relaxed_buffers_mins
                .iter()
                .map(|b| TravelStrategy::RelaxedBuffer(*b)),
        );
        ladder.push(TravelStrategy::AnyBuffer);
        ladder.push(TravelStrategy::Transfer);
        ladder.push(TravelStrategy::Charter);
        ladder
    }
}

/// Everything needed to plan travel to one game.
#[derive(Debug, Clone, Copy)]
pub struct GameTrip<'g> {
    pub squad: &'g Squad,
    pub game: &'g Game,
    pub hall: StopId,
    pub lodging: StopId,
    pub from: Cursor,
}

impl GameTrip<'_> {
    fn reference(&self) -> Option<SegmentRef> {
        Some(SegmentRef::Game(self.game.id))
    }

    fn kickoff(&self) -> ClockTime {
        self.game.start
    }

    fn note(&self) -> String {
        format!("Bus to {}", self.game.travel_label())
    }
}

/// Travel segments for one game and when the squad gets there.
#[derive(Debug, Clone)]
pub struct Arrival {
    pub segments: Vec<Segment>,
    pub at: ClockTime,
    pub strategy: TravelStrategy,
}

impl<Q: TimetableQuery> ActivityPlanner<'_, Q> {
    /// Plan travel to a game, falling through the strategy ladder.
    ///
    /// The ladder ends with a charter, which always succeeds, so this only
    /// returns `None` if that rung is ever removed.
    pub(super) fn travel_to_game(
        &self,
        ledger: &mut CapacityLedger,
        trip: &GameTrip<'_>,
    ) -> Option<Arrival> {
        let arrival = TravelStrategy::ladder(&self.config.relaxed_buffers_mins)
            .into_iter()
            .find_map(|strategy| {
                let result = self.attempt(strategy, ledger, trip);
                debug!(
                    squad = %trip.squad.id,
                    game = %trip.game.id,
                    ?strategy,
                    found = result.is_some(),
                    "travel attempt"
                );
                result
            })?;

        if arrival.strategy != TravelStrategy::Direct {
            debug!(
                squad = %trip.squad.id,
                game = %trip.game.id,
                strategy = ?arrival.strategy,
                arrive = %arrival.at,
                "fell back"
            );
        }
        Some(arrival)
    }

    /// Try one strategy. On `None` the ledger is unchanged.
    pub(super) fn attempt(
        &self,
        strategy: TravelStrategy,
        ledger: &mut CapacityLedger,
        trip: &GameTrip<'_>,
    ) -> Option<Arrival> {
        match strategy {
            TravelStrategy::Direct => self.direct(ledger, trip, trip.from),
            TravelStrategy::ViaLodging => self.via_lodging(ledger, trip),
            TravelStrategy::RelaxedBuffer(buffer) => self.relaxed(ledger, trip, buffer),
            TravelStrategy::AnyBuffer => self.any_buffer(ledger, trip),
            TravelStrategy::Transfer => self.transfer(ledger, trip),
            TravelStrategy::Charter => Some(self.charter_to_game(trip)),
        }
    }

    /// Earliest departure bound when leaving `from` for this game.
    fn earliest(&self, trip: &GameTrip<'_>, from: Cursor) -> ClockTime {
        from.clock
            .unwrap_or_else(|| trip.kickoff() - self.config.day_start_lookback())
    }

    fn request(&self, trip: &GameTrip<'_>, from: Cursor) -> RideRequest {
        RideRequest::new(
            trip.game.day,
            from.position,
            trip.hall,
            self.earliest(trip, from),
            trip.squad.headcount,
        )
    }

    fn direct(&self, ledger: &mut CapacityLedger, trip: &GameTrip<'_>, from: Cursor) -> Option<Arrival> {
        let request = self
            .request(trip, from)
            .arriving_by(trip.kickoff() - self.config.game_buffer())
            .preferring(Preference::EarliestArrival)
            .forcing();
        let ride = self.finder().select(ledger, &request)?;

        let mut note = trip.note();
        if ride.forced {
            note.push_str(" (capacity override)");
            warn!(
                squad = %trip.squad.id,
                trip = %ride.candidate.key(),
                load = ledger.current(&ride.candidate.key()),
                limit = ledger.limit(),
                "capacity override"
            );
        }
        Some(Arrival {
            at: ride.candidate.arrival_time(),
            segments: vec![builder::bus(
                &ride.candidate,
                trip.reference(),
                Some(trip.kickoff()),
                note,
            )],
            strategy: TravelStrategy::Direct,
        })
    }

    fn via_lodging(&self, ledger: &mut CapacityLedger, trip: &GameTrip<'_>) -> Option<Arrival> {
        if trip.from.position == trip.lodging {
            return None;
        }

        let request = RideRequest::new(
            trip.game.day,
            trip.from.position,
            trip.lodging,
            self.earliest(trip, trip.from),
            trip.squad.headcount,
        )
        .arriving_by(trip.kickoff() - self.config.anchor_reset_buffer());
        let reset = self.finder().select(ledger, &request)?;

        let at_lodging = Cursor {
            position: trip.lodging,
            clock: Some(reset.candidate.arrival_time()),
        };
        let Some(onward) = self.direct(ledger, trip, at_lodging) else {
            ledger.release(Some(reset.candidate.key()), trip.squad.headcount);
            return None;
        };

        let mut segments = vec![builder::bus(
            &reset.candidate,
            trip.reference(),
            Some(trip.kickoff()),
            "Transfer to lodging before next bus",
        )];
        segments.extend(onward.segments);
        Some(Arrival {
            segments,
            at: onward.at,
            strategy: TravelStrategy::ViaLodging,
        })
    }

    fn relaxed(&self, ledger: &mut CapacityLedger, trip: &GameTrip<'_>, buffer: i64) -> Option<Arrival> {
        let latest = trip.kickoff() - Duration::minutes(buffer);
        if latest <= self.earliest(trip, trip.from) {
            return None;
        }

        let request = self.request(trip, trip.from).arriving_by(latest);
        let ride = self.finder().select(ledger, &request)?;
        Some(Arrival {
            at: ride.candidate.arrival_time(),
            segments: vec![builder::bus(
                &ride.candidate,
                trip.reference(),
                Some(trip.kickoff()),
                format!("{} (buffer relaxed to {buffer}m)", trip.note()),
            )],
            strategy: TravelStrategy::RelaxedBuffer(buffer),
        })
    }

    fn any_buffer(&self, ledger: &mut CapacityLedger, trip: &GameTrip<'_>) -> Option<Arrival> {
        let request = self.request(trip, trip.from);
        let ride = self.finder().select(ledger, &request)?;
        let buffer = trip.kickoff().minutes_since(ride.candidate.arrival_time());
        warn!(
            squad = %trip.squad.id,
            game = %trip.game.id,
            buffer,
            "no ride meets any buffer; needs manual review"
        );
        Some(Arrival {
            at: ride.candidate.arrival_time(),
            segments: vec![builder::bus(
                &ride.candidate,
                trip.reference(),
                Some(trip.kickoff()),
                format!("{} (manual buffer review: {buffer}m buffer)", trip.note()),
            )],
            strategy: TravelStrategy::AnyBuffer,
        })
    }

    fn transfer(&self, ledger: &mut CapacityLedger, trip: &GameTrip<'_>) -> Option<Arrival> {
        let request = self
            .request(trip, trip.from)
            .arriving_by(trip.kickoff() - self.config.game_buffer());
        let (first, second) = self.finder().find_multi_leg(ledger, &request)?;
        let note = trip.note();
        Some(Arrival {
            at: second.candidate.arrival_time(),
            segments: vec![
                builder::bus(&first.candidate, trip.reference(), None, format!("{note} (leg 1)")),
                builder::bus(
                    &second.candidate,
                    trip.reference(),
                    Some(trip.kickoff()),
                    format!("{note} (via transfer)"),
                ),
            ],
            strategy: TravelStrategy::Transfer,
        })
    }

    /// Charter aimed to arrive on the target buffer, departing no earlier
    /// than the charter lead before kickoff. When the squad cannot leave in
    /// time for that, it arrives after the late travel time but no sooner
    /// than the late buffer before kickoff.
    fn charter_to_game(&self, trip: &GameTrip<'_>) -> Arrival {
        let kickoff = trip.kickoff();
        let depart = self
            .earliest(trip, trip.from)
            .max(kickoff - self.config.charter_lead());
        let mut arrive = kickoff - self.config.game_buffer();
        if arrive <= depart {
            arrive = (depart + self.config.charter_late_travel())
                .max(kickoff - self.config.charter_late_buffer());
        }

        let mut segment = builder::charter(
            Charter {
                day: trip.game.day,
                origin: trip.from.position,
                destination: trip.hall,
                depart,
                arrive,
            },
            self.config.charter_min_travel(),
            trip.reference(),
            Some(kickoff),
            format!(
                "Charter transport to {} for {}",
                trip.game.hall_name, trip.squad.name
            ),
        );
        if let Some(buffer) = segment.buffer_minutes
            && buffer < self.config.game_buffer_mins
        {
            segment.note.push_str(&format!(" (buffer {buffer}m)"));
        }
        warn!(
            squad = %trip.squad.id,
            game = %trip.game.id,
            depart = %segment.start,
            arrive = %segment.end,
            "no scheduled ride; charter required"
        );
        Arrival {
            at: segment.end,
            segments: vec![segment],
            strategy: TravelStrategy::Charter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ladder_order() {
        assert_eq!(
            TravelStrategy::ladder(&[20, 10]),
            vec![
                TravelStrategy::Direct,
                TravelStrategy::ViaLodging,
                TravelStrategy::RelaxedBuffer(20),
                TravelStrategy::RelaxedBuffer(10),
                TravelStrategy::AnyBuffer,
                TravelStrategy::Transfer,
                TravelStrategy::Charter,
            ]
        );
    }

    #[test]
    fn ladder_without_relaxed_buffers() {
        let ladder = TravelStrategy::ladder(&[]);
        assert_eq!(ladder.len(), 5);
        assert_eq!(ladder.last(), Some(&TravelStrategy::Charter));
        assert_eq!(
            TravelStrategy::ladder(&[30]).last(),
            Some(&TravelStrategy::Charter)
        );
    }
}
