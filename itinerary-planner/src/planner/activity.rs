//! Per-squad day planning.
//!
//! Each day starts at the squad's lodging with an unconstrained clock. Games
//! are played in order with travel planned before each one. On the communal
//! day the squad also gets lunch (between games when a gap allows, else
//! after its last game) and the concert, which ends with the ride home.
//! Other days end with a ride back to the lodging.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::domain::{
    ClockTime, CommunalEvent, EventCalendar, Game, GameId, HallId, LodgingId, Segment,
    SegmentRef, ServiceDay, Squad, SquadId, StopId, TripKey,
};
use crate::timetable::{StopLinks, TimetableQuery};

use super::builder::{self, Charter};
use super::config::PlannerConfig;
use super::finder::{RideRequest, TripFinder};
use super::ledger::CapacityLedger;
use super::travel::GameTrip;

/// Missing reference data that prevents planning a squad.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("{squad}: {game} is played at {hall}, which has no linked stop")]
    MissingHallStop {
        squad: SquadId,
        game: GameId,
        hall: HallId,
    },

    #[error("{squad}: {lodging} has no linked stop")]
    MissingLodgingStop { squad: SquadId, lodging: LodgingId },
}

/// Where a squad is, and from when it is free to leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub position: StopId,
    /// `None` until the squad has a commitment that day.
    pub clock: Option<ClockTime>,
}

impl Cursor {
    /// At a stop with nothing planned yet.
    pub fn at(position: StopId) -> Self {
        Self {
            position,
            clock: None,
        }
    }
}

/// Segments from a side trip and where it leaves the squad.
#[derive(Debug, Clone)]
struct Detour {
    segments: Vec<Segment>,
    cursor: Cursor,
}

/// A meal taken at the lunch stop, with the ride there if one was needed.
struct LunchVisit {
    segments: Vec<Segment>,
    ride: Option<TripKey>,
    meal_end: ClockTime,
}

/// Plans one squad's days against the shared ledger.
pub struct ActivityPlanner<'a, Q: TimetableQuery> {
    pub(super) timetable: &'a Q,
    pub(super) links: &'a StopLinks,
    pub(super) calendar: &'a EventCalendar,
    pub(super) config: &'a PlannerConfig,
}

impl<'a, Q: TimetableQuery> ActivityPlanner<'a, Q> {
    pub fn new(
        timetable: &'a Q,
        links: &'a StopLinks,
        calendar: &'a EventCalendar,
        config: &'a PlannerConfig,
    ) -> Self {
        Self {
            timetable,
            links,
            calendar,
            config,
        }
    }

    pub(super) fn finder(&self) -> TripFinder<'a, Q> {
        TripFinder::new(self.timetable, self.config)
    }

    /// Plan every day for a squad.
    ///
    /// Reference data is checked before anything is committed, so an `Err`
    /// leaves the ledger untouched.
    pub fn plan_squad(
        &self,
        ledger: &mut CapacityLedger,
        squad: &Squad,
    ) -> Result<Vec<Segment>, PlanError> {
        let lodging = self
            .links
            .lodging_stop(squad.lodging)
            .ok_or(PlanError::MissingLodgingStop {
                squad: squad.id,
                lodging: squad.lodging,
            })?;
        let halls = self.resolve_halls(squad)?;

        let mut days = squad.game_days();
        if self.calendar.lunch.is_some() || self.calendar.concert.is_some() {
            days.insert(self.calendar.communal_day);
        }

        let mut lunch_taken = false;
        let mut segments = Vec::new();
        for day in days {
            segments.extend(self.plan_day(ledger, squad, day, lodging, &halls, &mut lunch_taken));
        }

        info!(
            squad = %squad.id,
            name = %squad.name,
            segments = segments.len(),
            "planned squad"
        );
        Ok(segments)
    }

    fn resolve_halls(&self, squad: &Squad) -> Result<HashMap<GameId, StopId>, PlanError> {
        squad
            .games
            .iter()
            .map(|game| {
                self.links
                    .hall_stop(game.hall)
                    .map(|stop| (game.id, stop))
                    .ok_or(PlanError::MissingHallStop {
                        squad: squad.id,
                        game: game.id,
                        hall: game.hall,
                    })
            })
            .collect()
    }

    fn plan_day(
        &self,
        ledger: &mut CapacityLedger,
        squad: &Squad,
        day: ServiceDay,
        lodging: StopId,
        halls: &HashMap<GameId, StopId>,
        lunch_taken: &mut bool,
    ) -> Vec<Segment> {
        let communal = self.calendar.is_communal(day);
        let games: Vec<(&Game, StopId)> = squad
            .games_on(day)
            .into_iter()
            .filter_map(|game| halls.get(&game.id).map(|hall| (game, *hall)))
            .collect();

        let mut segments = Vec::new();
        let mut cursor = Cursor::at(lodging);
        // Set when a lunch detour already brought the squad to the next hall.
        let mut arrived_for: Option<GameId> = None;

        for (i, (game, hall)) in games.iter().enumerate() {
            if arrived_for.take() != Some(game.id) && cursor.position != *hall {
                let trip = GameTrip {
                    squad,
                    game,
                    hall: *hall,
                    lodging,
                    from: cursor,
                };
                if let Some(arrival) = self.travel_to_game(ledger, &trip) {
                    segments.extend(arrival.segments);
                }
            }

            segments.push(builder::game(game, *hall));
            cursor = Cursor {
                position: *hall,
                clock: Some(game.end()),
            };

            if communal
                && !*lunch_taken
                && let Some((next, next_hall)) = games.get(i + 1)
                && let Some(detour) = self.lunch_between(ledger, squad, cursor, next, *next_hall)
            {
                segments.extend(detour.segments);
                cursor = detour.cursor;
                arrived_for = Some(next.id);
                *lunch_taken = true;
            }
        }

        if communal {
            if !*lunch_taken && let Some(detour) = self.lunch_after_games(ledger, squad, cursor) {
                segments.extend(detour.segments);
                cursor = detour.cursor;
                *lunch_taken = true;
            }
            if let Some(concert) = &self.calendar.concert {
                segments.extend(self.concert_block(ledger, squad, concert, cursor, lodging));
                return segments;
            }
        }

        segments.extend(self.return_to_lodging(ledger, squad, day, cursor, lodging));
        segments
    }

    /// Lunch in the gap between two games, ending at the next game's hall.
    fn lunch_between(
        &self,
        ledger: &mut CapacityLedger,
        squad: &Squad,
        cursor: Cursor,
        next: &Game,
        next_hall: StopId,
    ) -> Option<Detour> {
        let lunch = self.calendar.lunch.as_ref()?;
        let clock = cursor.clock?;
        if next.start.signed_duration_since(clock) < self.config.lunch_gap() || clock > lunch.end {
            return None;
        }

        let open = lunch.start.max(clock);
        let close = lunch.end.min(next.start - self.config.game_buffer());
        if open >= close {
            return None;
        }

        let visit = self.visit_lunch(ledger, squad, cursor, lunch, open, close)?;
        let mut segments = visit.segments;

        if next_hall == lunch.stop {
            return Some(Detour {
                segments,
                cursor: Cursor {
                    position: next_hall,
                    clock: Some(visit.meal_end),
                },
            });
        }

        let request = RideRequest::new(next.day, lunch.stop, next_hall, visit.meal_end, squad.headcount)
            .arriving_by(next.start - self.config.game_buffer());
        let Some(onward) = self.finder().select(ledger, &request) else {
            debug!(squad = %squad.id, game = %next.id, "no ride from lunch to next game");
            ledger.release(visit.ride, squad.headcount);
            return None;
        };

        segments.push(builder::bus(
            &onward.candidate,
            Some(SegmentRef::Game(next.id)),
            Some(next.start),
            format!("Bus to {} (post-lunch)", next.hall_name),
        ));
        Some(Detour {
            segments,
            cursor: Cursor {
                position: next_hall,
                clock: Some(onward.candidate.arrival_time()),
            },
        })
    }

    /// Lunch after the day's games, or from the lodging on a day without any.
    fn lunch_after_games(
        &self,
        ledger: &mut CapacityLedger,
        squad: &Squad,
        cursor: Cursor,
    ) -> Option<Detour> {
        let lunch = self.calendar.lunch.as_ref()?;
        let clock = cursor.clock.unwrap_or(lunch.start);
        if clock > lunch.end {
            return None;
        }

        let from = Cursor {
            position: cursor.position,
            clock: Some(clock),
        };
        let visit = self.visit_lunch(ledger, squad, from, lunch, lunch.start.max(clock), lunch.end)?;
        Some(Detour {
            segments: visit.segments,
            cursor: Cursor {
                position: lunch.stop,
                clock: Some(visit.meal_end),
            },
        })
    }

    /// Reach the lunch stop inside `[open, close]` and eat.
    ///
    /// The meal starts on arrival (never before the lunch window opens) and
    /// is cut short at `close`. If less than the minimum meal remains, the
    /// ride is released and nothing is planned.
    fn visit_lunch(
        &self,
        ledger: &mut CapacityLedger,
        squad: &Squad,
        cursor: Cursor,
        lunch: &CommunalEvent,
        open: ClockTime,
        close: ClockTime,
    ) -> Option<LunchVisit> {
        let mut segments = Vec::new();
        let (arrival, ride) = if cursor.position == lunch.stop {
            (cursor.clock.unwrap_or(open).max(open), None)
        } else {
            let request = RideRequest::new(
                lunch.day,
                cursor.position,
                lunch.stop,
                cursor.clock.unwrap_or(open),
                squad.headcount,
            )
            .arriving_by(close)
            .arriving_after(open);
            let ride = self.finder().select(ledger, &request)?;
            segments.push(builder::bus(
                &ride.candidate,
                Some(SegmentRef::Event(lunch.id)),
                None,
                format!("Bus to lunch ({})", lunch.name),
            ));
            (ride.candidate.arrival_time(), Some(ride.candidate.key()))
        };

        let meal_start = arrival.max(lunch.start);
        let meal_end = (meal_start + self.config.lunch_duration()).min(close);
        if meal_end.signed_duration_since(meal_start) < self.config.min_meal() {
            debug!(squad = %squad.id, %meal_start, %meal_end, "lunch window too short");
            ledger.release(ride, squad.headcount);
            return None;
        }

        segments.push(builder::meal(lunch, meal_start, meal_end));
        Some(LunchVisit {
            segments,
            ride,
            meal_end,
        })
    }

    /// Travel to the concert, attend, and head back to the lodging.
    fn concert_block(
        &self,
        ledger: &mut CapacityLedger,
        squad: &Squad,
        concert: &CommunalEvent,
        cursor: Cursor,
        lodging: StopId,
    ) -> Vec<Segment> {
        let latest = concert.start - self.config.concert_buffer();
        let preferred = cursor
            .clock
            .unwrap_or(ClockTime::MIDNIGHT)
            .max(self.config.concert_soft_earliest);
        let mut segments = Vec::new();

        if cursor.position == concert.stop {
            let stay_start = cursor.clock.unwrap_or(preferred);
            segments.push(builder::stay(concert, stay_start, stay_start.max(latest)));
        } else if let Some(segment) = self.ride_to_concert(ledger, squad, concert, cursor, preferred) {
            segments.push(segment);
        } else {
            warn!(squad = %squad.id, "no scheduled ride to concert; charter required");
            segments.push(builder::charter(
                Charter {
                    day: concert.day,
                    origin: cursor.position,
                    destination: concert.stop,
                    depart: preferred,
                    arrive: latest,
                },
                self.config.charter_min_travel(),
                Some(SegmentRef::Event(concert.id)),
                Some(concert.start),
                format!("Charter transport to concert ({})", concert.name),
            ));
        }

        segments.push(builder::concert(concert));

        if concert.stop != lodging {
            let after = Cursor {
                position: concert.stop,
                clock: Some(concert.end),
            };
            segments.push(self.ride_home(
                ledger,
                squad,
                concert.day,
                after,
                lodging,
                Some(SegmentRef::Event(concert.id)),
                "Return to lodging after concert",
            ));
        }
        segments
    }

    /// Try departure bounds around the preferred time until a ride fits.
    fn ride_to_concert(
        &self,
        ledger: &mut CapacityLedger,
        squad: &Squad,
        concert: &CommunalEvent,
        cursor: Cursor,
        preferred: ClockTime,
    ) -> Option<Segment> {
        let earliest_arrival = concert.start - self.config.concert_lookback();
        let latest_arrival = concert.start - self.config.concert_buffer();
        let mut tried = Vec::with_capacity(self.config.concert_offsets_mins.len());

        for offset in &self.config.concert_offsets_mins {
            let mut depart = preferred + chrono::Duration::minutes(*offset);
            if let Some(clock) = cursor.clock {
                depart = depart.max(clock);
            }
            if tried.contains(&depart) {
                continue;
            }
            tried.push(depart);

            let request = RideRequest::new(concert.day, cursor.position, concert.stop, depart, squad.headcount)
                .arriving_by(latest_arrival)
                .arriving_after(earliest_arrival);
            if let Some(ride) = self.finder().select(ledger, &request) {
                debug!(squad = %squad.id, offset, "ride to concert found");
                return Some(builder::bus(
                    &ride.candidate,
                    Some(SegmentRef::Event(concert.id)),
                    Some(concert.start),
                    format!("Bus to concert ({})", concert.name),
                ));
            }
        }
        None
    }

    /// End-of-day ride back to the lodging when the squad is elsewhere.
    fn return_to_lodging(
        &self,
        ledger: &mut CapacityLedger,
        squad: &Squad,
        day: ServiceDay,
        cursor: Cursor,
        lodging: StopId,
    ) -> Option<Segment> {
        if cursor.position == lodging {
            return None;
        }
        Some(self.ride_home(ledger, squad, day, cursor, lodging, None, "Return to lodging"))
    }

    /// A direct ride to the lodging, or a manual-transport note if none runs.
    #[allow(clippy::too_many_arguments)]
    fn ride_home(
        &self,
        ledger: &mut CapacityLedger,
        squad: &Squad,
        day: ServiceDay,
        cursor: Cursor,
        lodging: StopId,
        reference: Option<SegmentRef>,
        note: &str,
    ) -> Segment {
        let earliest = cursor.clock.unwrap_or(ClockTime::MIDNIGHT);
        let request = RideRequest::new(day, cursor.position, lodging, earliest, squad.headcount);
        match self.finder().select(ledger, &request) {
            Some(ride) => builder::bus(&ride.candidate, reference, None, note),
            None => {
                warn!(
                    squad = %squad.id,
                    %day,
                    from = %cursor.position,
                    after = %earliest,
                    "no ride back to lodging"
                );
                builder::manual_note(
                    day,
                    earliest,
                    cursor.position,
                    lodging,
                    reference,
                    format!("{note}: no scheduled bus"),
                )
            }
        }
    }
}
