//! Itinerary segment types.
//!
//! A `Segment` is the output unit of planning: one typed, time-stamped
//! entry on a squad's itinerary. Segments are created by the planner and
//! never mutated after they are emitted.

use serde::{Deserialize, Serialize};

use super::{ClockTime, EventId, GameId, RouteId, ServiceDay, StopId, TripIndex, TripKey};

/// What a segment represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// Playing a fixture-list game
    Game,
    /// A bus ride, scheduled or chartered
    Bus,
    /// The communal lunch
    Meal,
    /// The communal concert
    Concert,
    /// Waiting at a stop before an event
    Stay,
    /// A manual follow-up with no scheduled transport
    Note,
}

impl SegmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentKind::Game => "game",
            SegmentKind::Bus => "bus",
            SegmentKind::Meal => "meal",
            SegmentKind::Concert => "concert",
            SegmentKind::Stay => "stay",
            SegmentKind::Note => "note",
        }
    }
}

/// What a segment was planned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum SegmentRef {
    Game(GameId),
    Event(EventId),
}

/// One entry on a squad's itinerary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub reference: Option<SegmentRef>,
    pub day: ServiceDay,
    pub start: ClockTime,
    pub end: ClockTime,
    pub origin: Option<StopId>,
    pub destination: Option<StopId>,
    pub route: Option<RouteId>,
    pub trip_index: Option<TripIndex>,
    pub travel_minutes: Option<i64>,
    /// Deadline minus actual arrival, when a deadline applies. Negative when
    /// the ride arrives after the deadline.
    pub buffer_minutes: Option<i64>,
    pub note: String,
}

impl Segment {
    /// The ledger key of the scheduled trip this segment rides, if any.
    pub fn trip_key(&self) -> Option<TripKey> {
        match (self.kind, self.route, self.trip_index) {
            (SegmentKind::Bus, Some(route), Some(index)) => {
                Some(TripKey::new(self.day, route, index))
            }
            _ => None,
        }
    }

    /// True for bus segments with no scheduled route (charters).
    pub fn is_charter(&self) -> bool {
        self.kind == SegmentKind::Bus && self.route.is_none()
    }

    /// True for segments that need manual or ad-hoc transport arrangements.
    pub fn needs_manual_transport(&self) -> bool {
        self.kind == SegmentKind::Note || self.is_charter()
    }

    /// Duration in minutes from start to end.
    pub fn duration_minutes(&self) -> i64 {
        self.end.minutes_since(self.start)
    }
}
