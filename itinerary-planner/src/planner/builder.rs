//! Segment construction.
//!
//! Stateless mapping from rides, games and communal events to itinerary
//! segments. Output invariants are checked with `debug_assert!`.

use chrono::Duration;

use crate::domain::{
    ClockTime, CommunalEvent, Game, Segment, SegmentKind, SegmentRef, ServiceDay, StopId,
    TripCandidate,
};

/// Note suffix on every segment that needs transport arranged by hand.
pub const MANUAL_TRANSPORT: &str = "manual transport required";

/// A bus segment for a scheduled ride.
///
/// `deadline` is the time the ride must arrive by (kickoff, concert start);
/// the buffer is the deadline minus the actual arrival.
pub fn bus(
    ride: &TripCandidate,
    reference: Option<SegmentRef>,
    deadline: Option<ClockTime>,
    note: impl Into<String>,
) -> Segment {
    let segment = Segment {
        kind: SegmentKind::Bus,
        reference,
        day: ride.day(),
        start: ride.departure_time(),
        end: ride.arrival_time(),
        origin: Some(ride.origin()),
        destination: Some(ride.destination()),
        route: Some(ride.route()),
        trip_index: Some(ride.trip_index()),
        travel_minutes: Some(ride.travel_minutes()),
        buffer_minutes: deadline.map(|d| d.minutes_since(ride.arrival_time())),
        note: note.into(),
    };
    debug_assert!(
        segment.start < segment.end,
        "bus segment must end after it starts: {segment:?}"
    );
    debug_assert!(
        segment.travel_minutes.is_some_and(|m| m > 0),
        "bus segment must have positive travel time: {segment:?}"
    );
    segment
}

/// An unscheduled ride that has to be arranged by hand.
#[derive(Debug, Clone, Copy)]
pub struct Charter {
    pub day: ServiceDay,
    pub origin: StopId,
    pub destination: StopId,
    pub depart: ClockTime,
    pub arrive: ClockTime,
}

/// A charter bus segment. It never touches the ledger.
///
/// Rides shorter than `min_travel` are stretched to it so the segment is
/// never degenerate.
pub fn charter(
    charter: Charter,
    min_travel: Duration,
    reference: Option<SegmentRef>,
    deadline: Option<ClockTime>,
    note: impl Into<String>,
) -> Segment {
    let end = charter.arrive.max(charter.depart + min_travel);
    let travel = charter
        .arrive
        .minutes_since(charter.depart)
        .max(min_travel.num_minutes());
    let mut note = note.into();
    if !note.contains(MANUAL_TRANSPORT) {
        note.push_str(&format!(" ({MANUAL_TRANSPORT})"));
    }
    let segment = Segment {
        kind: SegmentKind::Bus,
        reference,
        day: charter.day,
        start: charter.depart,
        end,
        origin: Some(charter.origin),
        destination: Some(charter.destination),
        route: None,
        trip_index: None,
        travel_minutes: Some(travel),
        buffer_minutes: deadline.map(|d| d.minutes_since(end)),
        note,
    };
    debug_assert!(
        segment.start < segment.end,
        "charter segment must end after it starts: {segment:?}"
    );
    segment
}

/// The game itself, at its hall.
pub fn game(game: &Game, hall: StopId) -> Segment {
    Segment {
        kind: SegmentKind::Game,
        reference: Some(SegmentRef::Game(game.id)),
        day: game.day,
        start: game.start,
        end: game.end(),
        origin: Some(hall),
        destination: Some(hall),
        route: None,
        trip_index: None,
        travel_minutes: None,
        buffer_minutes: None,
        note: game.describe(),
    }
}

pub fn meal(lunch: &CommunalEvent, start: ClockTime, end: ClockTime) -> Segment {
    debug_assert!(start < end, "meal must end after it starts");
    Segment {
        kind: SegmentKind::Meal,
        reference: Some(SegmentRef::Event(lunch.id)),
        day: lunch.day,
        start,
        end,
        origin: Some(lunch.stop),
        destination: Some(lunch.stop),
        route: None,
        trip_index: None,
        travel_minutes: None,
        buffer_minutes: None,
        note: format!("Lunch at {}", lunch.name),
    }
}

pub fn concert(concert: &CommunalEvent) -> Segment {
    Segment {
        kind: SegmentKind::Concert,
        reference: Some(SegmentRef::Event(concert.id)),
        day: concert.day,
        start: concert.start,
        end: concert.end,
        origin: Some(concert.stop),
        destination: Some(concert.stop),
        route: None,
        trip_index: None,
        travel_minutes: None,
        buffer_minutes: None,
        note: format!("Concert at {}", concert.name),
    }
}

/// Waiting at the event stop until shortly before the event starts.
pub fn stay(event: &CommunalEvent, start: ClockTime, end: ClockTime) -> Segment {
    debug_assert!(start <= end, "stay must not end before it starts");
    Segment {
        kind: SegmentKind::Stay,
        reference: Some(SegmentRef::Event(event.id)),
        day: event.day,
        start,
        end,
        origin: Some(event.stop),
        destination: Some(event.stop),
        route: None,
        trip_index: None,
        travel_minutes: None,
        buffer_minutes: Some(event.start.minutes_since(end)),
        note: format!("Stay at {} before {}", event.name, event.kind.as_str()),
    }
}

/// A manual follow-up where no scheduled ride exists and none was chartered.
pub fn manual_note(
    day: ServiceDay,
    at: ClockTime,
    origin: StopId,
    destination: StopId,
    reference: Option<SegmentRef>,
    note: impl Into<String>,
) -> Segment {
    let mut note = note.into();
    if !note.contains(MANUAL_TRANSPORT) {
        note.push_str(&format!("; {MANUAL_TRANSPORT}"));
    }
    Segment {
        kind: SegmentKind::Note,
        reference,
        day,
        start: at,
        end: at,
        origin: Some(origin),
        destination: Some(destination),
        route: None,
        trip_index: None,
        travel_minutes: None,
        buffer_minutes: None,
        note,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::{
        EventId, EventKind, GameId, HallId, RouteId, StopTime, TripIndex, TripInstance, TripKey,
    };

    fn t(s: &str) -> ClockTime {
        ClockTime::parse_hhmm(s).unwrap()
    }

    fn ride() -> TripCandidate {
        let key = TripKey::new(ServiceDay::Saturday, RouteId(2), TripIndex(4));
        let trip = TripInstance::new(
            key,
            vec![
                StopTime { stop: StopId(1), time: t("09:00"), position: 1 },
                StopTime { stop: StopId(2), time: t("09:25"), position: 2 },
            ],
        )
        .unwrap();
        TripCandidate::new(Arc::new(trip), 0, 1).unwrap()
    }

    fn event(kind: EventKind) -> CommunalEvent {
        CommunalEvent {
            id: EventId(3),
            kind,
            name: "Terningen Arena".into(),
            day: ServiceDay::Saturday,
            stop: StopId(8),
            start: t("19:00"),
            end: t("21:00"),
        }
    }

    #[test]
    fn bus_from_ride() {
        let seg = bus(&ride(), Some(SegmentRef::Game(GameId(1))), Some(t("10:05")), "Bus to hall");
        assert_eq!(seg.kind, SegmentKind::Bus);
        assert_eq!(seg.start, t("09:00"));
        assert_eq!(seg.end, t("09:25"));
        assert_eq!(seg.travel_minutes, Some(25));
        assert_eq!(seg.buffer_minutes, Some(40));
        assert_eq!(seg.route, Some(RouteId(2)));
        assert_eq!(seg.trip_index, Some(TripIndex(4)));
    }

    #[test]
    fn bus_without_deadline_has_no_buffer() {
        let seg = bus(&ride(), None, None, "Return to lodging");
        assert_eq!(seg.buffer_minutes, None);
    }

    #[test]
    fn charter_is_stretched_to_minimum_travel() {
        let seg = charter(
            Charter {
                day: ServiceDay::Friday,
                origin: StopId(1),
                destination: StopId(2),
                depart: t("17:50"),
                arrive: t("17:55"),
            },
            Duration::minutes(15),
            None,
            Some(t("18:00")),
            "Charter to hall",
        );
        assert_eq!(seg.end, t("18:05"));
        assert_eq!(seg.travel_minutes, Some(15));
        assert_eq!(seg.buffer_minutes, Some(-5));
        assert!(seg.is_charter());
        assert!(seg.note.ends_with("(manual transport required)"));
    }

    #[test]
    fn charter_note_not_duplicated() {
        let seg = charter(
            Charter {
                day: ServiceDay::Friday,
                origin: StopId(1),
                destination: StopId(2),
                depart: t("16:20"),
                arrive: t("17:20"),
            },
            Duration::minutes(15),
            None,
            None,
            "Charter (manual transport required)",
        );
        assert_eq!(seg.note.matches(MANUAL_TRANSPORT).count(), 1);
        assert_eq!(seg.travel_minutes, Some(60));
    }

    #[test]
    fn game_spans_duration() {
        let g = Game {
            id: GameId(5),
            tournament: "G14".into(),
            age: Some(14),
            hall: HallId(2),
            hall_name: "Hall".into(),
            day: ServiceDay::Sunday,
            start: t("11:00"),
            opponent: None,
            match_code: None,
        };
        let seg = game(&g, StopId(6));
        assert_eq!(seg.end, t("11:25"));
        assert_eq!(seg.origin, Some(StopId(6)));
        assert_eq!(seg.reference, Some(SegmentRef::Game(GameId(5))));
    }

    #[test]
    fn stay_carries_buffer_to_event() {
        let seg = stay(&event(EventKind::Concert), t("18:00"), t("18:40"));
        assert_eq!(seg.kind, SegmentKind::Stay);
        assert_eq!(seg.buffer_minutes, Some(20));
        assert_eq!(seg.note, "Stay at Terningen Arena before concert");
    }

    #[test]
    fn note_flags_manual_transport() {
        let seg = manual_note(
            ServiceDay::Saturday,
            t("21:00"),
            StopId(8),
            StopId(1),
            None,
            "No bus back to lodging",
        );
        assert_eq!(seg.kind, SegmentKind::Note);
        assert!(seg.needs_manual_transport());
        assert!(seg.note.contains(MANUAL_TRANSPORT));
    }

    #[test]
    fn meal_and_concert() {
        let lunch = event(EventKind::Lunch);
        let seg = meal(&lunch, t("13:10"), t("13:55"));
        assert_eq!(seg.duration_minutes(), 45);
        assert_eq!(seg.note, "Lunch at Terningen Arena");

        let seg = concert(&event(EventKind::Concert));
        assert_eq!(seg.start, t("19:00"));
        assert_eq!(seg.end, t("21:00"));
    }
}
