//! Communal tournament events.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{ClockTime, EventId, ServiceDay, StopId};

/// What a communal event is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Lunch,
    Concert,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Lunch => "lunch",
            EventKind::Concert => "concert",
        }
    }
}

/// A fixed event every squad attends, anchored to one stop.
///
/// For lunch, `[start, end]` is the window meals must fall inside; for the
/// concert it is the performance itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunalEvent {
    pub id: EventId,
    pub kind: EventKind,
    pub name: String,
    pub day: ServiceDay,
    pub stop: StopId,
    pub start: ClockTime,
    pub end: ClockTime,
}

/// The communal events of one planning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventCalendar {
    /// The day carrying the shared lunch and concert.
    pub communal_day: ServiceDay,
    pub lunch: Option<CommunalEvent>,
    pub concert: Option<CommunalEvent>,
}

impl EventCalendar {
    /// Build a calendar from a list of events.
    ///
    /// Only the first event of each kind is used. The communal day is the
    /// lunch's day, else the concert's, else Saturday.
    pub fn from_events(events: Vec<CommunalEvent>) -> Self {
        let mut lunch = None;
        let mut concert = None;

        for event in events {
            let slot = match event.kind {
                EventKind::Lunch => &mut lunch,
                EventKind::Concert => &mut concert,
            };
            if slot.is_some() {
                warn!(event = %event.id, kind = ?event.kind, "ignoring additional communal event");
                continue;
            }
            *slot = Some(event);
        }

        let communal_day = lunch
            .as_ref()
            .or(concert.as_ref())
            .map(|e: &CommunalEvent| e.day)
            .unwrap_or(ServiceDay::Saturday);

        Self {
            communal_day,
            lunch,
            concert,
        }
    }

    /// A calendar with no communal events.
    pub fn empty() -> Self {
        Self {
            communal_day: ServiceDay::Saturday,
            lunch: None,
            concert: None,
        }
    }

    pub fn is_communal(&self, day: ServiceDay) -> bool {
        day == self.communal_day
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> ClockTime {
        ClockTime::parse_hhmm(s).unwrap()
    }

    fn event(id: u32, kind: EventKind, day: ServiceDay) -> CommunalEvent {
        CommunalEvent {
            id: EventId(id),
            kind,
            name: "Thon Central".into(),
            day,
            stop: StopId(9),
            start: t("13:00"),
            end: t("17:30"),
        }
    }

    #[test]
    fn first_event_of_each_kind_wins() {
        let calendar = EventCalendar::from_events(vec![
            event(1, EventKind::Concert, ServiceDay::Saturday),
            event(2, EventKind::Lunch, ServiceDay::Saturday),
            event(3, EventKind::Lunch, ServiceDay::Saturday),
        ]);
        assert_eq!(calendar.lunch.unwrap().id, EventId(2));
        assert_eq!(calendar.concert.unwrap().id, EventId(1));
    }

    #[test]
    fn communal_day_follows_events() {
        let calendar = EventCalendar::from_events(vec![event(1, EventKind::Concert, ServiceDay::Sunday)]);
        assert_eq!(calendar.communal_day, ServiceDay::Sunday);
        assert!(calendar.is_communal(ServiceDay::Sunday));

        let calendar = EventCalendar::from_events(vec![]);
        assert_eq!(calendar, EventCalendar::empty());
    }

    #[test]
    fn kind_serde() {
        assert_eq!(serde_json::to_string(&EventKind::Concert).unwrap(), "\"concert\"");
    }
}
