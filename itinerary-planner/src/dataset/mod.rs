//! Input documents and the dataset directory loader.
//!
//! A dataset directory holds four JSON files produced upstream:
//!
//! - `timetable.json`: stops and trip instances
//! - `links.json`: stop-to-hall and stop-to-lodging links, plus hall aliases
//! - `roster.json`: squads with their resolved games
//! - `events.json`: the communal lunch and concert (optional)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{
    ClockTime, CommunalEvent, DomainError, EventCalendar, RouteId, ServiceDay, Squad, SquadId,
    Stop, StopId, StopTime, TripIndex, TripInstance, TripKey,
};
use crate::timetable::{HallAlias, LinkRow, StopLinks, Timetable, TimetableError};

pub const TIMETABLE_FILE: &str = "timetable.json";
pub const LINKS_FILE: &str = "links.json";
pub const ROSTER_FILE: &str = "roster.json";
pub const EVENTS_FILE: &str = "events.json";

/// Errors loading a dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Timetable(#[from] TimetableError),

    /// A squad with nobody in it cannot be assigned to a bus
    #[error("{0} has a headcount of zero")]
    ZeroHeadcount(SquadId),
}

/// One scheduled stop as it appears in the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopTimeRecord {
    pub stop: StopId,
    pub time: ClockTime,
    /// Stop order along the route. Defaults to list order.
    #[serde(default)]
    pub position: Option<u16>,
}

/// One trip instance as it appears in the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRecord {
    pub route: RouteId,
    pub day: ServiceDay,
    /// Run number of the route on this day. Derived when omitted.
    #[serde(default)]
    pub index: Option<TripIndex>,
    pub stops: Vec<StopTimeRecord>,
}

impl TripRecord {
    fn first_departure(&self) -> ClockTime {
        self.stops
            .iter()
            .map(|s| s.time)
            .min()
            .unwrap_or(ClockTime::MIDNIGHT)
    }

    fn into_instance(self, index: TripIndex) -> Result<TripInstance, DomainError> {
        let key = TripKey::new(self.day, self.route, index);
        let stops = self
            .stops
            .into_iter()
            .enumerate()
            .map(|(i, s)| StopTime {
                stop: s.stop,
                time: s.time,
                position: s.position.unwrap_or(i as u16 + 1),
            })
            .collect();
        TripInstance::new(key, stops)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableDocument {
    pub stops: Vec<Stop>,
    #[serde(default)]
    pub trips: Vec<TripRecord>,
}

impl TimetableDocument {
    /// Build the timetable index, numbering trips that carry no index.
    ///
    /// Unnumbered trips of a (route, day) are ordered by first departure and
    /// numbered after the highest explicit index of that route and day.
    pub fn into_timetable(self) -> Result<Timetable, DatasetError> {
        let mut groups: BTreeMap<(RouteId, ServiceDay), Vec<TripRecord>> = BTreeMap::new();
        for record in self.trips {
            groups.entry((record.route, record.day)).or_default().push(record);
        }

        let mut trips = Vec::new();
        for ((route, day), records) in groups {
            let (numbered, mut unnumbered): (Vec<_>, Vec<_>) =
                records.into_iter().partition(|r| r.index.is_some());

            let mut next = numbered
                .iter()
                .filter_map(|r| r.index)
                .map(|i| i.0)
                .max()
                .unwrap_or(0);
            for record in numbered {
                let index = record.index.unwrap_or(TripIndex(0));
                trips.push(record.into_instance(index)?);
            }

            if !unnumbered.is_empty() {
                debug!(%route, %day, count = unnumbered.len(), "deriving trip indices");
            }
            // Stable, so equal departures keep input order.
            unnumbered.sort_by_key(TripRecord::first_departure);
            for record in unnumbered {
                next += 1;
                trips.push(record.into_instance(TripIndex(next))?);
            }
        }

        Ok(Timetable::new(self.stops, trips)?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinksDocument {
    #[serde(default)]
    pub links: Vec<LinkRow>,
    #[serde(default)]
    pub hall_aliases: Vec<HallAlias>,
}

impl LinksDocument {
    pub fn into_links(self) -> StopLinks {
        StopLinks::from_rows(&self.links, &self.hall_aliases)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterDocument {
    pub squads: Vec<Squad>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventsDocument {
    #[serde(default)]
    pub events: Vec<CommunalEvent>,
}

/// Everything a planning run reads.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub timetable: Timetable,
    pub links: StopLinks,
    pub squads: Vec<Squad>,
    pub calendar: EventCalendar,
}

impl Dataset {
    /// Assemble a dataset from parsed documents.
    pub fn from_documents(
        timetable: TimetableDocument,
        links: LinksDocument,
        roster: RosterDocument,
        events: EventsDocument,
    ) -> Result<Self, DatasetError> {
        if let Some(squad) = roster.squads.iter().find(|s| s.headcount == 0) {
            return Err(DatasetError::ZeroHeadcount(squad.id));
        }

        Ok(Self {
            timetable: timetable.into_timetable()?,
            links: links.into_links(),
            squads: roster.squads,
            calendar: EventCalendar::from_events(events.events),
        })
    }

    /// Load a dataset directory.
    ///
    /// `events.json` may be absent, in which case no communal events are
    /// planned.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let dir = dir.as_ref();
        let timetable: TimetableDocument = read_json(&dir.join(TIMETABLE_FILE))?;
        let links: LinksDocument = read_json(&dir.join(LINKS_FILE))?;
        let roster: RosterDocument = read_json(&dir.join(ROSTER_FILE))?;

        let events_path = dir.join(EVENTS_FILE);
        let events: EventsDocument = if events_path.exists() {
            read_json(&events_path)?
        } else {
            info!(path = %events_path.display(), "no events file; planning without communal events");
            EventsDocument::default()
        };

        let dataset = Self::from_documents(timetable, links, roster, events)?;
        info!(
            dir = %dir.display(),
            stops = dataset.timetable.stops().count(),
            trips = dataset.timetable.trip_count(),
            halls = dataset.links.hall_count(),
            lodgings = dataset.links.lodging_count(),
            squads = dataset.squads.len(),
            "loaded dataset"
        );
        Ok(dataset)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DatasetError> {
    let json = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| DatasetError::Json {
        path: path.to_path_buf(),
        source,
    })
}
