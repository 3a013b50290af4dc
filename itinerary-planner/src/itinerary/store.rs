//! Itinerary persistence.
//!
//! A store holds exactly one planning run. Writing replaces the previous run
//! wholesale, so rerunning the planner on unchanged input leaves the store
//! unchanged.

use std::path::{Path, PathBuf};

use tracing::info;

use super::ItineraryRun;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode itineraries: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub trait ItineraryStore {
    /// Replace everything stored with `run`.
    fn replace_all(&mut self, run: &ItineraryRun) -> Result<(), StoreError>;

    /// The stored run, if one has been written.
    fn load(&self) -> Result<Option<ItineraryRun>, StoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    run: Option<ItineraryRun>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ItineraryStore for MemoryStore {
    fn replace_all(&mut self, run: &ItineraryRun) -> Result<(), StoreError> {
        self.run = Some(run.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<ItineraryRun>, StoreError> {
        Ok(self.run.clone())
    }
}

/// Stores the run as one pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ItineraryStore for JsonFileStore {
    /// Writes to a sibling temporary file and renames it over the target, so
    /// readers never see a half-written run.
    fn replace_all(&mut self, run: &ItineraryRun) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_string_pretty(run)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;

        info!(
            path = %self.path.display(),
            squads = run.itineraries.len(),
            segments = run.segment_count(),
            "itineraries written"
        );
        Ok(())
    }

    fn load(&self) -> Result<Option<ItineraryRun>, StoreError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|source| StoreError::Decode {
                path: self.path.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ClockTime, GameId, RouteId, Segment, SegmentKind, SegmentRef, ServiceDay, SquadId, StopId,
        TripIndex,
    };
    use crate::itinerary::{Itinerary, SequencedSegment, TripLoad};
    use tempfile::tempdir;

    fn sample_run(headcount: u32) -> ItineraryRun {
        let segment = Segment {
            kind: SegmentKind::Bus,
            reference: Some(SegmentRef::Game(GameId(7))),
            day: ServiceDay::Friday,
            start: ClockTime::parse_hhmm("09:00").unwrap(),
            end: ClockTime::parse_hhmm("09:20").unwrap(),
            origin: Some(StopId(1)),
            destination: Some(StopId(2)),
            route: Some(RouteId(3)),
            trip_index: Some(TripIndex(1)),
            travel_minutes: Some(20),
            buffer_minutes: Some(40),
            note: "Bus to Håkons Hall".into(),
        };
        ItineraryRun {
            itineraries: vec![Itinerary {
                squad: SquadId(1),
                name: "Lyn G14".into(),
                headcount,
                segments: vec![SequencedSegment {
                    sequence: 1,
                    segment,
                }],
            }],
            loads: vec![TripLoad {
                day: ServiceDay::Friday,
                route: RouteId(3),
                trip_index: TripIndex(1),
                headcount,
                limit: 120,
            }],
            failures: vec![],
        }
    }

    #[test]
    fn memory_store_replaces() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load().unwrap(), None);

        store.replace_all(&sample_run(14)).unwrap();
        store.replace_all(&sample_run(16)).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample_run(16)));
    }

    #[test]
    fn json_store_round_trip_creates_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("itineraries.json");
        let mut store = JsonFileStore::new(&path);

        store.replace_all(&sample_run(14)).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(store.load().unwrap(), Some(sample_run(14)));
    }

    #[test]
    fn json_store_rewrite_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("itineraries.json");
        let mut store = JsonFileStore::new(&path);

        store.replace_all(&sample_run(14)).unwrap();
        let first = std::fs::read_to_string(&path).unwrap();
        store.replace_all(&sample_run(14)).unwrap();
        let second = std::fs::read_to_string(&path).unwrap();
        assert_eq!(first, second);

        store.replace_all(&sample_run(20)).unwrap();
        assert_eq!(store.load().unwrap().unwrap().itineraries[0].headcount, 20);
    }

    #[test]
    fn json_store_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nothing.json"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn json_store_corrupt_file_is_decode_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("itineraries.json");
        std::fs::write(&path, "[1, 2").unwrap();

        let err = JsonFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Decode { .. }));
    }
}
