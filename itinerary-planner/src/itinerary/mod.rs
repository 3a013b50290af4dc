//! Finished itineraries: ordering, persistence and read models.
//!
//! The planner emits segments in the order it planned them. The writer turns
//! a [`PlanRun`] into numbered itineraries, which are what gets stored and
//! served.

mod read_models;
mod store;

use serde::{Deserialize, Serialize};

use crate::domain::{Segment, SquadId};
use crate::planner::PlanRun;

pub use read_models::{ManualTransportNeed, TripLoad, manual_transport_needs, trip_loads};
pub use store::{ItineraryStore, JsonFileStore, MemoryStore, StoreError};

/// A segment with its position on the itinerary, starting at 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencedSegment {
    pub sequence: u32,
    #[serde(flatten)]
    pub segment: Segment,
}

/// One squad's ordered itinerary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Itinerary {
    pub squad: SquadId,
    pub name: String,
    pub headcount: u32,
    pub segments: Vec<SequencedSegment>,
}

/// A squad that could not be planned, as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub squad: SquadId,
    pub name: String,
    pub error: String,
}

/// The stored result of a planning run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItineraryRun {
    pub itineraries: Vec<Itinerary>,
    pub loads: Vec<TripLoad>,
    #[serde(default)]
    pub failures: Vec<FailureRecord>,
}

impl ItineraryRun {
    pub fn itinerary(&self, squad: SquadId) -> Option<&Itinerary> {
        self.itineraries.iter().find(|i| i.squad == squad)
    }

    pub fn segment_count(&self) -> usize {
        self.itineraries.iter().map(|i| i.segments.len()).sum()
    }
}

/// Orders and numbers planned segments.
pub struct ItineraryWriter;

impl ItineraryWriter {
    /// Sort by (day, start) and number from 1.
    ///
    /// The sort is stable: segments sharing a start time, such as a game and
    /// a zero-length note, keep the order they were planned in.
    pub fn order(mut segments: Vec<Segment>) -> Vec<SequencedSegment> {
        segments.sort_by_key(|s| (s.day.rank(), s.start));
        segments
            .into_iter()
            .zip(1..)
            .map(|(segment, sequence)| SequencedSegment { sequence, segment })
            .collect()
    }

    pub fn write(run: &PlanRun) -> ItineraryRun {
        let itineraries = run
            .plans
            .iter()
            .map(|plan| Itinerary {
                squad: plan.squad,
                name: plan.name.clone(),
                headcount: plan.headcount,
                segments: Self::order(plan.segments.clone()),
            })
            .collect();
        let failures = run
            .failures
            .iter()
            .map(|f| FailureRecord {
                squad: f.squad,
                name: f.name.clone(),
                error: f.error.to_string(),
            })
            .collect();

        ItineraryRun {
            itineraries,
            loads: trip_loads(&run.ledger),
            failures,
        }
    }
}
