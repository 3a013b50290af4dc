//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{
    ClockTime, RouteId, SegmentKind, SegmentRef, ServiceDay, SquadId, StopId, TripIndex,
};
use crate::itinerary::{FailureRecord, SequencedSegment, TripLoad};

use super::state::AppState;

/// A stop with its display name.
#[derive(Debug, Serialize)]
pub struct StopView {
    pub id: StopId,
    pub name: String,
}

/// One itinerary entry with stop names resolved.
#[derive(Debug, Serialize)]
pub struct SegmentView {
    pub sequence: u32,
    pub kind: SegmentKind,
    pub reference: Option<SegmentRef>,
    pub day: ServiceDay,
    pub start: ClockTime,
    pub end: ClockTime,
    pub duration_minutes: i64,
    pub origin: Option<StopView>,
    pub destination: Option<StopView>,
    pub route: Option<RouteId>,
    pub trip_index: Option<TripIndex>,
    pub travel_minutes: Option<i64>,
    pub buffer_minutes: Option<i64>,
    pub note: String,
}

impl SegmentView {
    pub fn new(s: &SequencedSegment, state: &AppState) -> Self {
        let stop = |id: Option<StopId>| {
            id.map(|id| StopView {
                id,
                name: state.stop_label(id),
            })
        };
        let seg = &s.segment;
        Self {
            sequence: s.sequence,
            kind: seg.kind,
            reference: seg.reference,
            day: seg.day,
            start: seg.start,
            end: seg.end,
            duration_minutes: seg.duration_minutes(),
            origin: stop(seg.origin),
            destination: stop(seg.destination),
            route: seg.route,
            trip_index: seg.trip_index,
            travel_minutes: seg.travel_minutes,
            buffer_minutes: seg.buffer_minutes,
            note: seg.note.clone(),
        }
    }
}

/// A squad in the squad list.
#[derive(Debug, Serialize)]
pub struct SquadSummary {
    pub id: SquadId,
    pub name: String,
    pub headcount: u32,
    pub segments: usize,
    /// Segments needing transport arranged by hand
    pub manual_transport: usize,
}

#[derive(Debug, Serialize)]
pub struct SquadsResponse {
    pub squads: Vec<SquadSummary>,
    /// Squads that could not be planned
    pub failures: Vec<FailureRecord>,
}

#[derive(Debug, Serialize)]
pub struct ItineraryResponse {
    pub squad: SquadId,
    pub name: String,
    pub headcount: u32,
    pub segments: Vec<SegmentView>,
}

/// Query for the trip load list.
#[derive(Debug, Default, Deserialize)]
pub struct LoadsQuery {
    /// Only list trips loaded beyond the limit
    #[serde(default)]
    pub over_limit: bool,
}

#[derive(Debug, Serialize)]
pub struct LoadView {
    #[serde(flatten)]
    pub load: TripLoad,
    pub over_limit: bool,
}

#[derive(Debug, Serialize)]
pub struct LoadsResponse {
    pub loads: Vec<LoadView>,
    pub total_headcount: u64,
}

/// Query for manual transport needs.
#[derive(Debug, Default, Deserialize)]
pub struct ManualTransportQuery {
    /// Day code ("fri", "sat", "sun")
    pub day: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ManualNeedView {
    pub squad: SquadId,
    pub squad_name: String,
    pub headcount: u32,
    #[serde(flatten)]
    pub segment: SegmentView,
}

#[derive(Debug, Serialize)]
pub struct ManualTransportResponse {
    pub needs: Vec<ManualNeedView>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
