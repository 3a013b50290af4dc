//! Derived views for capacity auditing and transport handoff.

use serde::{Deserialize, Serialize};

use crate::domain::{RouteId, ServiceDay, SquadId, TripIndex};
use crate::planner::CapacityLedger;

use super::{ItineraryRun, SequencedSegment};

/// Committed headcount on one trip instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripLoad {
    pub day: ServiceDay,
    pub route: RouteId,
    pub trip_index: TripIndex,
    pub headcount: u32,
    pub limit: u32,
}

impl TripLoad {
    pub fn over_limit(&self) -> bool {
        self.headcount > self.limit
    }
}

/// Committed headcount per trip instance, in trip key order.
pub fn trip_loads(ledger: &CapacityLedger) -> Vec<TripLoad> {
    ledger
        .loads()
        .map(|(key, headcount)| TripLoad {
            day: key.day,
            route: key.route,
            trip_index: key.index,
            headcount,
            limit: ledger.limit(),
        })
        .collect()
}

/// A segment someone has to arrange transport for by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualTransportNeed {
    pub squad: SquadId,
    pub squad_name: String,
    pub headcount: u32,
    #[serde(flatten)]
    pub segment: SequencedSegment,
}

/// Every note segment and every bus segment without a route.
pub fn manual_transport_needs(run: &ItineraryRun) -> Vec<ManualTransportNeed> {
    run.itineraries
        .iter()
        .flat_map(|itinerary| {
            itinerary
                .segments
                .iter()
                .filter(|s| s.segment.needs_manual_transport())
                .map(|s| ManualTransportNeed {
                    squad: itinerary.squad,
                    squad_name: itinerary.name.clone(),
                    headcount: itinerary.headcount,
                    segment: s.clone(),
                })
        })
        .collect()
}
