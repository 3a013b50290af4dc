//! Itinerary planning against a shared bus capacity ledger.
//!
//! This module implements the core planning algorithm that answers:
//! "How does each squad get to its games, lunch and the concert without
//! overfilling any bus?"
//!
//! Squads are planned one at a time in a fixed order. Each squad greedily
//! commits the rides it needs to the ledger before the next squad is planned,
//! so earlier squads get first pick and results are reproducible.

mod activity;
mod builder;
mod config;
mod finder;
mod ledger;
mod travel;


use tracing::{info, warn};

use crate::domain::{EventCalendar, Segment, Squad, SquadId};
use crate::timetable::{StopLinks, TimetableQuery};

pub use activity::{ActivityPlanner, Cursor, PlanError};
pub use builder::MANUAL_TRANSPORT;
pub use config::PlannerConfig;
pub use finder::{Preference, Ride, RideRequest, TripFinder};
pub use ledger::CapacityLedger;
pub use travel::TravelStrategy;

/// The planned segments for one squad, in the order they were planned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquadPlan {
    pub squad: SquadId,
    pub name: String,
    pub headcount: u32,
    pub segments: Vec<Segment>,
}

/// A squad that could not be planned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquadFailure {
    pub squad: SquadId,
    pub name: String,
    pub error: PlanError,
}

/// Result of planning every squad.
#[derive(Debug, Clone)]
pub struct PlanRun {
    pub plans: Vec<SquadPlan>,
    pub failures: Vec<SquadFailure>,
    /// Final committed loads.
    pub ledger: CapacityLedger,
}

/// Inputs shared by every squad in a run.
pub struct PlanInputs<'a, Q: TimetableQuery> {
    pub timetable: &'a Q,
    pub links: &'a StopLinks,
    pub calendar: &'a EventCalendar,
    pub squads: &'a [Squad],
}

/// Plan every squad in order against a fresh ledger.
///
/// A squad with missing reference data is recorded as a failure and
/// skipped; the others are still planned.
pub fn plan_all<Q: TimetableQuery>(inputs: &PlanInputs<'_, Q>, config: &PlannerConfig) -> PlanRun {
    let planner = ActivityPlanner::new(inputs.timetable, inputs.links, inputs.calendar, config);
    let mut ledger = CapacityLedger::new(config.capacity_limit);
    let mut plans = Vec::with_capacity(inputs.squads.len());
    let mut failures = Vec::new();

    for squad in inputs.squads {
        match planner.plan_squad(&mut ledger, squad) {
            Ok(segments) => plans.push(SquadPlan {
                squad: squad.id,
                name: squad.name.clone(),
                headcount: squad.headcount,
                segments,
            }),
            Err(error) => {
                warn!(squad = %squad.id, name = %squad.name, %error, "squad not planned");
                failures.push(SquadFailure {
                    squad: squad.id,
                    name: squad.name.clone(),
                    error,
                });
            }
        }
    }

    let over_limit = ledger.over_limit();
    info!(
        squads = plans.len(),
        failed = failures.len(),
        trips_used = ledger.loads().count(),
        over_limit = over_limit.len(),
        "planning run complete"
    );

    PlanRun {
        plans,
        failures,
        ledger,
    }
}
