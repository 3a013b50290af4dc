//! Domain types for the tournament itinerary planner.
//!
//! This module contains the core domain model types that represent
//! validated tournament data. Types enforce their invariants at construction
//! time, so code that receives these types can trust their validity.

mod candidate;
mod day;
mod error;
mod event;
mod ids;
mod segment;
mod squad;
mod stop;
mod time;
mod trip;

pub use candidate::TripCandidate;
pub use day::{InvalidServiceDay, ServiceDay};
pub use error::DomainError;
pub use event::{CommunalEvent, EventCalendar, EventKind};
pub use ids::{EventId, GameId, HallId, LodgingId, RouteId, SquadId, StopId, TripIndex};
pub use segment::{Segment, SegmentKind, SegmentRef};
pub use squad::{Game, Squad};
pub use stop::Stop;
pub use time::{ClockTime, TimeError};
pub use trip::{StopTime, TripInstance, TripKey};
