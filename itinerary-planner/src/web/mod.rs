//! Web layer for the itinerary planner.
//!
//! Serves the result of a completed planning run as read-only JSON.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
