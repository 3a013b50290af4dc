//! Tournament itinerary planner.
//!
//! Plans every squad's travel between lodging, games, the communal lunch and
//! the concert on a shared bus network, without overfilling any bus.

pub mod dataset;
pub mod domain;
pub mod itinerary;
pub mod planner;
pub mod timetable;
pub mod web;
