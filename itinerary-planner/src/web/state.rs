//! Application state for the web layer.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::StopId;
use crate::itinerary::ItineraryRun;
use crate::timetable::Timetable;

/// Shared application state.
///
/// The planning run is complete before the server starts, so everything
/// here is read-only.
#[derive(Clone)]
pub struct AppState {
    /// The stored planning run
    pub run: Arc<ItineraryRun>,

    /// Display names for stops referenced by segments
    pub stop_labels: Arc<HashMap<StopId, String>>,
}

impl AppState {
    pub fn new(run: ItineraryRun, stop_labels: HashMap<StopId, String>) -> Self {
        Self {
            run: Arc::new(run),
            stop_labels: Arc::new(stop_labels),
        }
    }

    /// State labelling stops with their timetable display names.
    pub fn with_timetable(run: ItineraryRun, timetable: &Timetable) -> Self {
        let labels = timetable
            .stops()
            .map(|stop| (stop.id, stop.label().to_string()))
            .collect();
        Self::new(run, labels)
    }

    pub fn stop_label(&self, id: StopId) -> String {
        self.stop_labels
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }
}
