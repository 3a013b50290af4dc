//! Transport stops.

use serde::{Deserialize, Serialize};

use super::StopId;

/// A physical transport location.
///
/// `name` is the canonical name used for matching upstream documents;
/// `display_name` is what squads see on their itinerary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stop {
    pub id: StopId,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Stop {
    /// Create a stop whose display name equals its canonical name.
    pub fn new(id: StopId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            display_name: None,
        }
    }

    /// Name to show to squads, falling back to the canonical name.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}
