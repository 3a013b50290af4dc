//! Links between transport stops and tournament places.
//!
//! A stop may serve several halls and lodgings, and a hall or lodging may be
//! linked from several stops. The planner needs a single boarding stop per
//! place, so the first link listed for a place wins.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{HallId, LodgingId, StopId};

/// One stop-to-place link as it appears in the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRow {
    pub stop: StopId,
    #[serde(default)]
    pub hall: Option<HallId>,
    #[serde(default)]
    pub lodging: Option<LodgingId>,
}

/// A hall known under another id, e.g. the same venue listed twice in the
/// fixture list with different spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HallAlias {
    pub hall: HallId,
    pub canonical: HallId,
}

/// Resolves halls and lodgings to their transport stops.
#[derive(Debug, Clone, Default)]
pub struct StopLinks {
    halls: HashMap<HallId, StopId>,
    lodgings: HashMap<LodgingId, StopId>,
    aliases: HashMap<HallId, HallId>,
}

impl StopLinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from link rows and hall aliases. The first row for a place wins.
    pub fn from_rows(rows: &[LinkRow], aliases: &[HallAlias]) -> Self {
        let mut links = Self::new();
        for row in rows {
            if let Some(hall) = row.hall {
                links.link_hall(hall, row.stop);
            }
            if let Some(lodging) = row.lodging {
                links.link_lodging(lodging, row.stop);
            }
        }
        for alias in aliases {
            links.aliases.entry(alias.hall).or_insert(alias.canonical);
        }
        links
    }

    /// Link a hall to a stop unless it is already linked.
    pub fn link_hall(&mut self, hall: HallId, stop: StopId) -> &mut Self {
        if let Some(existing) = self.halls.get(&hall) {
            debug!(%hall, %existing, ignored = %stop, "hall already linked");
        } else {
            self.halls.insert(hall, stop);
        }
        self
    }

    /// Link a lodging to a stop unless it is already linked.
    pub fn link_lodging(&mut self, lodging: LodgingId, stop: StopId) -> &mut Self {
        self.lodgings.entry(lodging).or_insert(stop);
        self
    }

    /// Register `hall` as another name for `canonical`.
    pub fn alias_hall(&mut self, hall: HallId, canonical: HallId) -> &mut Self {
        self.aliases.insert(hall, canonical);
        self
    }

    /// Boarding stop for a hall, trying its alias when it has no link itself.
    pub fn hall_stop(&self, hall: HallId) -> Option<StopId> {
        self.halls.get(&hall).copied().or_else(|| {
            self.aliases
                .get(&hall)
                .and_then(|canonical| self.halls.get(canonical))
                .copied()
        })
    }

    /// Boarding stop for a lodging (the squad's daily anchor).
    pub fn lodging_stop(&self, lodging: LodgingId) -> Option<StopId> {
        self.lodgings.get(&lodging).copied()
    }

    pub fn hall_count(&self) -> usize {
        self.halls.len()
    }

    pub fn lodging_count(&self) -> usize {
        self.lodgings.len()
    }
}
