use std::{
    collections::{HashMap, HashSet},
    mem,
};

use crate::{LocationName, Tick, Tile};

/// Tiles in one location whose nearby producers need recomputing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduledUpdate {
    pub location: LocationName,
    pub tiles: HashSet<Tile>,
}

/// Collects tiles from mutation callbacks so that every change within a
/// drain interval costs a single recompute pass per location.
pub struct UpdateScheduler {
    pending: HashMap<LocationName, HashSet<Tile>>,
    drain_interval_ticks: Tick,
}

impl UpdateScheduler {
    pub fn new(drain_interval_ticks: Tick) -> Self {
        Self {
            pending: HashMap::new(),
            drain_interval_ticks: drain_interval_ticks.max(1),
        }
    }

    pub fn enqueue(&mut self, location: &str, tile: Tile) {
        self.pending
            .entry(location.to_string())
            .or_default()
            .insert(tile);
    }

    pub fn is_due(&self, tick: Tick) -> bool {
        tick % self.drain_interval_ticks == 0
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_tiles(&self, location: &str) -> HashSet<Tile> {
        self.pending.get(location).cloned().unwrap_or_default()
    }

    /// Takes everything pending, leaving the scheduler empty
    pub fn drain(&mut self) -> Vec<ScheduledUpdate> {
        mem::take(&mut self.pending)
            .into_iter()
            .map(|(location, tiles)| ScheduledUpdate { location, tiles })
            .collect()
    }

    pub fn remove_location(&mut self, location: &str) {
        self.pending.remove(location);
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
