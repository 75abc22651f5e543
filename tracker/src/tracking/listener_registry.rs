use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use crate::{
    tracking::error::{error_chain, CleanupError, TrackerError},
    Epoch, LocationName, Subscription, TrackingId,
};

/// Undoes a listener registration
pub trait CleanupAction {
    fn run(self) -> Result<(), CleanupError>;
}

impl CleanupAction for Subscription {
    fn run(self) -> Result<(), CleanupError> {
        self.cancel()
    }
}

/// Binds a tracked entity's identity to the cleanup of its listener
pub struct TrackingEntry<C: CleanupAction> {
    pub location: LocationName,
    pub id: TrackingId,
    pub epoch: Epoch,
    cleanup: C,
}

impl<C: CleanupAction> TrackingEntry<C> {
    fn run(self) -> usize {
        let TrackingEntry {
            location,
            id,
            epoch,
            cleanup,
        } = self;
        match cleanup.run() {
            Ok(()) => {
                debug!("Cleaned up listener {} in '{}' from {}", id, location, epoch);
            }
            Err(source) => {
                let error = TrackerError::Cleanup {
                    location,
                    id,
                    source,
                };
                warn!("Exception while cleaning up: {}", error_chain(&error));
            }
        }
        1
    }
}

/// Arena of [`TrackingEntry`]s keyed by (location, tracking id), holding at
/// most one entry per key.
pub struct ListenerRegistry<C: CleanupAction> {
    entries: HashMap<(LocationName, TrackingId), TrackingEntry<C>>,
    ids_by_location: HashMap<LocationName, HashSet<TrackingId>>,
}

impl<C: CleanupAction> Default for ListenerRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: CleanupAction> ListenerRegistry<C> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            ids_by_location: HashMap::new(),
        }
    }

    /// Stores `cleanup` for the key. An existing entry for the same key is run
    /// and removed first.
    pub fn add_cleanup(&mut self, location: &str, id: TrackingId, epoch: Epoch, cleanup: C) {
        if self.contains(location, id) {
            debug!("Replacing listener {} in '{}'", id, location);
            self.run_and_clear(Some(location), Some(id));
        }

        self.ids_by_location
            .entry(location.to_string())
            .or_default()
            .insert(id);
        self.entries.insert(
            (location.to_string(), id),
            TrackingEntry {
                location: location.to_string(),
                id,
                epoch,
                cleanup,
            },
        );
    }

    /// Forgets the entry without running it. Returns whether one existed.
    pub fn remove_cleanup(&mut self, location: &str, id: TrackingId) -> bool {
        self.take(location, id).is_some()
    }

    /// Runs and removes every entry matching the filters. With both given this
    /// is a direct lookup; with neither, every entry is run.
    ///
    /// Returns how many cleanups ran.
    pub fn run_and_clear(&mut self, location: Option<&str>, id: Option<TrackingId>) -> usize {
        match (location, id) {
            (Some(location), Some(id)) => match self.take(location, id) {
                Some(entry) => entry.run(),
                None => {
                    debug!(
                        "Tried to clean up non-existent listener {} in '{}'",
                        id, location
                    );
                    0
                }
            },
            (Some(location), None) => {
                let Some(ids) = self.ids_by_location.remove(location) else {
                    return 0;
                };
                ids.into_iter()
                    .filter_map(|id| self.entries.remove(&(location.to_string(), id)))
                    .map(TrackingEntry::run)
                    .sum()
            }
            (None, Some(id)) => {
                let locations: Vec<LocationName> = self
                    .ids_by_location
                    .iter()
                    .filter(|(_, ids)| ids.contains(&id))
                    .map(|(location, _)| location.clone())
                    .collect();
                locations
                    .into_iter()
                    .filter_map(|location| self.take(&location, id))
                    .map(TrackingEntry::run)
                    .sum()
            }
            (None, None) => {
                self.ids_by_location.clear();
                self.entries
                    .drain()
                    .map(|(_, entry)| entry)
                    .collect::<Vec<_>>()
                    .into_iter()
                    .map(TrackingEntry::run)
                    .sum()
            }
        }
    }

    /// Drops every entry without running it, returning how many there were
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.ids_by_location.clear();
        count
    }

    pub fn contains(&self, location: &str, id: TrackingId) -> bool {
        self.entries.contains_key(&(location.to_string(), id))
    }

    pub fn entry(&self, location: &str, id: TrackingId) -> Option<&TrackingEntry<C>> {
        self.entries.get(&(location.to_string(), id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn location_len(&self, location: &str) -> usize {
        self.ids_by_location
            .get(location)
            .map(HashSet::len)
            .unwrap_or(0)
    }

    fn take(&mut self, location: &str, id: TrackingId) -> Option<TrackingEntry<C>> {
        let entry = self.entries.remove(&(location.to_string(), id))?;
        if let Some(ids) = self.ids_by_location.get_mut(location) {
            ids.remove(&id);
            if ids.is_empty() {
                self.ids_by_location.remove(location);
            }
        }
        Some(entry)
    }
}
