use std::collections::HashMap;

use log::debug;

use crate::{LocationName, SourceKind, SourceRef, TrackingId};

/// Sources currently tracked, by location and then by kind.
#[derive(Default)]
pub struct SourceRegistry {
    sources: HashMap<LocationName, HashMap<SourceKind, HashMap<TrackingId, SourceRef>>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the source, assigning its tracking id if it has none yet.
    ///
    /// Returns the id when the source was newly added, `None` when it was
    /// already tracked or the location name is empty.
    pub fn try_track(&mut self, location: &str, source: &SourceRef) -> Option<TrackingId> {
        if location.trim().is_empty() {
            return None;
        }

        let id = source.tag().get_or_assign();
        let by_id = self
            .sources
            .entry(location.to_string())
            .or_default()
            .entry(source.kind())
            .or_default();
        if by_id.contains_key(&id) {
            return None;
        }

        by_id.insert(id, source.clone());
        debug!(
            "Tracking {} '{}' @ {} in '{}' as {}",
            source.kind(),
            source.label(),
            source.tile(),
            location,
            id
        );
        Some(id)
    }

    pub fn untrack(&mut self, location: &str, kind: SourceKind, id: TrackingId) -> Option<SourceRef> {
        let by_kind = self.sources.get_mut(location)?;
        let by_id = by_kind.get_mut(&kind)?;
        let removed = by_id.remove(&id);
        if by_id.is_empty() {
            by_kind.remove(&kind);
        }
        if by_kind.is_empty() {
            self.sources.remove(location);
        }
        removed
    }

    pub fn contains(&self, location: &str, kind: SourceKind, id: TrackingId) -> bool {
        self.sources
            .get(location)
            .and_then(|by_kind| by_kind.get(&kind))
            .map(|by_id| by_id.contains_key(&id))
            .unwrap_or(false)
    }

    /// Whether `source` is tracked, without assigning it an id
    pub fn is_tracked(&self, location: &str, source: &SourceRef) -> bool {
        match source.tag().get() {
            Some(id) => self.contains(location, source.kind(), id),
            None => false,
        }
    }

    pub fn all_tracked(&self, location: &str, kind: SourceKind) -> Vec<SourceRef> {
        self.sources
            .get(location)
            .and_then(|by_kind| by_kind.get(&kind))
            .map(|by_id| by_id.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn location_len(&self, location: &str) -> usize {
        self.sources
            .get(location)
            .map(|by_kind| by_kind.values().map(HashMap::len).sum())
            .unwrap_or(0)
    }

    pub fn remove_location(&mut self, location: &str) {
        self.sources.remove(location);
    }

    pub fn clear(&mut self) {
        self.sources.clear();
    }
}
