use std::collections::{HashMap, HashSet};

use log::{debug, info, warn};

use crate::{
    tracking::{
        error::{error_chain, TrackerError},
        tracker::TrackerCore,
    },
    LocationName, ProducerRef, SourceQuery, SourceRef, Tile, TrackingId, WorldHost,
};

type ProducerSet = HashMap<TrackingId, ProducerRef>;

/// Producers indexed per location: those ready now, whose display value is
/// kept current, and those that will become ready later today.
#[derive(Default)]
pub struct ProducerCache {
    ready: HashMap<LocationName, ProducerSet>,
    ready_later: HashMap<LocationName, ProducerSet>,
}

impl ProducerCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the producer was not already indexed as ready
    pub fn insert_ready(&mut self, location: &str, producer: &ProducerRef) -> bool {
        let id = producer.tag().get_or_assign();
        if let Some(later) = self.ready_later.get_mut(location) {
            later.remove(&id);
        }
        self.ready
            .entry(location.to_string())
            .or_default()
            .insert(id, producer.clone())
            .is_none()
    }

    pub fn insert_ready_later(&mut self, location: &str, producer: &ProducerRef) -> bool {
        let id = producer.tag().get_or_assign();
        self.ready_later
            .entry(location.to_string())
            .or_default()
            .insert(id, producer.clone())
            .is_none()
    }

    /// Drops the producer from both indices
    pub fn remove(&mut self, location: &str, producer: &ProducerRef) -> bool {
        let Some(id) = producer.tag().get() else {
            return false;
        };
        let from_ready = remove_from(&mut self.ready, location, id);
        let from_later = remove_from(&mut self.ready_later, location, id);
        from_ready || from_later
    }

    pub fn ready(&self, location: &str) -> Vec<ProducerRef> {
        self.ready
            .get(location)
            .map(|set| set.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn ready_len(&self, location: &str) -> usize {
        self.ready.get(location).map(HashMap::len).unwrap_or(0)
    }

    pub fn ready_later_len(&self, location: &str) -> usize {
        self.ready_later.get(location).map(HashMap::len).unwrap_or(0)
    }

    pub fn ready_locations(&self) -> Vec<LocationName> {
        self.ready.keys().cloned().collect()
    }

    pub fn ready_later_locations(&self) -> Vec<LocationName> {
        self.ready_later.keys().cloned().collect()
    }

    /// Removes and returns the waiting producers that have since become ready
    pub fn take_newly_ready(&mut self, location: &str) -> Vec<ProducerRef> {
        let Some(later) = self.ready_later.get_mut(location) else {
            return Vec::new();
        };
        let ids: Vec<TrackingId> = later
            .iter()
            .filter(|(_, producer)| producer.is_ready())
            .map(|(id, _)| *id)
            .collect();
        let newly_ready = ids.iter().filter_map(|id| later.remove(id)).collect();
        if later.is_empty() {
            self.ready_later.remove(location);
        }
        newly_ready
    }

    /// Ready producers for which `in_range(producer_tile, tile)` holds for at
    /// least one of `tiles`
    pub fn ready_near(
        &self,
        location: &str,
        tiles: &HashSet<Tile>,
        in_range: impl Fn(Tile, Tile) -> bool,
    ) -> Vec<ProducerRef> {
        let Some(set) = self.ready.get(location) else {
            return Vec::new();
        };
        set.values()
            .filter(|producer| {
                let producer_tile = producer.tile();
                tiles.iter().any(|tile| in_range(producer_tile, *tile))
            })
            .cloned()
            .collect()
    }

    pub fn remove_location(&mut self, location: &str) {
        self.ready.remove(location);
        self.ready_later.remove(location);
    }

    pub fn clear(&mut self) {
        self.ready.clear();
        self.ready_later.clear();
    }
}

fn remove_from(sets: &mut HashMap<LocationName, ProducerSet>, location: &str, id: TrackingId) -> bool {
    let Some(set) = sets.get_mut(location) else {
        return false;
    };
    let removed = set.remove(&id).is_some();
    if set.is_empty() {
        sets.remove(location);
    }
    removed
}

impl<H: WorldHost + 'static> TrackerCore<H> {
    /// Rewrites the display value of each producer from the nearest source in
    /// range, tracking any source found along the way.
    pub(crate) fn recompute(&mut self, location: &str, producers: Vec<ProducerRef>) {
        let mut invalid = Vec::new();
        let mut newly_tracked = 0;

        for producer in producers {
            if !producer.is_valid() || !producer.is_ready() {
                if !producer.is_valid() {
                    info!(
                        "Found an invalid producer in '{}' @ {}; removing from tracking",
                        location,
                        producer.tile()
                    );
                }
                invalid.push(producer);
                continue;
            }

            let ingredient = match self.nearest_source(location, producer.tile()) {
                Some(source) => match source.ingredient() {
                    Some(ingredient) => {
                        if self.track_source(location, &source) {
                            newly_tracked += 1;
                        }
                        Some(ingredient)
                    }
                    None => {
                        info!(
                            "Nearby {} '{}' @ {} has no ingredient assigned",
                            source.kind(),
                            source.label(),
                            source.tile()
                        );
                        None
                    }
                },
                None => None,
            };

            producer.set_display(self.config.display_mode.display_for(ingredient));
        }

        for producer in &invalid {
            self.producers.remove(location, producer);
        }

        debug!(
            "Updated {} ready producers in '{}'{}",
            self.producers.ready_len(location),
            location,
            if newly_tracked > 0 {
                format!(" and now tracking {} additional nearby sources", newly_tracked)
            } else {
                String::new()
            }
        );
    }

    fn nearest_source(&self, location: &str, tile: Tile) -> Option<SourceRef> {
        let query = SourceQuery {
            tile,
            radius: self.host.effective_range(),
            range_policy: self.config.range_policy,
            include_non_dirt: self.config.track_non_dirt_sources,
        };

        match self.host.nearest_source(location, &query) {
            Ok(Some(source)) if !source.is_valid() => {
                debug!(
                    "Ignoring consumed {} '{}' @ {} returned as nearest",
                    source.kind(),
                    source.label(),
                    source.tile()
                );
                None
            }
            Ok(found) => found,
            Err(source) => {
                let error = TrackerError::NearestSourceQuery {
                    location: location.to_string(),
                    tile,
                    source,
                };
                warn!("{}", error_chain(&error));
                None
            }
        }
    }
}
