use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use log::debug;

use proxima_tracker::{
    Clock, HostError, LocationInfo, LocationName, ProducerRef, RangeStrategy, SourceKind,
    SourceQuery, SourceRef, Tile, WorldHost,
};

use super::ManualClock;

#[derive(Default)]
struct TestLocation {
    is_outdoors: bool,
    producers: Vec<ProducerRef>,
    sources: Vec<SourceRef>,
}

struct TestWorld {
    locations: BTreeMap<LocationName, TestLocation>,
    effective_range: u32,
    minutes_until_end_of_day: u32,
    producers_refresh_daily: bool,
    settings_changed: bool,
    failing_nearest_queries: bool,
    nearest_queries: usize,
}

/// In-memory world for driving a tracker. Clones share the same world, so a
/// test keeps one handle while the tracker owns another.
#[derive(Clone)]
pub struct TestHost {
    world: Rc<RefCell<TestWorld>>,
    clock: Rc<ManualClock>,
}

impl Default for TestHost {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHost {
    pub fn new() -> Self {
        Self {
            world: Rc::new(RefCell::new(TestWorld {
                locations: BTreeMap::new(),
                effective_range: 5,
                minutes_until_end_of_day: 1200,
                producers_refresh_daily: true,
                settings_changed: false,
                failing_nearest_queries: false,
                nearest_queries: 0,
            })),
            clock: Rc::new(ManualClock::new()),
        }
    }

    pub fn manual_clock(&self) -> Rc<ManualClock> {
        self.clock.clone()
    }

    pub fn add_location(&self, name: &str, is_outdoors: bool) {
        self.world.borrow_mut().locations.insert(
            name.to_string(),
            TestLocation {
                is_outdoors,
                ..Default::default()
            },
        );
    }

    pub fn remove_location(&self, name: &str) {
        self.world.borrow_mut().locations.remove(name);
    }

    pub fn add_producer(&self, location: &str, producer: ProducerRef) {
        if let Some(found) = self.world.borrow_mut().locations.get_mut(location) {
            found.producers.push(producer);
        }
    }

    pub fn remove_producer(&self, location: &str, producer: &ProducerRef) {
        if let Some(found) = self.world.borrow_mut().locations.get_mut(location) {
            found
                .producers
                .retain(|existing| !Rc::ptr_eq(existing, producer));
        }
    }

    pub fn add_source(&self, location: &str, source: SourceRef) {
        if let Some(found) = self.world.borrow_mut().locations.get_mut(location) {
            found.sources.push(source);
        }
    }

    pub fn remove_source(&self, location: &str, source: &SourceRef) {
        if let Some(found) = self.world.borrow_mut().locations.get_mut(location) {
            found.sources.retain(|existing| !Rc::ptr_eq(existing, source));
        }
    }

    pub fn set_effective_range(&self, range: u32) {
        self.world.borrow_mut().effective_range = range;
    }

    pub fn set_minutes_until_end_of_day(&self, minutes: u32) {
        self.world.borrow_mut().minutes_until_end_of_day = minutes;
    }

    pub fn set_producers_refresh_daily(&self, refresh_daily: bool) {
        self.world.borrow_mut().producers_refresh_daily = refresh_daily;
    }

    /// The next settings check will report a change
    pub fn change_settings(&self) {
        self.world.borrow_mut().settings_changed = true;
    }

    pub fn fail_nearest_queries(&self, failing: bool) {
        self.world.borrow_mut().failing_nearest_queries = failing;
    }

    pub fn nearest_queries(&self) -> usize {
        self.world.borrow().nearest_queries
    }
}

fn qualifies(source: &SourceRef, query: &SourceQuery) -> bool {
    if !query.include_non_dirt && source.kind() != SourceKind::DirtCrop {
        return false;
    }
    source.is_valid() && source.nested().iter().all(|nested| nested.is_valid())
}

fn squared_distance(a: Tile, b: Tile) -> i64 {
    let dx = i64::from(a.x) - i64::from(b.x);
    let dy = i64::from(a.y) - i64::from(b.y);
    dx * dx + dy * dy
}

impl WorldHost for TestHost {
    fn location_names(&self) -> Vec<LocationName> {
        self.world.borrow().locations.keys().cloned().collect()
    }

    fn resolve_location(&self, location: &str) -> Option<LocationInfo> {
        self.world
            .borrow()
            .locations
            .get(location)
            .map(|found| LocationInfo {
                name: location.to_string(),
                is_outdoors: found.is_outdoors,
            })
    }

    fn producers(&self, location: &str) -> Vec<ProducerRef> {
        self.world
            .borrow()
            .locations
            .get(location)
            .map(|found| found.producers.clone())
            .unwrap_or_default()
    }

    fn nearest_source(
        &self,
        location: &str,
        query: &SourceQuery,
    ) -> Result<Option<SourceRef>, HostError> {
        let mut world = self.world.borrow_mut();
        world.nearest_queries += 1;
        if world.failing_nearest_queries {
            debug!("Failing nearest source query in '{}'", location);
            return Err(HostError::with_source(
                format!("search around {} failed", query.tile),
                std::io::Error::new(std::io::ErrorKind::Other, "terrain features unavailable"),
            ));
        }

        let Some(found) = world.locations.get(location) else {
            return Ok(None);
        };
        let nearest = found
            .sources
            .iter()
            .filter(|source| qualifies(source, query))
            .filter_map(|source| {
                source
                    .footprint()
                    .into_iter()
                    .filter(|tile| query.range_policy.in_range(*tile, query.tile, query.radius))
                    .map(|tile| squared_distance(tile, query.tile))
                    .min()
                    .map(|distance| (distance, source))
            })
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, source)| source.clone());
        Ok(nearest)
    }

    fn effective_range(&self) -> u32 {
        self.world.borrow().effective_range
    }

    fn clock(&self) -> Rc<dyn Clock> {
        self.clock.clone()
    }

    fn minutes_until_end_of_day(&self) -> u32 {
        self.world.borrow().minutes_until_end_of_day
    }

    fn producers_refresh_daily(&self) -> bool {
        self.world.borrow().producers_refresh_daily
    }

    fn settings_changed(&self) -> bool {
        std::mem::take(&mut self.world.borrow_mut().settings_changed)
    }
}
