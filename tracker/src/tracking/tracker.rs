use std::{
    cell::RefCell,
    collections::HashSet,
    rc::{Rc, Weak},
};

use log::{debug, info, trace, warn, Level};

use crate::{
    constants::START_OF_DAY_TIME,
    tracking::{
        config::TrackerConfig,
        epoch_guard::EpochGuard,
        error::TrackerError,
        listener_registry::ListenerRegistry,
        log_once::LogOnce,
        producer_cache::ProducerCache,
        source_registry::SourceRegistry,
        update_scheduler::UpdateScheduler,
    },
    Epoch, ListenerAction, LocationName, ProducerRef, RangeStrategy, SourceKind, SourceRef,
    Subscription, Tick, Tile, TrackingId, ValidityListener, WorldEntity, WorldHost,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TrackerState {
    #[default]
    Uninitialized,
    DayActive,
    DayEnding,
    /// Returned to the title screen; the next day start begins from scratch
    Shutdown,
}

pub(crate) struct TrackerCore<H: WorldHost + 'static> {
    pub(crate) host: H,
    pub(crate) config: TrackerConfig,
    pub(crate) producers: ProducerCache,
    state: TrackerState,
    epoch_guard: EpochGuard,
    sources: SourceRegistry,
    listeners: ListenerRegistry<Subscription>,
    scheduler: UpdateScheduler,
    log_once: LogOnce,
    self_ref: Weak<RefCell<TrackerCore<H>>>,
}

impl<H: WorldHost + 'static> TrackerCore<H> {
    fn new(host: H, config: TrackerConfig, self_ref: Weak<RefCell<TrackerCore<H>>>) -> Self {
        let epoch_guard = EpochGuard::new(host.clock());
        let scheduler = UpdateScheduler::new(config.drain_interval_ticks);
        Self {
            host,
            config,
            producers: ProducerCache::new(),
            state: TrackerState::Uninitialized,
            epoch_guard,
            sources: SourceRegistry::new(),
            listeners: ListenerRegistry::new(),
            scheduler,
            log_once: LogOnce::new(),
            self_ref,
        }
    }

    // Lifecycle

    fn day_started(&mut self) {
        let outlived = self.listeners.clear();
        if outlived > 0 {
            warn!(
                "{} listeners outlived their day; each will detach on its next change",
                outlived
            );
        }
        self.clear_indices();
        self.scan_locations();
        self.state = TrackerState::DayActive;
        info!("Day started in {}", self.epoch_guard.current());
    }

    fn day_ending(&mut self) {
        let count = self.listeners.run_and_clear(None, None);
        self.state = TrackerState::DayEnding;
        info!("Day ending; cleaned up {} listeners", count);
    }

    fn returned_to_title(&mut self) {
        self.listeners.run_and_clear(None, None);
        self.clear_indices();
        self.state = TrackerState::Shutdown;
        info!("Returned to title; all tracking cleared");
    }

    fn refresh_all(&mut self) {
        self.listeners.run_and_clear(None, None);
        self.clear_indices();
        self.scan_locations();
    }

    fn refresh_ready_producers(&mut self) {
        for location in self.producers.ready_locations() {
            if !self.location_resolves(&location) {
                continue;
            }
            let ready = self.producers.ready(&location);
            self.recompute(&location, ready);
        }
    }

    fn clear_indices(&mut self) {
        self.sources.clear();
        self.producers.clear();
        self.scheduler.clear();
    }

    // Locations

    fn scan_locations(&mut self) {
        for location in self.host.location_names() {
            self.add_location(&location);
        }
    }

    fn add_location(&mut self, location: &str) {
        let Some(info) = self.host.resolve_location(location) else {
            self.location_resolves(location);
            return;
        };
        if !info.is_outdoors && !self.config.include_indoor_locations {
            return;
        }

        let producers: Vec<ProducerRef> = self
            .host
            .producers(location)
            .into_iter()
            .filter(|producer| producer.is_valid())
            .collect();
        if producers.is_empty() {
            return;
        }

        let ready: Vec<ProducerRef> = producers
            .iter()
            .filter(|producer| producer.is_ready())
            .cloned()
            .collect();
        if !ready.is_empty() {
            info!("Found {} ready producers in '{}'", ready.len(), location);
            for producer in &ready {
                self.producers.insert_ready(location, producer);
            }
            self.recompute(location, ready);
        }

        if self.host.producers_refresh_daily() {
            return;
        }

        let minutes_left = self.host.minutes_until_end_of_day();
        let mut ready_later = 0;
        for producer in producers
            .iter()
            .filter(|producer| !producer.is_ready() && producer.minutes_until_ready() < minutes_left)
        {
            self.producers.insert_ready_later(location, producer);
            ready_later += 1;
        }
        if ready_later > 0 {
            info!(
                "Found {} producers that will be ready today in '{}'",
                ready_later, location
            );
        }
    }

    fn remove_location(&mut self, location: &str) {
        let count = self.listeners.run_and_clear(Some(location), None);
        self.sources.remove_location(location);
        self.producers.remove_location(location);
        self.scheduler.remove_location(location);
        debug!(
            "Stopped tracking '{}' ({} listeners cleaned up)",
            location, count
        );
    }

    fn location_resolves(&mut self, location: &str) -> bool {
        if self.host.resolve_location(location).is_some() {
            return true;
        }
        let error = TrackerError::LocationNotFound {
            location: location.to_string(),
        };
        self.log_once.log(
            Level::Warn,
            format!("{}; producers there will not be refreshed", error),
        );
        false
    }

    // Ticks

    fn update_tick(&mut self, tick: Tick) {
        if self.scheduler.is_due(tick) && self.scheduler.has_pending() {
            self.drain_scheduled();
        }
    }

    fn drain_scheduled(&mut self) {
        for update in self.scheduler.drain() {
            let to_update = self.ready_near(&update.location, &update.tiles);
            if to_update.is_empty() {
                continue;
            }
            debug!(
                "Found {} ready producers that need updating in '{}'",
                to_update.len(),
                update.location
            );
            if !self.location_resolves(&update.location) {
                continue;
            }
            self.recompute(&update.location, to_update);
        }
    }

    fn one_second_tick(&mut self, seconds: u64) {
        let interval = self.config.settings_check_interval_secs.max(1);
        if seconds % interval == 0 && self.host.settings_changed() {
            info!("Doing a full refresh because range settings changed");
            self.refresh_all();
        }
    }

    fn time_changed(&mut self, time: u32) {
        if time == START_OF_DAY_TIME || self.host.producers_refresh_daily() {
            return;
        }

        for location in self.producers.ready_later_locations() {
            let newly_ready = self.producers.take_newly_ready(&location);
            if newly_ready.is_empty() {
                continue;
            }
            info!(
                "Found {} newly ready producers in '{}'",
                newly_ready.len(),
                location
            );
            if !self.location_resolves(&location) {
                continue;
            }
            for producer in &newly_ready {
                self.producers.insert_ready(&location, producer);
            }
            self.recompute(&location, newly_ready);
        }
    }

    // World events

    fn entity_added(&mut self, location: &str, entity: WorldEntity) {
        match &entity {
            WorldEntity::Producer(producer) => self.producer_added(location, producer),
            WorldEntity::Source(_) | WorldEntity::Container { .. } => {
                let tiles: HashSet<Tile> = entity
                    .sources()
                    .iter()
                    .flat_map(|source| source.footprint())
                    .collect();
                self.refresh_near(location, &tiles);
            }
            WorldEntity::Other => {}
        }
    }

    fn producer_added(&mut self, location: &str, producer: &ProducerRef) {
        let Some(info) = self.host.resolve_location(location) else {
            self.location_resolves(location);
            return;
        };
        if (!info.is_outdoors && !self.config.include_indoor_locations) || !producer.is_valid() {
            return;
        }

        if producer.is_ready() {
            if self.producers.insert_ready(location, producer) {
                debug!("Tracking added ready producer in '{}' @ {}", location, producer.tile());
                self.recompute(location, vec![producer.clone()]);
            }
        } else if !self.host.producers_refresh_daily()
            && producer.minutes_until_ready() < self.host.minutes_until_end_of_day()
        {
            self.producers.insert_ready_later(location, producer);
        }
    }

    fn entity_removed(&mut self, location: &str, entity: WorldEntity) {
        if let WorldEntity::Producer(producer) = &entity {
            if self.producers.remove(location, producer) {
                debug!("Removed producer in '{}' @ {} from tracking", location, producer.tile());
            }
            return;
        }

        let mut tiles = HashSet::new();
        for source in entity.sources() {
            self.untrack_removed(location, &source, &mut tiles);
        }
        if !tiles.is_empty() {
            debug!(
                "Removed {:?} in '{}'; refreshing around {} tiles",
                entity,
                location,
                tiles.len()
            );
            self.refresh_near(location, &tiles);
        }
    }

    fn untrack_removed(&mut self, location: &str, source: &SourceRef, tiles: &mut HashSet<Tile>) {
        if let Some(id) = source.tag().get() {
            if self.sources.contains(location, source.kind(), id) {
                self.listeners.run_and_clear(Some(location), Some(id));
                self.sources.untrack(location, source.kind(), id);
                tiles.extend(source.footprint());
            }
        }
        for nested in source.nested() {
            self.untrack_removed(location, &nested, tiles);
        }
    }

    fn refresh_near(&mut self, location: &str, tiles: &HashSet<Tile>) {
        let to_update = self.ready_near(location, tiles);
        if !to_update.is_empty() {
            self.recompute(location, to_update);
        }
    }

    fn ready_near(&self, location: &str, tiles: &HashSet<Tile>) -> Vec<ProducerRef> {
        let policy = self.config.range_policy;
        let host = &self.host;
        self.producers.ready_near(location, tiles, |producer_tile, tile| {
            policy.in_range(producer_tile, tile, host.effective_range())
        })
    }

    // Sources

    /// Tracks the source and any sources nested in it, installing one validity
    /// listener per tracked entity. Returns whether the outer source was newly
    /// tracked.
    pub(crate) fn track_source(&mut self, location: &str, source: &SourceRef) -> bool {
        if !self.config.track_non_dirt_sources && source.kind() != SourceKind::DirtCrop {
            debug!(
                "{} '{}' @ {} is not trackable with non-dirt tracking disabled",
                source.kind(),
                source.label(),
                source.tile()
            );
            return false;
        }

        let Some(id) = self.sources.try_track(location, source) else {
            return false;
        };
        self.listen(location, id, source);

        for nested in source.nested() {
            self.track_source(location, &nested);
        }
        true
    }

    fn listen(&mut self, location: &str, id: TrackingId, source: &SourceRef) {
        let epoch = self.epoch_guard.current();
        let listener = validity_listener(
            self.self_ref.clone(),
            self.epoch_guard.clone(),
            location.to_string(),
            id,
            source.kind(),
            epoch,
        );

        match source.watch(listener) {
            Some(subscription) => self.listeners.add_cleanup(location, id, epoch, subscription),
            None => trace!(
                "{} '{}' has no validity signal; relying on removal events",
                source.kind(),
                source.label()
            ),
        }
    }

    fn source_invalidated(&mut self, location: &str, kind: SourceKind, id: TrackingId) {
        self.listeners.remove_cleanup(location, id);

        let Some(source) = self.sources.untrack(location, kind, id) else {
            debug!(
                "Validity listener fired in '{}' for untracked {} {}",
                location, kind, id
            );
            return;
        };

        info!(
            "Found consumed {} '{}' in '{}' @ {}",
            kind,
            source.label(),
            location,
            source.tile()
        );
        for tile in source.footprint() {
            self.scheduler.enqueue(location, tile);
        }
    }
}

fn validity_listener<H: WorldHost + 'static>(
    core: Weak<RefCell<TrackerCore<H>>>,
    epoch_guard: EpochGuard,
    location: LocationName,
    id: TrackingId,
    kind: SourceKind,
    registered: Epoch,
) -> ValidityListener {
    Rc::new(move |valid: bool| {
        if epoch_guard.is_stale(registered) {
            trace!(
                "Listener {} from {} fired in {}; detaching",
                id,
                registered,
                epoch_guard.current()
            );
            return ListenerAction::Detach;
        }
        if valid {
            return ListenerAction::Keep;
        }

        let Some(core) = core.upgrade() else {
            return ListenerAction::Detach;
        };
        let Ok(mut core) = core.try_borrow_mut() else {
            warn!(
                "{}; {} {} in '{}' stays tracked",
                TrackerError::Busy {
                    operation: "untrack a consumed source"
                },
                kind,
                id,
                location
            );
            return ListenerAction::Keep;
        };
        core.source_invalidated(&location, kind, id);
        ListenerAction::Detach
    })
}

/// Keeps producers' display values in sync with the nearest source in range.
///
/// All host events go through the `on_*` methods. None of them return errors:
/// problems are logged and degrade to the default display value.
pub struct Tracker<H: WorldHost + 'static> {
    core: Rc<RefCell<TrackerCore<H>>>,
}

impl<H: WorldHost + 'static> Tracker<H> {
    pub fn new(host: H, config: TrackerConfig) -> Self {
        let core = Rc::new_cyclic(|self_ref| {
            RefCell::new(TrackerCore::new(host, config, self_ref.clone()))
        });
        Self { core }
    }

    fn with_core<R: Default>(
        &self,
        operation: &'static str,
        body: impl FnOnce(&mut TrackerCore<H>) -> R,
    ) -> R {
        match self.core.try_borrow_mut() {
            Ok(mut core) => body(&mut *core),
            Err(_) => {
                warn!("{}", TrackerError::Busy { operation });
                R::default()
            }
        }
    }

    // Day boundaries

    pub fn on_day_started(&self) {
        self.with_core("start the day", TrackerCore::day_started)
    }

    pub fn on_day_ending(&self) {
        self.with_core("end the day", TrackerCore::day_ending)
    }

    pub fn on_returned_to_title(&self) {
        self.with_core("return to title", TrackerCore::returned_to_title)
    }

    // Ticks

    pub fn on_update_tick(&self, tick: Tick) {
        self.with_core("drain scheduled updates", |core| core.update_tick(tick))
    }

    /// Only acts while a day is active
    pub fn on_one_second_tick(&self, seconds: u64) {
        self.with_core("check settings", |core| {
            if core.state == TrackerState::DayActive {
                core.one_second_tick(seconds);
            }
        })
    }

    /// Only acts while a day is active
    pub fn on_time_changed(&self, time: u32) {
        self.with_core("handle a time change", |core| {
            if core.state == TrackerState::DayActive {
                core.time_changed(time);
            }
        })
    }

    // World

    pub fn on_entity_added(&self, location: &str, entity: WorldEntity) {
        self.with_core("handle an added entity", |core| {
            if core.state == TrackerState::DayActive {
                core.entity_added(location, entity);
            }
        })
    }

    pub fn on_entity_removed(&self, location: &str, entity: WorldEntity) {
        self.with_core("handle a removed entity", |core| {
            if core.state == TrackerState::DayActive {
                core.entity_removed(location, entity);
            }
        })
    }

    pub fn on_location_added(&self, location: &str) {
        self.with_core("handle an added location", |core| {
            if core.state == TrackerState::DayActive {
                core.remove_location(location);
                core.add_location(location);
            }
        })
    }

    pub fn on_location_removed(&self, location: &str) {
        self.with_core("handle a removed location", |core| {
            core.remove_location(location)
        })
    }

    // Refreshing

    /// Rebuilds every index from a full scan, as at the start of a day
    pub fn refresh_all(&self) {
        self.with_core("refresh everything", TrackerCore::refresh_all)
    }

    /// Recomputes every tracked ready producer without rescanning
    pub fn refresh_ready_producers(&self) {
        self.with_core("refresh ready producers", TrackerCore::refresh_ready_producers)
    }

    // Inspection

    /// Reads from the core, or yields `R::default()` while a host callback
    /// is running inside one of the `on_*` methods
    fn inspect<R: Default>(&self, body: impl FnOnce(&TrackerCore<H>) -> R) -> R {
        match self.core.try_borrow() {
            Ok(core) => body(&core),
            Err(_) => {
                debug!("Tracker is busy; inspection returns a default value");
                R::default()
            }
        }
    }

    pub fn state(&self) -> TrackerState {
        self.inspect(|core| core.state)
    }

    pub fn config(&self) -> TrackerConfig {
        self.inspect(|core| core.config.clone())
    }

    /// Whether a listener entry exists for this key
    pub fn is_tracking(&self, location: &str, id: TrackingId) -> bool {
        self.inspect(|core| core.listeners.contains(location, id))
    }

    pub fn is_source_tracked(&self, location: &str, source: &SourceRef) -> bool {
        self.inspect(|core| core.sources.is_tracked(location, source))
    }

    pub fn tracked_sources(&self, location: &str, kind: SourceKind) -> Vec<SourceRef> {
        self.inspect(|core| core.sources.all_tracked(location, kind))
    }

    pub fn tracked_ready_producers(&self, location: &str) -> usize {
        self.inspect(|core| core.producers.ready_len(location))
    }

    pub fn tracked_ready_later_producers(&self, location: &str) -> usize {
        self.inspect(|core| core.producers.ready_later_len(location))
    }

    pub fn pending_tiles(&self, location: &str) -> HashSet<Tile> {
        self.inspect(|core| core.scheduler.pending_tiles(location))
    }

    pub fn listener_count(&self) -> usize {
        self.inspect(|core| core.listeners.len())
    }
}
