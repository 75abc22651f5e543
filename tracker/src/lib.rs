//! # Proxima Tracker
//! Keeps the display value of ready producers in sync with the nearest
//! qualifying source in range, reacting to sources being consumed, placed or
//! removed without rescanning the world.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub mod constants;

mod range;
mod tracking;
mod types;
mod world;

pub use range::{EuclideanRange, LatticeRange, RangePolicy, RangeStrategy};
pub use tracking::{
    error::{error_chain, CleanupError, HostError, TrackerError},
    CleanupAction, Clock, DisplayMode, EpochGuard, ListenerRegistry, LogOnce, ProducerCache,
    ScheduledUpdate, SourceRegistry, Tracker, TrackerConfig, TrackerState, TrackingEntry,
    UpdateScheduler,
};
pub use types::{Epoch, LocationName, Tick, Tile, TrackingId};
pub use world::{
    border_tiles, sources, DisplayValue, Ingredient, ListenerAction, LocationInfo, Producer,
    ProducerRef, Signal, Source, SourceKind, SourceQuery, SourceRef, Subscription,
    SubscriptionToken, TrackingTag, ValidityListener, WatchedField, WorldEntity, WorldHost,
};
