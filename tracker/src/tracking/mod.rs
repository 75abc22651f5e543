pub mod error;

mod config;
mod epoch_guard;
mod listener_registry;
mod log_once;
mod producer_cache;
mod source_registry;
pub(crate) mod tracker;
mod update_scheduler;

pub use config::{DisplayMode, TrackerConfig};
pub use epoch_guard::{Clock, EpochGuard};
pub use listener_registry::{CleanupAction, ListenerRegistry, TrackingEntry};
pub use log_once::LogOnce;
pub use producer_cache::ProducerCache;
pub use source_registry::SourceRegistry;
pub use tracker::{Tracker, TrackerState};
pub use update_scheduler::{ScheduledUpdate, UpdateScheduler};
