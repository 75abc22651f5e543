mod entity;
mod host;
mod signal;

pub mod sources;

pub use entity::{
    border_tiles, DisplayValue, Ingredient, Producer, ProducerRef, Source, SourceKind, SourceRef,
    TrackingTag, ValidityListener, WorldEntity,
};
pub use host::{LocationInfo, SourceQuery, WorldHost};
pub use signal::{ListenerAction, Signal, Subscription, SubscriptionToken, WatchedField};
