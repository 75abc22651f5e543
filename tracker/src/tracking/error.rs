use std::error::Error as StdError;

use thiserror::Error;

use crate::{SubscriptionToken, Tile, TrackingId};

/// Errors raised while running a listener's cleanup action
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CleanupError {
    /// The entity owning the signal was dropped before the cleanup ran
    #[error("Signal for subscription {token} no longer exists")]
    SignalDropped { token: SubscriptionToken },

    /// The listener already detached itself
    #[error("Subscription {token} is not subscribed to its signal")]
    NotSubscribed { token: SubscriptionToken },

    /// The signal's listener list was borrowed while trying to unsubscribe
    #[error("Signal for subscription {token} is busy")]
    SignalBusy { token: SubscriptionToken },

    #[error("Cleanup for {id} failed: {reason}")]
    Failed { id: TrackingId, reason: String },
}

/// Error reported by a [`WorldHost`](crate::WorldHost) collaborator
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HostError {
    pub message: String,
    #[source]
    pub source: Option<Box<dyn StdError + 'static>>,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(message: impl Into<String>, source: impl StdError + 'static) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Errors the tracker logs instead of handing back to the host
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Location '{location}' could not be resolved")]
    LocationNotFound { location: String },

    #[error("Nearest source lookup in '{location}' around {tile} failed")]
    NearestSourceQuery {
        location: String,
        tile: Tile,
        #[source]
        source: HostError,
    },

    #[error("Cleanup of listener {id} in '{location}' failed")]
    Cleanup {
        location: String,
        id: TrackingId,
        #[source]
        source: CleanupError,
    },

    /// The tracker was re-entered from one of its own callbacks
    #[error("Tracker is busy and cannot {operation}")]
    Busy { operation: &'static str },
}

/// Renders an error together with every error in its `source()` chain.
pub fn error_chain(error: &dyn StdError) -> String {
    let mut chain = error.to_string();
    let mut current = error.source();
    while let Some(inner) = current {
        chain.push_str("\n  caused by: ");
        chain.push_str(&inner.to_string());
        current = inner.source();
    }
    chain
}
