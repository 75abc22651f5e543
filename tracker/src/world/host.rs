use std::rc::Rc;

use crate::{
    constants::DEFAULT_EFFECTIVE_RANGE, tracking::error::HostError, Clock, LocationName,
    ProducerRef, RangePolicy, SourceRef, Tile,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocationInfo {
    pub name: LocationName,
    pub is_outdoors: bool,
}

/// Parameters for the host's nearest-source search
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceQuery {
    pub tile: Tile,
    pub radius: u32,
    pub range_policy: RangePolicy,
    /// When false only crops in tilled dirt qualify
    pub include_non_dirt: bool,
}

/// Everything the tracker needs from the world it runs in.
pub trait WorldHost {
    fn location_names(&self) -> Vec<LocationName>;

    /// `None` once the location no longer exists
    fn resolve_location(&self, location: &str) -> Option<LocationInfo>;

    /// Every producer of the tracked kind currently placed in the location
    fn producers(&self, location: &str) -> Vec<ProducerRef>;

    fn nearest_source(
        &self,
        location: &str,
        query: &SourceQuery,
    ) -> Result<Option<SourceRef>, HostError>;

    /// Read on every range check, since other installed content may change it
    fn effective_range(&self) -> u32 {
        DEFAULT_EFFECTIVE_RANGE
    }

    fn clock(&self) -> Rc<dyn Clock>;

    fn minutes_until_end_of_day(&self) -> u32;

    /// Whether producers only ever become ready overnight
    fn producers_refresh_daily(&self) -> bool {
        true
    }

    /// Whether settings affecting range or eligibility changed since last asked
    fn settings_changed(&self) -> bool {
        false
    }
}
