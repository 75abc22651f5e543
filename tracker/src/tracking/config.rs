use std::{fmt, str::FromStr};

use crate::{
    constants::{DEFAULT_DRAIN_INTERVAL_TICKS, DEFAULT_SETTINGS_CHECK_INTERVAL_SECS},
    DisplayValue, Ingredient, RangePolicy, Tick,
};

/// How a producer presents the source found near it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// Show the source's ingredient
    #[default]
    Source,
    /// Show the flavored product the ingredient will make
    Flavored,
}

impl DisplayMode {
    pub fn display_for(&self, ingredient: Option<Ingredient>) -> DisplayValue {
        match (self, ingredient) {
            (_, None) => DisplayValue::Default,
            (DisplayMode::Source, Some(ingredient)) => DisplayValue::Source(ingredient),
            (DisplayMode::Flavored, Some(ingredient)) => DisplayValue::Flavored(ingredient),
        }
    }

    /// Case-insensitive parse that falls back to the default for unknown input
    pub fn parse_or_default(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "source" => Ok(DisplayMode::Source),
            "flavored" => Ok(DisplayMode::Flavored),
            other => Err(format!("unknown display mode '{}'", other)),
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayMode::Source => f.write_str("Source"),
            DisplayMode::Flavored => f.write_str("Flavored"),
        }
    }
}

/// Contains Config properties which will be used by the Tracker
#[derive(Clone, Debug)]
pub struct TrackerConfig {
    /// Shape of the area around a producer in which sources count
    pub range_policy: RangePolicy,
    /// Scheduled tile updates are drained on ticks that are a multiple of this
    pub drain_interval_ticks: Tick,
    /// How often, in seconds, to ask the host whether range settings changed
    pub settings_check_interval_secs: u64,
    pub display_mode: DisplayMode,
    /// When false only crops in tilled dirt are tracked
    pub track_non_dirt_sources: bool,
    /// Also scan locations that are not outdoors
    pub include_indoor_locations: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            range_policy: RangePolicy::default(),
            drain_interval_ticks: DEFAULT_DRAIN_INTERVAL_TICKS,
            settings_check_interval_secs: DEFAULT_SETTINGS_CHECK_INTERVAL_SECS,
            display_mode: DisplayMode::default(),
            track_non_dirt_sources: true,
            include_indoor_locations: false,
        }
    }
}
