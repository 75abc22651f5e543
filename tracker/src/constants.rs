/// Range used when the host has no override installed
pub const DEFAULT_EFFECTIVE_RANGE: u32 = 5;

/// In-game clock time at which every day starts
pub const START_OF_DAY_TIME: u32 = 600;

pub const DEFAULT_DRAIN_INTERVAL_TICKS: u64 = 10;

pub const DEFAULT_SETTINGS_CHECK_INTERVAL_SECS: u64 = 5 * 60;
