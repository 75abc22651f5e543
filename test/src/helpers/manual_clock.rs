use std::cell::Cell;

use proxima_tracker::{Clock, Epoch};

/// A day counter advanced by hand
#[derive(Default)]
pub struct ManualClock {
    day: Cell<u64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves to the next day, returning its epoch
    pub fn advance(&self) -> Epoch {
        self.day.set(self.day.get() + 1);
        Epoch(self.day.get())
    }
}

impl Clock for ManualClock {
    fn current_epoch(&self) -> Epoch {
        Epoch(self.day.get())
    }
}
