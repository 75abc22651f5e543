use std::collections::HashSet;

use log::{log, Level};

/// Remembers which messages have been written so each is logged only once.
#[derive(Default)]
pub struct LogOnce {
    seen: HashSet<String>,
}

impl LogOnce {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the message was written
    pub fn log(&mut self, level: Level, message: String) -> bool {
        if self.seen.contains(&message) {
            return false;
        }
        log!(level, "{}", message);
        self.seen.insert(message);
        true
    }
}
