use std::rc::Rc;

use crate::Epoch;

/// The host's notion of which day it is
pub trait Clock {
    fn current_epoch(&self) -> Epoch;
}

/// Lets a listener find out that it has outlived the day it was registered in.
#[derive(Clone)]
pub struct EpochGuard {
    clock: Rc<dyn Clock>,
}

impl EpochGuard {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn current(&self) -> Epoch {
        self.clock.current_epoch()
    }

    pub fn is_stale(&self, registered: Epoch) -> bool {
        registered != self.current()
    }
}
