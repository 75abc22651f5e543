/// INTEGRATION TEST: host code calling back into the tracker
///
/// Producers are written to while the tracker is mid-update. Reading tracker
/// state from there must not panic; it sees default values instead.
use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use proxima_test::{farm_with_producer, init_logger, TestHost, TestProducer, FARM};
use proxima_tracker::{
    sources::CropDirt, DisplayValue, Ingredient, Producer, ProducerRef, Tile, Tracker,
    TrackerConfig, TrackerState, TrackingTag,
};

/// Reads the tracker every time its display is written
struct CuriousProducer {
    inner: Rc<TestProducer>,
    tracker: RefCell<Weak<Tracker<TestHost>>>,
    seen: RefCell<Vec<(TrackerState, usize, usize)>>,
}

impl Producer for CuriousProducer {
    fn tile(&self) -> Tile {
        self.inner.tile()
    }

    fn is_valid(&self) -> bool {
        self.inner.is_valid()
    }

    fn is_ready(&self) -> bool {
        self.inner.is_ready()
    }

    fn minutes_until_ready(&self) -> u32 {
        self.inner.minutes_until_ready()
    }

    fn tag(&self) -> &TrackingTag {
        self.inner.tag()
    }

    fn set_display(&self, value: DisplayValue) {
        if let Some(tracker) = self.tracker.borrow().upgrade() {
            self.seen.borrow_mut().push((
                tracker.state(),
                tracker.listener_count(),
                tracker.tracked_ready_producers(FARM),
            ));
        }
        self.inner.set_display(value);
    }
}

#[test]
fn reading_the_tracker_during_an_update_sees_defaults() {
    init_logger();
    let (host, plain) = farm_with_producer();
    host.remove_producer(FARM, &plain.producer_ref());
    let curious = Rc::new(CuriousProducer {
        inner: TestProducer::ready(Tile::new(10, 10)),
        tracker: RefCell::new(Weak::new()),
        seen: RefCell::new(Vec::new()),
    });
    let curious_ref: ProducerRef = curious.clone();
    host.add_producer(FARM, curious_ref);
    host.add_source(
        FARM,
        Rc::new(CropDirt::new(
            Tile::new(8, 10),
            Some(Ingredient::new("24", "Parsnip")),
        )),
    );

    let tracker = Rc::new(Tracker::new(host.clone(), TrackerConfig::default()));
    *curious.tracker.borrow_mut() = Rc::downgrade(&tracker);
    host.manual_clock().advance();
    tracker.on_day_started();

    assert_eq!(
        curious.seen.borrow().first(),
        Some(&(TrackerState::Uninitialized, 0, 0))
    );
    assert_eq!(
        curious.inner.display(),
        DisplayValue::Source(Ingredient::new("24", "Parsnip"))
    );
    assert_eq!(tracker.state(), TrackerState::DayActive);
    assert_eq!(tracker.listener_count(), 1);
    assert_eq!(tracker.tracked_ready_producers(FARM), 1);
}
