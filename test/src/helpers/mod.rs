pub mod assertions;
pub mod manual_clock;
pub mod test_host;

use std::rc::Rc;

use proxima_tracker::{Tile, Tracker, TrackerConfig};

pub use manual_clock::ManualClock;
pub use test_host::TestHost;
pub use test_producer::TestProducer;

/// Routes tracker logging to the test output; safe to call from every test
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub const FARM: &str = "Farm";

/// An outdoor "Farm" with one ready producer at (10, 10)
pub fn farm_with_producer() -> (TestHost, Rc<TestProducer>) {
    let host = TestHost::new();
    host.add_location(FARM, true);
    let producer = TestProducer::ready(Tile::new(10, 10));
    host.add_producer(FARM, producer.producer_ref());
    (host, producer)
}

/// Starts the first day on a tracker over `host`
pub fn start_tracker(host: &TestHost, config: TrackerConfig) -> Tracker<TestHost> {
    init_logger();
    let tracker = Tracker::new(host.clone(), config);
    host.manual_clock().advance();
    tracker.on_day_started();
    tracker
}
