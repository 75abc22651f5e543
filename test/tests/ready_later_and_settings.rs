/// INTEGRATION TEST: producers that become ready during the day, and the
/// periodic full refresh when range settings change.
use std::rc::Rc;

use proxima_test::{
    assert_shows, assert_shows_default, farm_with_producer, start_tracker, TestHost, TestProducer,
    FARM,
};
use proxima_tracker::{
    constants::START_OF_DAY_TIME, sources::CropDirt, Ingredient, Tile, TrackerConfig,
    TrackerState, WorldEntity,
};

fn farm_with_waiting_producer(minutes_until_ready: u32) -> (TestHost, Rc<TestProducer>) {
    let host = TestHost::new();
    host.add_location(FARM, true);
    host.set_producers_refresh_daily(false);
    host.set_minutes_until_end_of_day(600);
    let producer = TestProducer::waiting(Tile::new(10, 10), minutes_until_ready);
    host.add_producer(FARM, producer.producer_ref());
    host.add_source(
        FARM,
        Rc::new(CropDirt::new(
            Tile::new(8, 10),
            Some(Ingredient::new("24", "Parsnip")),
        )),
    );
    (host, producer)
}

#[test]
fn waiting_producer_is_computed_once_ready() {
    let (host, producer) = farm_with_waiting_producer(60);
    let tracker = start_tracker(&host, TrackerConfig::default());
    assert_eq!(tracker.tracked_ready_producers(FARM), 0);
    assert_eq!(tracker.tracked_ready_later_producers(FARM), 1);
    assert_shows_default!(producer);

    tracker.on_time_changed(650);
    assert_shows_default!(producer);

    producer.set_ready(true);
    tracker.on_time_changed(700);

    assert_shows!(producer, "Parsnip");
    assert_eq!(tracker.tracked_ready_producers(FARM), 1);
    assert_eq!(tracker.tracked_ready_later_producers(FARM), 0);
    assert_eq!(tracker.listener_count(), 1);
}

#[test]
fn start_of_day_time_change_is_ignored() {
    let (host, producer) = farm_with_waiting_producer(60);
    let tracker = start_tracker(&host, TrackerConfig::default());

    producer.set_ready(true);
    tracker.on_time_changed(START_OF_DAY_TIME);

    assert_shows_default!(producer);
    assert_eq!(tracker.tracked_ready_later_producers(FARM), 1);
}

#[test]
fn producer_ready_after_the_day_ends_is_not_indexed() {
    let (host, _producer) = farm_with_waiting_producer(900);
    let tracker = start_tracker(&host, TrackerConfig::default());

    assert_eq!(tracker.tracked_ready_later_producers(FARM), 0);
}

#[test]
fn daily_producers_skip_the_waiting_index() {
    let (host, producer) = farm_with_waiting_producer(60);
    host.set_producers_refresh_daily(true);
    let tracker = start_tracker(&host, TrackerConfig::default());
    assert_eq!(tracker.tracked_ready_later_producers(FARM), 0);

    producer.set_ready(true);
    tracker.on_time_changed(700);

    assert_shows_default!(producer);
}

#[test]
fn placed_waiting_producer_is_indexed() {
    let (host, _producer) = farm_with_waiting_producer(900);
    let tracker = start_tracker(&host, TrackerConfig::default());
    let placed = TestProducer::waiting(Tile::new(9, 11), 30);
    host.add_producer(FARM, placed.producer_ref());

    tracker.on_entity_added(FARM, WorldEntity::Producer(placed.producer_ref()));
    placed.set_ready(true);
    tracker.on_time_changed(610);

    assert_shows!(placed, "Parsnip");
}

#[test]
fn changed_settings_trigger_a_full_refresh() {
    let (host, producer) = farm_with_producer();
    host.add_source(
        FARM,
        Rc::new(CropDirt::new(
            Tile::new(7, 10),
            Some(Ingredient::new("24", "Parsnip")),
        )),
    );
    let tracker = start_tracker(&host, TrackerConfig::default());
    assert_shows!(producer, "Parsnip");

    host.set_effective_range(2);
    host.change_settings();
    tracker.on_one_second_tick(299);
    assert_shows!(producer, "Parsnip");

    tracker.on_one_second_tick(300);

    assert_shows_default!(producer);
    assert_eq!(tracker.listener_count(), 0);
}

#[test]
fn unchanged_settings_do_nothing() {
    let (host, producer) = farm_with_producer();
    let tracker = start_tracker(&host, TrackerConfig::default());
    let writes = producer.display_writes();

    tracker.on_one_second_tick(600);

    assert_eq!(producer.display_writes(), writes);
}

#[test]
fn settings_refresh_waits_for_an_active_day() {
    let (host, _producer) = farm_with_producer();
    let crop = Rc::new(CropDirt::new(
        Tile::new(8, 10),
        Some(Ingredient::new("24", "Parsnip")),
    ));
    host.add_source(FARM, crop.clone());
    let tracker = start_tracker(&host, TrackerConfig::default());

    tracker.on_day_ending();
    host.change_settings();
    tracker.on_one_second_tick(300);

    assert_eq!(tracker.state(), TrackerState::DayEnding);
    assert_eq!(tracker.listener_count(), 0);
    assert_eq!(crop.crop.signal().listener_count(), 0);

    tracker.on_returned_to_title();
    host.change_settings();
    tracker.on_one_second_tick(600);

    assert_eq!(tracker.state(), TrackerState::Shutdown);
    assert_eq!(tracker.listener_count(), 0);
    assert_eq!(tracker.tracked_ready_producers(FARM), 0);
}

#[test]
fn time_change_after_day_end_promotes_nothing() {
    let (host, producer) = farm_with_waiting_producer(60);
    let tracker = start_tracker(&host, TrackerConfig::default());

    tracker.on_day_ending();
    producer.set_ready(true);
    tracker.on_time_changed(700);

    assert_shows_default!(producer);
    assert_eq!(tracker.tracked_ready_producers(FARM), 0);
    assert_eq!(tracker.listener_count(), 0);
}
