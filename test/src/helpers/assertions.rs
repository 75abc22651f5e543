/// Assert that a test producer shows the named ingredient
#[macro_export]
macro_rules! assert_shows {
    ($producer:expr, $name:expr) => {
        assert_eq!(
            $producer.shown_ingredient().map(|ingredient| ingredient.name),
            Some($name.to_string()),
            "Producer @ {} should show '{}'",
            proxima_tracker::Producer::tile(&*$producer),
            $name
        );
    };
}

/// Assert that a test producer fell back to the default display value
#[macro_export]
macro_rules! assert_shows_default {
    ($producer:expr) => {
        assert_eq!(
            $producer.display(),
            proxima_tracker::DisplayValue::Default,
            "Producer @ {} should show the default value",
            proxima_tracker::Producer::tile(&*$producer)
        );
    };
}
