use crate::error::LocationError;
use crate::options::{AccuracyProfile, LocationOptions};

#[test]
fn profiles_are_ordered_by_precision() {
    assert!(AccuracyProfile::Lowest < AccuracyProfile::Low);
    assert!(AccuracyProfile::Low < AccuracyProfile::Medium);
    assert!(AccuracyProfile::Medium < AccuracyProfile::Best);
    assert!(AccuracyProfile::Best < AccuracyProfile::BestForNavigation);
}

#[test]
fn parse_profile_names() {
    assert_eq!(
        AccuracyProfile::parse("lowest").unwrap(),
        AccuracyProfile::Lowest
    );
    assert_eq!(
        AccuracyProfile::parse("Medium").unwrap(),
        AccuracyProfile::Medium
    );
    assert_eq!(
        AccuracyProfile::parse("bestForNavigation").unwrap(),
        AccuracyProfile::BestForNavigation
    );
    assert_eq!(AccuracyProfile::BestForNavigation.to_string(), "bestForNavigation");
}

#[test]
fn reject_unknown_profile_name() {
    assert_eq!(
        AccuracyProfile::parse("ultra"),
        Err(LocationError::InvalidProfile("ultra".to_string()))
    );
}

#[test]
fn convert_profile_index() {
    assert_eq!(AccuracyProfile::try_from(0).unwrap(), AccuracyProfile::Lowest);
    assert_eq!(
        AccuracyProfile::try_from(4).unwrap(),
        AccuracyProfile::BestForNavigation
    );
    assert!(matches!(
        AccuracyProfile::try_from(5),
        Err(LocationError::InvalidProfile(_))
    ));
    assert_eq!(AccuracyProfile::parse("2").unwrap(), AccuracyProfile::Medium);
    assert!(matches!(
        AccuracyProfile::parse("7"),
        Err(LocationError::InvalidProfile(_))
    ));
}

#[test]
fn default_options_deliver_every_update_with_best_accuracy() {
    let options = LocationOptions::default();
    assert_eq!(options.accuracy, AccuracyProfile::Best);
    assert_eq!(options.time_interval_ms, 0);
    assert_eq!(options.distance_filter_m, 0.0);
    assert!(options.validate().is_ok());
}

#[test]
fn reject_negative_or_nan_distance_filter() {
    let mut options = LocationOptions::new(AccuracyProfile::Low);
    options.distance_filter_m = -1.0;
    assert!(matches!(
        options.validate(),
        Err(LocationError::InvalidProfile(_))
    ));
    options.distance_filter_m = f32::NAN;
    assert!(matches!(
        options.validate(),
        Err(LocationError::InvalidProfile(_))
    ));
}
