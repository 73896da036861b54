use crate::profile::{UNSPECIFIED_DESIRED_ACCURACY, criteria_for, desired_accuracy};
use common::options::AccuracyProfile;
use common::provider::{AccuracyClass, Criteria, HorizontalAccuracy, PowerClass};
use strum::IntoEnumIterator;

#[test]
fn desired_accuracy_per_profile() {
    assert_eq!(desired_accuracy(Some(AccuracyProfile::Lowest)), 1000.0);
    assert_eq!(desired_accuracy(Some(AccuracyProfile::Low)), 500.0);
    assert_eq!(desired_accuracy(Some(AccuracyProfile::Medium)), 250.0);
    assert_eq!(desired_accuracy(Some(AccuracyProfile::Best)), 50.0);
    assert_eq!(desired_accuracy(Some(AccuracyProfile::BestForNavigation)), 50.0);
    assert_eq!(desired_accuracy(None), UNSPECIFIED_DESIRED_ACCURACY);
    assert_eq!(desired_accuracy(None), 100.0);
}

#[test]
fn desired_accuracy_gets_stricter_with_precision() {
    let thresholds: Vec<f32> = AccuracyProfile::iter()
        .map(|profile| desired_accuracy(Some(profile)))
        .collect();
    assert!(thresholds.windows(2).all(|pair| pair[0] >= pair[1]));
}

#[test]
fn lowest_has_no_requirements() {
    assert_eq!(criteria_for(AccuracyProfile::Lowest), Criteria::default());
}

#[test]
fn low_is_coarse_with_low_power() {
    let criteria = criteria_for(AccuracyProfile::Low);
    assert_eq!(criteria.accuracy, Some(AccuracyClass::Coarse));
    assert_eq!(criteria.horizontal_accuracy, Some(HorizontalAccuracy::Low));
    assert_eq!(criteria.power, Some(PowerClass::Low));
}

#[test]
fn medium_is_coarse_with_medium_power() {
    let criteria = criteria_for(AccuracyProfile::Medium);
    assert_eq!(criteria.accuracy, Some(AccuracyClass::Coarse));
    assert_eq!(criteria.horizontal_accuracy, Some(HorizontalAccuracy::Medium));
    assert_eq!(criteria.power, Some(PowerClass::Medium));
}

#[test]
fn best_profiles_are_fine_with_high_power() {
    for profile in [AccuracyProfile::Best, AccuracyProfile::BestForNavigation] {
        let criteria = criteria_for(profile);
        assert_eq!(criteria.accuracy, Some(AccuracyClass::Fine));
        assert_eq!(criteria.horizontal_accuracy, Some(HorizontalAccuracy::High));
        assert_eq!(criteria.power, Some(PowerClass::High));
    }
}
