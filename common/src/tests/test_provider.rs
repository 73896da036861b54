use crate::provider::{
    AccuracyClass, Criteria, HorizontalAccuracy, PowerClass, ProviderDescriptor, ProviderId,
};
use crate::test_helper::samples::{gps_descriptor, network_descriptor};

fn fine_high_power() -> Criteria {
    Criteria {
        accuracy: Some(AccuracyClass::Fine),
        horizontal_accuracy: Some(HorizontalAccuracy::High),
        power: Some(PowerClass::High),
    }
}

#[test]
fn no_requirement_is_satisfied_by_every_provider() {
    let criteria = Criteria::default();
    assert!(gps_descriptor().satisfies(&criteria));
    assert!(network_descriptor().satisfies(&criteria));
}

#[test]
fn fine_accuracy_requires_a_fine_provider() {
    assert!(gps_descriptor().satisfies(&fine_high_power()));
    assert!(!network_descriptor().satisfies_accuracy(&fine_high_power()));
}

#[test]
fn fine_provider_satisfies_coarse_request() {
    let criteria = Criteria {
        accuracy: Some(AccuracyClass::Coarse),
        ..Default::default()
    };
    assert!(gps_descriptor().satisfies(&criteria));
}

#[test]
fn power_requirement_is_an_upper_bound() {
    let criteria = Criteria {
        power: Some(PowerClass::Medium),
        ..Default::default()
    };
    assert!(network_descriptor().satisfies_power(&criteria));
    assert!(!gps_descriptor().satisfies_power(&criteria));

    let medium = ProviderDescriptor::new(
        ProviderId::new("fused"),
        AccuracyClass::Fine,
        PowerClass::Medium,
    );
    assert!(medium.satisfies_power(&criteria));
}

#[test]
fn provider_id_compares_with_str() {
    assert_eq!(ProviderId::gps(), "gps");
    assert_eq!(ProviderId::network().as_str(), ProviderId::NETWORK);
    assert_eq!(ProviderId::from("passive"), ProviderId::passive());
    assert_eq!(ProviderId::gps().to_string(), "gps");
}
