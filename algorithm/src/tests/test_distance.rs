use crate::calculate_distance;
use common::position::Position;

#[test]
fn distance_to_itself_is_zero() {
    let pos = Position::new(52.0270889, 11.2803483);
    assert_eq!(calculate_distance(&pos, &pos), 0.0);
}

#[test]
fn distance_along_meridian() {
    let pos1 = Position::new(52.0, 11.0);
    let pos2 = Position::new(52.001, 11.0);
    let distance = calculate_distance(&pos1, &pos2);
    assert!((distance - 111.3).abs() < 0.01, "distance was {distance}");
}
