//! Tests for weight-calibration threshold derivation.

use cadence_core::calibration::{
    Calibration, DEFAULT_MARGIN, MIN_PRESSURE_BUFFER, MIN_THRESHOLD,
};

#[test]
fn test_typical_standing_baseline() {
    let cal = Calibration::derive(1800, 150);
    assert_eq!(cal.threshold, 1650);
    assert_eq!(cal.pressure_buffer, 825);
}

#[test]
fn test_threshold_floor_applies() {
    // Baseline barely above noise; the floor keeps the detector sane
    let cal = Calibration::derive(100, 150);
    assert_eq!(cal.threshold, MIN_THRESHOLD);
    assert_eq!(cal.pressure_buffer, MIN_PRESSURE_BUFFER);
}

#[test]
fn test_buffer_floor_applies() {
    // threshold / 2 would be 175, below the buffer floor
    let cal = Calibration::derive(500, 150);
    assert_eq!(cal.threshold, 350);
    assert_eq!(cal.pressure_buffer, MIN_PRESSURE_BUFFER);
}

#[test]
fn test_non_positive_margin_uses_default() {
    let with_default = Calibration::derive(2000, DEFAULT_MARGIN);
    assert_eq!(Calibration::derive(2000, 0), with_default);
    assert_eq!(Calibration::derive(2000, -40), with_default);
}

#[test]
fn test_large_margin_still_floors() {
    let cal = Calibration::derive(1000, 5000);
    assert_eq!(cal.threshold, MIN_THRESHOLD);
}

#[test]
fn test_default_until_first_calibration() {
    let cal = Calibration::default();
    assert_eq!(cal.threshold, 1500);
    assert_eq!(cal.pressure_buffer, 750);
}
