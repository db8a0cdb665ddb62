//! Weight calibration: derive step detection thresholds from a sampled
//! standing-pressure baseline.
//!
//! The sampling loop itself lives in the sensor node firmware (it needs the
//! ADC and a delay source); the threshold derivation here is pure so it can
//! be tested on the host.

/// Margin applied when the host sends none (or a non-positive one).
pub const DEFAULT_MARGIN: i16 = 150;

/// Floor for the rising threshold, whatever the baseline says.
pub const MIN_THRESHOLD: i32 = 300;

/// Floor for the hysteresis band.
pub const MIN_PRESSURE_BUFFER: i32 = 200;

/// Number of baseline samples taken per sensor.
pub const CAL_SAMPLES: u32 = 200;

/// Delay between baseline samples. The calibration run intentionally
/// stalls the sensor node loop for `CAL_SAMPLES * CAL_SAMPLE_DELAY_MS`.
pub const CAL_SAMPLE_DELAY_MS: u32 = 5;

const DEFAULT_THRESHOLD: i32 = 1500;

/// Step detection thresholds. Written only by the calibration routine,
/// read by the step detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    /// Filtered pressure above this fires a step.
    pub threshold: i32,
    /// Hysteresis band: contact resets only below `threshold - pressure_buffer`.
    pub pressure_buffer: i32,
}

impl Calibration {
    /// Derive thresholds from a sampled baseline (the larger of the two
    /// per-foot averages, assuming the heavier-loaded foot is standing).
    ///
    /// There is no failure path: out-of-range inputs are clamped, so the
    /// resulting threshold is always at least [`MIN_THRESHOLD`].
    pub fn derive(baseline: i32, margin: i16) -> Self {
        let margin = if margin <= 0 { DEFAULT_MARGIN } else { margin } as i32;
        let threshold = (baseline - margin).max(MIN_THRESHOLD);
        Self {
            threshold,
            pressure_buffer: (threshold / 2).max(MIN_PRESSURE_BUFFER),
        }
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            pressure_buffer: (DEFAULT_THRESHOLD / 2).max(MIN_PRESSURE_BUFFER),
        }
    }
}
