//! Analog front-end smoothing for the pressure sensors.

/// Exponential low-pass filter: `new = (3*old + raw) / 4`, one sample per
/// poll. Removes electrical noise before the step detector compares the
/// reading against its thresholds.
#[derive(Debug, Clone, Copy)]
pub struct PressureFilter {
    filtered: i32,
    primed: bool,
}

impl PressureFilter {
    pub const fn new() -> Self {
        Self { filtered: 0, primed: false }
    }

    /// Feed one raw ADC sample, returning the smoothed value. The first
    /// sample seeds the filter directly so there is no ramp-up from zero.
    pub fn update(&mut self, raw: i32) -> i32 {
        if self.primed {
            self.filtered = (3 * self.filtered + raw) / 4;
        } else {
            self.filtered = raw;
            self.primed = true;
        }
        self.filtered
    }

    pub fn value(&self) -> i32 {
        self.filtered
    }
}

impl Default for PressureFilter {
    fn default() -> Self {
        Self::new()
    }
}
