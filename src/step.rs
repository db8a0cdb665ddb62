//! Step detection: per-foot hysteresis over filtered pressure, plus a
//! shared refractory gate that suppresses double-triggers and measures the
//! inter-step interval.

use crate::calibration::Calibration;
use crate::filter::PressureFilter;
use crate::packet::{Foot, StepEvent};

/// Minimum spacing between *sent* steps, either foot. Crossings inside
/// this window are transient noise and are not forwarded off-node.
pub const REFRACTORY_MS: u64 = 120;

/// Hysteresis state machine for one foot.
///
/// A step fires when the foot is not in contact and the filtered pressure
/// rises above `threshold`; contact resets only once the reading falls to
/// `threshold - pressure_buffer` or below, so chatter at the boundary
/// cannot re-trigger.
#[derive(Debug)]
pub struct StepDetector {
    foot: Foot,
    filter: PressureFilter,
    in_contact: bool,
}

impl StepDetector {
    pub const fn new(foot: Foot) -> Self {
        Self {
            foot,
            filter: PressureFilter::new(),
            in_contact: false,
        }
    }

    pub fn foot(&self) -> Foot {
        self.foot
    }

    /// Feed one raw pressure sample. Returns true when a step fires this
    /// poll (before the refractory gate is applied).
    pub fn sample(&mut self, raw: i32, cal: &Calibration) -> bool {
        let filtered = self.filter.update(raw);
        if !self.in_contact && filtered > cal.threshold {
            self.in_contact = true;
            return true;
        }
        if self.in_contact && filtered <= cal.threshold - cal.pressure_buffer {
            self.in_contact = false;
        }
        false
    }
}

/// Refractory gate shared by both feet. Admits a fired step only if enough
/// time passed since the last sent step, and measures the interval from
/// that last sent step regardless of which foot it was.
#[derive(Debug, Default)]
pub struct StepGate {
    last_sent_ms: Option<u64>,
}

impl StepGate {
    pub const fn new() -> Self {
        Self { last_sent_ms: None }
    }

    /// Try to admit a fired step at `now_ms`. On success returns the event
    /// to transmit; the very first admitted step carries interval 0.
    pub fn admit(&mut self, foot: Foot, now_ms: u64) -> Option<StepEvent> {
        let interval_ms = match self.last_sent_ms {
            Some(last) => {
                let elapsed = now_ms.saturating_sub(last);
                if elapsed < REFRACTORY_MS {
                    return None;
                }
                elapsed as u32
            }
            None => 0,
        };
        self.last_sent_ms = Some(now_ms);
        Some(StepEvent { interval_ms, foot })
    }
}
