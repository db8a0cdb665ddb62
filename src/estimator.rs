//! Windowed cadence estimation on the gateway.
//!
//! Window size (how many steps are averaged) and update stride (how often a
//! fresh estimate is computed) are independent, so the host can trade
//! responsiveness against smoothness separately.

use crate::history::{StepHistory, MAX_WINDOW};

/// Defaults match what the host assumes when it skips the SET commands.
pub const DEFAULT_WINDOW: usize = 3;
pub const DEFAULT_STRIDE: usize = 2;

pub struct CadenceEstimator {
    history: StepHistory,
    window: usize,
    stride: usize,
    accepted_steps: u32,
    last_bpm: f32,
}

impl CadenceEstimator {
    pub const fn new() -> Self {
        Self {
            history: StepHistory::new(),
            window: DEFAULT_WINDOW,
            stride: DEFAULT_STRIDE,
            accepted_steps: 0,
            last_bpm: 0.0,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Most recently computed (or cached) BPM.
    pub fn current_bpm(&self) -> f32 {
        self.last_bpm
    }

    /// Set the averaging window. Rejects values outside `1..=MAX_WINDOW`.
    /// Clamps the stride down if it now exceeds the window and shrinks the
    /// live history if it holds more entries than the new window.
    pub fn set_window(&mut self, n: usize) -> bool {
        if n == 0 || n > MAX_WINDOW {
            return false;
        }
        self.window = n;
        if self.stride > n {
            self.stride = n;
        }
        self.history.truncate_to(n);
        true
    }

    /// Set the update stride. Rejects values outside `1..=window`.
    pub fn set_stride(&mut self, n: usize) -> bool {
        if n == 0 || n > self.window {
            return false;
        }
        self.stride = n;
        true
    }

    /// Drop all history and cached state (session START).
    pub fn reset(&mut self) {
        self.history.clear();
        self.accepted_steps = 0;
        self.last_bpm = 0.0;
    }

    /// Accept one step. The estimate is recomputed only on every
    /// `stride`-th step; in between, the cached BPM is reported unchanged.
    pub fn on_step(&mut self, interval_ms: u32) -> f32 {
        self.history.push(interval_ms);
        self.accepted_steps += 1;
        if self.accepted_steps % self.stride as u32 == 0 {
            self.last_bpm = self.average_bpm(self.window);
        }
        self.last_bpm
    }

    /// Average BPM over the `min(n, count)` most recent steps:
    /// `60000 / mean(interval)`. Returns 0 with no history, and the cached
    /// value when the summed intervals are 0 (never a divide-by-zero, never
    /// an "infinite" cadence).
    pub fn average_bpm(&self, n: usize) -> f32 {
        let (sum, m) = self.history.recent_sum(n);
        if m < 1 {
            return 0.0;
        }
        if sum == 0 {
            return self.last_bpm;
        }
        60_000.0 * m as f32 / sum as f32
    }
}

impl Default for CadenceEstimator {
    fn default() -> Self {
        Self::new()
    }
}
