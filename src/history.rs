//! Circular buffer of recent inter-step intervals.

/// Hard cap on the averaging window the host may configure.
pub const MAX_WINDOW: usize = 20;

/// Fixed-capacity ring of the most recent step intervals. Overwrites the
/// oldest entry on overflow; `count <= capacity` always holds.
#[derive(Debug)]
pub struct StepHistory {
    intervals: [u32; MAX_WINDOW],
    head: usize, // next write position
    count: usize,
}

impl StepHistory {
    pub const fn new() -> Self {
        Self {
            intervals: [0; MAX_WINDOW],
            head: 0,
            count: 0,
        }
    }

    pub fn push(&mut self, interval_ms: u32) {
        self.intervals[self.head] = interval_ms;
        self.head = (self.head + 1) % MAX_WINDOW;
        if self.count < MAX_WINDOW {
            self.count += 1;
        }
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.count = 0;
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Forget everything but the `n` most recent entries. Used when the
    /// host shrinks the averaging window below the current fill level.
    pub fn truncate_to(&mut self, n: usize) {
        if self.count > n {
            self.count = n;
        }
    }

    /// Sum of the `min(n, count)` most recent intervals, walking backward
    /// from the newest. Returns `(sum, entries_summed)`.
    pub fn recent_sum(&self, n: usize) -> (u64, usize) {
        let m = n.min(self.count);
        let mut sum = 0u64;
        let mut idx = self.head;
        for _ in 0..m {
            idx = (idx + MAX_WINDOW - 1) % MAX_WINDOW;
            sum += self.intervals[idx] as u64;
        }
        (sum, m)
    }
}

impl Default for StepHistory {
    fn default() -> Self {
        Self::new()
    }
}
