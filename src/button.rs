//! Tempo adjustment buttons: debounced edges plus accelerating auto-repeat
//! while held.

/// Raw level must hold this long before a debounced edge is accepted.
pub const DEBOUNCE_MS: u64 = 25;

/// Hold time before auto-repeat kicks in.
pub const FIRST_REPEAT_DELAY_MS: u64 = 200;

/// Spacing of repeat ticks once repeating.
pub const REPEAT_RATE_MS: u64 = 60;

/// Delta magnitude by hold duration: longer holds nudge the tempo faster.
fn repeat_magnitude(held_ms: u64) -> i8 {
    if held_ms < 1000 {
        1
    } else if held_ms < 2500 {
        2
    } else {
        5
    }
}

/// One physical button, polled every loop cycle with its raw level.
///
/// Invariant: `press_start_ms` is `Some` iff the debounced state is
/// pressed.
#[derive(Debug)]
pub struct TempoButton {
    direction: i8,
    last_raw: bool,
    last_raw_change_ms: u64,
    debounced: bool,
    press_start_ms: Option<u64>,
    last_repeat_ms: u64,
}

impl TempoButton {
    /// `direction` is +1 or -1 depending on which button this is.
    pub const fn new(direction: i8) -> Self {
        Self {
            direction,
            last_raw: false,
            last_raw_change_ms: 0,
            debounced: false,
            press_start_ms: None,
            last_repeat_ms: 0,
        }
    }

    /// Feed one raw sample. Returns a signed tempo delta when the press
    /// edge or a repeat tick fires this poll.
    pub fn poll(&mut self, raw_pressed: bool, now_ms: u64) -> Option<i8> {
        if raw_pressed != self.last_raw {
            self.last_raw = raw_pressed;
            self.last_raw_change_ms = now_ms;
        }

        // Accept a debounced edge only after the raw level held steady.
        if self.last_raw != self.debounced
            && now_ms.saturating_sub(self.last_raw_change_ms) >= DEBOUNCE_MS
        {
            self.debounced = self.last_raw;
            if self.debounced {
                self.press_start_ms = Some(now_ms);
                self.last_repeat_ms = now_ms;
                return Some(self.direction);
            }
            self.press_start_ms = None;
            return None;
        }

        // Auto-repeat while held.
        if let Some(start) = self.press_start_ms {
            let held = now_ms.saturating_sub(start);
            if held >= FIRST_REPEAT_DELAY_MS
                && now_ms.saturating_sub(self.last_repeat_ms) >= REPEAT_RATE_MS
            {
                self.last_repeat_ms = now_ms;
                return Some(self.direction * repeat_magnitude(held));
            }
        }
        None
    }
}

/// The up/down pair. If both buttons read pressed in the same poll the
/// whole pair is skipped for that cycle - that pattern is a wiring fault
/// or an accidental double-press, not an intent.
#[derive(Debug)]
pub struct ButtonPair {
    up: TempoButton,
    down: TempoButton,
}

impl ButtonPair {
    pub const fn new() -> Self {
        Self {
            up: TempoButton::new(1),
            down: TempoButton::new(-1),
        }
    }

    /// Poll both buttons; at most one delta per button per cycle.
    pub fn poll(&mut self, up_raw: bool, down_raw: bool, now_ms: u64) -> [Option<i8>; 2] {
        if up_raw && down_raw {
            return [None, None];
        }
        [self.up.poll(up_raw, now_ms), self.down.poll(down_raw, now_ms)]
    }
}

impl Default for ButtonPair {
    fn default() -> Self {
        Self::new()
    }
}
