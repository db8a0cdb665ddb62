//! Gateway session and command controller.
//!
//! Interprets line-delimited text commands from the host, drives the
//! cadence estimator from incoming step events, and formats every line
//! sent back up the host link.
//!
//! Host -> gateway: `RESET`, `START`, `SET_WINDOW,<n>`, `SET_STRIDE,<n>`,
//! `CAL_WEIGHT[,<margin>]`. Gateway -> host: one
//! `<now_ms>,<foot>,<instant_bpm>,<avg_bpm>` line per accepted step,
//! `BTN,<delta>` per tempo tick, and `ACK,...`/`ERR,...` replies.
//!
//! Commands that fail validation are ignored with no reply at all, so a
//! noisy or confused host cannot disturb a running session.

use core::fmt::Write;

use crate::calibration::DEFAULT_MARGIN;
use crate::estimator::CadenceEstimator;
use crate::packet::{Packet, StepEvent, CMD_CALIBRATE_WEIGHT};

/// Upper bound on any single line sent to the host.
pub const MAX_LINE: usize = 64;

/// One `\n`-terminated-by-the-caller line of host output.
pub type HostLine = heapless::String<MAX_LINE>;

/// A host command that survived parsing. Range validation happens against
/// live session state in [`Session::handle_line`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    Reset,
    Start,
    SetWindow(usize),
    SetStride(usize),
    Calibrate(i16),
}

/// What a command produced: at most one reply line and at most one packet
/// to forward to the sensor node.
#[derive(Debug, Default)]
pub struct CommandOutcome {
    pub reply: Option<HostLine>,
    pub dispatch: Option<Packet>,
}

/// Parse one stripped command line. Unknown verbs, missing or extra
/// fields, and unparseable numbers all yield `None`.
pub fn parse_command(line: &str) -> Option<HostCommand> {
    let line = line.trim();
    let mut fields = line.split(',');
    let verb = fields.next()?.trim();
    let arg = fields.next().map(str::trim);
    if fields.next().is_some() {
        return None;
    }

    match (verb, arg) {
        ("RESET", None) => Some(HostCommand::Reset),
        ("START", None) => Some(HostCommand::Start),
        ("SET_WINDOW", Some(n)) => n.parse().ok().map(HostCommand::SetWindow),
        ("SET_STRIDE", Some(n)) => n.parse().ok().map(HostCommand::SetStride),
        // Margin is optional; the sensor node substitutes its default for
        // anything non-positive, so both spellings dispatch as-is.
        ("CAL_WEIGHT", None) => Some(HostCommand::Calibrate(DEFAULT_MARGIN)),
        ("CAL_WEIGHT", Some(m)) => m.parse().ok().map(HostCommand::Calibrate),
        _ => None,
    }
}

/// Session lifecycle plus the estimator it owns.
///
/// `RESET` arms the session (`starting`); `START` is honored only while
/// armed and clears all history; the first step after `START` is consumed
/// to seed timing and is not fed to the estimator.
pub struct Session {
    estimator: CadenceEstimator,
    starting: bool,
    started: bool,
}

impl Session {
    pub const fn new() -> Self {
        Self {
            estimator: CadenceEstimator::new(),
            starting: false,
            started: false,
        }
    }

    pub fn estimator(&self) -> &CadenceEstimator {
        &self.estimator
    }

    /// Handle one line from the host.
    pub fn handle_line(&mut self, line: &str) -> CommandOutcome {
        let mut outcome = CommandOutcome::default();
        let Some(cmd) = parse_command(line) else {
            log::debug!("session: unparseable command, ignored");
            return outcome;
        };

        match cmd {
            HostCommand::Reset => {
                self.starting = true;
                outcome.reply = Some(reply_line(format_args!("ACK,RESET")));
            }
            HostCommand::Start => {
                // Only honored after RESET armed the session.
                if self.starting {
                    self.estimator.reset();
                    self.starting = false;
                    self.started = true;
                    outcome.reply = Some(reply_line(format_args!("ACK,START")));
                }
            }
            HostCommand::SetWindow(n) => {
                if self.estimator.set_window(n) {
                    outcome.reply = Some(reply_line(format_args!("ACK,WINDOW,{}", n)));
                }
            }
            HostCommand::SetStride(n) => {
                if self.estimator.set_stride(n) {
                    outcome.reply = Some(reply_line(format_args!("ACK,STRIDE,{}", n)));
                }
            }
            HostCommand::Calibrate(margin) => {
                outcome.dispatch = Some(Packet::Control {
                    cmd: CMD_CALIBRATE_WEIGHT,
                    arg: margin,
                });
                outcome.reply = Some(reply_line(format_args!("ACK,CAL_WEIGHT,DISPATCHED")));
            }
        }
        outcome
    }

    /// Handle one step event from the sensor node, producing the line to
    /// report it to the host.
    ///
    /// The first step after `START` only seeds timing: it reports an
    /// instant BPM of 0 and does not perturb the running average.
    pub fn on_step(&mut self, now_ms: u64, ev: StepEvent) -> HostLine {
        let (instant, avg) = if self.started {
            self.started = false;
            (0.0, self.estimator.current_bpm())
        } else {
            let instant = if ev.interval_ms > 0 {
                60_000.0 / ev.interval_ms as f32
            } else {
                0.0
            };
            (instant, self.estimator.on_step(ev.interval_ms))
        };
        reply_line(format_args!(
            "{},{},{:.2},{:.2}",
            now_ms, ev.foot as u8, instant, avg
        ))
    }

    /// Tempo nudge from the sensor node's buttons.
    pub fn on_tempo_delta(&self, delta: i8) -> HostLine {
        reply_line(format_args!("BTN,{}", delta))
    }

    /// Control packet echoed back from the sensor node. A non-negative arg
    /// is the freshly calibrated threshold; anything else - including a
    /// command we never defined - surfaces as an error line so the host can
    /// tell "rejected" from "ignored".
    pub fn on_control_reply(&self, cmd: u8, arg: i16) -> HostLine {
        if cmd == CMD_CALIBRATE_WEIGHT && arg >= 0 {
            reply_line(format_args!("ACK,CAL_WEIGHT,{}", arg))
        } else {
            reply_line(format_args!("ERR,CAL_WEIGHT"))
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

fn reply_line(args: core::fmt::Arguments<'_>) -> HostLine {
    let mut line = HostLine::new();
    // MAX_LINE bounds every format above; a truncated line is still
    // preferable to silence if that ever changes.
    let _ = line.write_fmt(args);
    line
}
