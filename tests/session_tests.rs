//! End-to-end tests for the gateway session: command parsing, the
//! RESET/START lifecycle, step reporting, and calibration round-trips.

use cadence_core::packet::{Packet, CMD_CALIBRATE_WEIGHT};
use cadence_core::session::{parse_command, HostCommand, Session};
use cadence_core::{Foot, StepEvent};

fn step(interval_ms: u32, foot: Foot) -> StepEvent {
    StepEvent { interval_ms, foot }
}

fn start_session() -> Session {
    let mut s = Session::new();
    assert!(s.handle_line("RESET").reply.is_some());
    assert!(s.handle_line("START").reply.is_some());
    s
}

/// Split a `now,foot,instant,avg` report into its fields.
fn report_fields(line: &str) -> (u64, u8, f32, f32) {
    let mut it = line.split(',');
    let now = it.next().unwrap().parse().unwrap();
    let foot = it.next().unwrap().parse().unwrap();
    let instant = it.next().unwrap().parse().unwrap();
    let avg = it.next().unwrap().parse().unwrap();
    assert!(it.next().is_none());
    (now, foot, instant, avg)
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_parse_known_commands() {
    assert_eq!(parse_command("RESET"), Some(HostCommand::Reset));
    assert_eq!(parse_command("START"), Some(HostCommand::Start));
    assert_eq!(parse_command("SET_WINDOW,5"), Some(HostCommand::SetWindow(5)));
    assert_eq!(parse_command("SET_STRIDE,2"), Some(HostCommand::SetStride(2)));
    assert_eq!(parse_command("CAL_WEIGHT,200"), Some(HostCommand::Calibrate(200)));
}

#[test]
fn test_parse_tolerates_whitespace() {
    assert_eq!(parse_command("  RESET \r"), Some(HostCommand::Reset));
    assert_eq!(parse_command("SET_WINDOW, 5"), Some(HostCommand::SetWindow(5)));
}

#[test]
fn test_cal_weight_margin_is_optional() {
    // No margin falls back to the sensor node default
    assert_eq!(parse_command("CAL_WEIGHT"), Some(HostCommand::Calibrate(150)));
}

#[test]
fn test_parse_rejects_garbage() {
    assert_eq!(parse_command(""), None);
    assert_eq!(parse_command("STOP"), None);
    assert_eq!(parse_command("RESET,1"), None);
    assert_eq!(parse_command("SET_WINDOW"), None);
    assert_eq!(parse_command("SET_WINDOW,abc"), None);
    assert_eq!(parse_command("SET_WINDOW,3,4"), None);
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_reset_and_start_acknowledge() {
    let mut s = Session::new();
    assert_eq!(s.handle_line("RESET").reply.unwrap().as_str(), "ACK,RESET");
    assert_eq!(s.handle_line("START").reply.unwrap().as_str(), "ACK,START");
}

#[test]
fn test_start_without_reset_is_ignored() {
    let mut s = Session::new();
    let outcome = s.handle_line("START");
    assert!(outcome.reply.is_none());
    assert!(outcome.dispatch.is_none());
}

#[test]
fn test_start_is_consumed() {
    let mut s = start_session();
    // A second START without a new RESET does nothing
    assert!(s.handle_line("START").reply.is_none());
    // RESET re-arms at any time
    assert!(s.handle_line("RESET").reply.is_some());
    assert!(s.handle_line("START").reply.is_some());
}

#[test]
fn test_first_step_after_start_only_seeds() {
    let mut s = start_session();
    let line = s.on_step(5000, step(0, Foot::Right));
    let (now, foot, instant, avg) = report_fields(&line);
    assert_eq!(now, 5000);
    assert_eq!(foot, 1);
    assert_eq!(instant, 0.0);
    assert_eq!(avg, 0.0);
}

#[test]
fn test_start_clears_a_running_estimate() {
    let mut s = start_session();
    s.handle_line("SET_STRIDE,1");
    s.on_step(5000, step(0, Foot::Right));
    s.on_step(5500, step(500, Foot::Left));
    assert!(s.estimator().current_bpm() > 0.0);

    s.handle_line("RESET");
    s.handle_line("START");
    assert_eq!(s.estimator().current_bpm(), 0.0);
}

// ============================================================================
// Step reporting
// ============================================================================

#[test]
fn test_steady_walk_reports_cadence() {
    let mut s = start_session();
    s.handle_line("SET_STRIDE,1");
    s.on_step(1000, step(0, Foot::Right));

    let mut last = None;
    for i in 1..=3u64 {
        let foot = if i % 2 == 0 { Foot::Right } else { Foot::Left };
        last = Some(s.on_step(1000 + i * 500, step(500, foot)));
    }
    let (_, foot, instant, avg) = report_fields(&last.unwrap());
    assert_eq!(foot, 2);
    assert!((instant - 120.0).abs() < 0.01);
    assert!((avg - 120.0).abs() < 0.01);
}

#[test]
fn test_report_formats_two_decimals() {
    let mut s = start_session();
    s.handle_line("SET_STRIDE,1");
    s.on_step(1000, step(0, Foot::Right));
    let line = s.on_step(1500, step(500, Foot::Left));
    assert_eq!(line.as_str(), "1500,2,120.00,120.00");
}

#[test]
fn test_tempo_delta_line() {
    let s = Session::new();
    assert_eq!(s.on_tempo_delta(-2).as_str(), "BTN,-2");
    assert_eq!(s.on_tempo_delta(5).as_str(), "BTN,5");
}

// ============================================================================
// Reconfiguration over the link
// ============================================================================

#[test]
fn test_set_window_and_stride_acknowledge() {
    let mut s = Session::new();
    assert_eq!(s.handle_line("SET_WINDOW,5").reply.unwrap().as_str(), "ACK,WINDOW,5");
    assert_eq!(s.handle_line("SET_STRIDE,4").reply.unwrap().as_str(), "ACK,STRIDE,4");
}

#[test]
fn test_out_of_range_settings_are_silently_ignored() {
    let mut s = Session::new();
    assert!(s.handle_line("SET_WINDOW,0").reply.is_none());
    assert!(s.handle_line("SET_WINDOW,21").reply.is_none());
    // Stride may not exceed the current window of 3
    assert!(s.handle_line("SET_STRIDE,4").reply.is_none());
}

#[test]
fn test_window_shrink_clamps_stride_over_the_link() {
    let mut s = Session::new();
    s.handle_line("SET_WINDOW,10");
    s.handle_line("SET_STRIDE,8");
    s.handle_line("SET_WINDOW,4");
    assert_eq!(s.estimator().stride(), 4);
}

// ============================================================================
// Calibration round-trip
// ============================================================================

#[test]
fn test_cal_weight_dispatches_to_the_sensor_node() {
    let mut s = Session::new();
    let outcome = s.handle_line("CAL_WEIGHT,200");
    assert_eq!(outcome.reply.unwrap().as_str(), "ACK,CAL_WEIGHT,DISPATCHED");
    assert_eq!(
        outcome.dispatch,
        Some(Packet::Control {
            cmd: CMD_CALIBRATE_WEIGHT,
            arg: 200,
        })
    );
}

#[test]
fn test_calibration_reply_reports_the_new_threshold() {
    let s = Session::new();
    let line = s.on_control_reply(CMD_CALIBRATE_WEIGHT, 1650);
    assert_eq!(line.as_str(), "ACK,CAL_WEIGHT,1650");
}

#[test]
fn test_rejected_calibration_reports_an_error() {
    let s = Session::new();
    assert_eq!(s.on_control_reply(CMD_CALIBRATE_WEIGHT, -1).as_str(), "ERR,CAL_WEIGHT");
    assert_eq!(s.on_control_reply(9, 42).as_str(), "ERR,CAL_WEIGHT");
}
