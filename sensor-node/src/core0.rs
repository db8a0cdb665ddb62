//! Core 0: pressure sampling, step detection, buttons, calibration.
//!
//! Single cooperative polling loop. The only intentional stall is the
//! calibration sampling run, which blocks this core for about one second
//! while it averages the standing baseline.

use esp_hal::{
    analog::adc::{Adc, AdcPin},
    delay::Delay,
    gpio::Input,
    peripherals::{ADC1, GPIO34, GPIO35},
    Blocking,
};

use cadence_core::button::ButtonPair;
use cadence_core::calibration::{Calibration, CAL_SAMPLES, CAL_SAMPLE_DELAY_MS};
use cadence_core::packet::CMD_CALIBRATE_WEIGHT;
use cadence_core::step::{StepDetector, StepGate};
use cadence_core::{Foot, Packet};

use crate::shared::{INBOUND, OUTBOUND};

// Timing constants
const POLL_INTERVAL_MS: u32 = 5;
const WATCHDOG_FEED_MS: u64 = 10_000;

/// ADC and the two pressure sensor pins.
pub struct FootSensors {
    pub adc: Adc<'static, ADC1<'static>, Blocking>,
    pub right: AdcPin<GPIO34<'static>, ADC1<'static>>,
    pub left: AdcPin<GPIO35<'static>, ADC1<'static>>,
}

impl FootSensors {
    fn read(&mut self, foot: Foot) -> i32 {
        let raw = match foot {
            Foot::Right => self.adc.read_blocking(&mut self.right),
            Foot::Left => self.adc.read_blocking(&mut self.left),
        };
        raw as i32
    }
}

/// Core 0 main loop: sensing and event production.
pub fn run(mut sensors: FootSensors, btn_up: Input<'static>, btn_down: Input<'static>) -> ! {
    let delay = Delay::new();
    let mut calibration = Calibration::default();
    // Right foot first, matching the evaluation order guarantee.
    let mut detectors = [StepDetector::new(Foot::Right), StepDetector::new(Foot::Left)];
    let mut gate = StepGate::new();
    let mut buttons = ButtonPair::new();
    let mut inbound = heapless::Vec::new();
    let mut last_watchdog_feed: u64 = 0;

    log::info!(
        "sensor: threshold={} buffer={}",
        calibration.threshold,
        calibration.pressure_buffer
    );

    loop {
        let now = now_ms();

        // Calibration commands from the gateway. The threshold and band
        // are mutated only here; the detector just reads them.
        INBOUND.drain(&mut inbound);
        for packet in &inbound {
            match *packet {
                Packet::Control { cmd: CMD_CALIBRATE_WEIGHT, arg } => {
                    crate::feed_watchdog();
                    calibration = run_calibration(&mut sensors, &delay, arg);
                    log::info!(
                        "calibration: threshold={} buffer={}",
                        calibration.threshold,
                        calibration.pressure_buffer
                    );
                    OUTBOUND.push(Packet::Control {
                        cmd: CMD_CALIBRATE_WEIGHT,
                        arg: calibration.threshold as i16,
                    });
                }
                Packet::Control { cmd, .. } => {
                    // Unknown control command: reply with an error marker
                    // so the gateway can tell the host it was rejected.
                    log::warn!("control: unknown cmd {}", cmd);
                    OUTBOUND.push(Packet::Control { cmd, arg: -1 });
                }
                // This node never consumes step or tempo traffic.
                _ => {}
            }
        }

        // Pressure sampling and step detection, right foot first. Both
        // feet may fire in the same cycle.
        for detector in detectors.iter_mut() {
            let foot = detector.foot();
            let raw = sensors.read(foot);
            if detector.sample(raw, &calibration) {
                if let Some(event) = gate.admit(foot, now) {
                    OUTBOUND.push(Packet::Step(event));
                }
            }
        }

        // Tempo buttons, active-low.
        let up_raw = btn_up.is_low();
        let down_raw = btn_down.is_low();
        for delta in buttons.poll(up_raw, down_raw, now).into_iter().flatten() {
            OUTBOUND.push(Packet::TempoDelta { delta });
        }

        // Feed watchdog to prove this loop isn't stuck
        if now - last_watchdog_feed >= WATCHDOG_FEED_MS {
            last_watchdog_feed = now;
            crate::feed_watchdog();
        }

        delay.delay_millis(POLL_INTERVAL_MS);
    }
}

/// Sample both sensors, take the heavier foot's average as the standing
/// baseline, and derive new thresholds. Blocks this core for the whole
/// sampling run.
fn run_calibration(sensors: &mut FootSensors, delay: &Delay, margin: i16) -> Calibration {
    let mut right_sum: u64 = 0;
    let mut left_sum: u64 = 0;
    for _ in 0..CAL_SAMPLES {
        right_sum += sensors.read(Foot::Right) as u64;
        left_sum += sensors.read(Foot::Left) as u64;
        delay.delay_millis(CAL_SAMPLE_DELAY_MS);
    }
    let right_avg = (right_sum / CAL_SAMPLES as u64) as i32;
    let left_avg = (left_sum / CAL_SAMPLES as u64) as i32;
    Calibration::derive(right_avg.max(left_avg), margin)
}

fn now_ms() -> u64 {
    esp_hal::time::Instant::now().duration_since_epoch().as_millis()
}
