//! Core logic for the footfall cadence system.
//!
//! Two ESP32 nodes share this crate: the foot-mounted sensor node (step
//! detection, tempo buttons, weight calibration) and the gateway node
//! (cadence estimation, host serial protocol). Everything here is pure and
//! `no_std` so the firmware crates can link it and the behavioral tests in
//! `tests/` can run on the host.

#![no_std]

pub mod button;
pub mod calibration;
pub mod estimator;
pub mod filter;
pub mod history;
pub mod line;
pub mod packet;
pub mod session;
pub mod step;

pub use packet::{Foot, Packet, StepEvent};
