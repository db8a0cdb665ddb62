//! Build script for compile-time configuration injection.
//!
//! Set the sensor node's MAC before building to address ESP-NOW traffic at
//! a specific peer (otherwise packets go to the broadcast address):
//!
//!   CADENCE_PEER_MAC=24:6F:28:DD:EE:FF cargo build --release

fn main() {
    println!("cargo::rerun-if-env-changed=CADENCE_PEER_MAC");
}
