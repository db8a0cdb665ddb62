//! Build script for compile-time configuration injection.
//!
//! Set the gateway's MAC before building to address ESP-NOW traffic at a
//! specific peer (otherwise packets go to the broadcast address):
//!
//!   CADENCE_PEER_MAC=24:6F:28:AA:BB:CC cargo build --release

fn main() {
    println!("cargo::rerun-if-env-changed=CADENCE_PEER_MAC");
}
