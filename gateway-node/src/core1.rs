//! Core 1: ESP-NOW link to the sensor node.
//!
//! Pushes every decoded arrival (steps, tempo deltas, control replies)
//! into the inbound queue for Core 0 and drains outbound calibration
//! requests onto the air. Noise that doesn't decode is dropped inside the
//! codec.

use esp_radio::esp_now::{EspNow, PeerInfo, BROADCAST_ADDRESS};

use cadence_core::Packet;

use crate::shared::{INBOUND, OUTBOUND};
use crate::ESP_NOW;

/// Core 1 main loop: radio service.
pub fn run() -> ! {
    log::info!("Core 1 started (radio)");

    // Give Core 0 time to finish setup
    esp_radio_rtos_driver::usleep(100_000);

    let mut esp_now = critical_section::with(|cs| {
        ESP_NOW.borrow_ref_mut(cs).take().unwrap()
    });

    let peer = peer_mac();
    log::info!(
        "radio: sensor peer {:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
        peer[0], peer[1], peer[2], peer[3], peer[4], peer[5]
    );
    esp_now
        .add_peer(PeerInfo {
            peer_address: peer,
            lmk: None,
            channel: None,
            encrypt: false,
        })
        .unwrap();

    let mut outbound = heapless::Vec::new();

    loop {
        // Forward calibration requests from the host side.
        OUTBOUND.drain(&mut outbound);
        for packet in &outbound {
            let bytes = packet.encode();
            match esp_now.send(&peer, &bytes) {
                Ok(waiter) => {
                    // Fire-and-forget: the host already got DISPATCHED.
                    if waiter.wait().is_err() {
                        log::warn!("radio: send not acked");
                    }
                }
                Err(e) => log::warn!("radio: send failed: {:?}", e),
            }
        }

        // Everything that decodes goes up to Core 0 in arrival order.
        while let Some(received) = esp_now.receive() {
            if let Some(packet) = Packet::decode(received.data()) {
                INBOUND.push(packet);
            }
        }

        // Yield to the RTOS scheduler (keeps the radio driver serviced)
        esp_radio_rtos_driver::usleep(2_000);
    }
}

/// Sensor node MAC from the build environment, broadcast if unconfigured.
fn peer_mac() -> [u8; 6] {
    match option_env!("CADENCE_PEER_MAC").and_then(parse_mac) {
        Some(mac) => mac,
        None => BROADCAST_ADDRESS,
    }
}

fn parse_mac(s: &str) -> Option<[u8; 6]> {
    let mut mac = [0u8; 6];
    let mut parts = s.split(':');
    for byte in mac.iter_mut() {
        *byte = u8::from_str_radix(parts.next()?, 16).ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(mac)
}
