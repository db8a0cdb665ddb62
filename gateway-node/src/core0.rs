//! Core 0: host serial protocol and cadence estimation.
//!
//! Single cooperative polling loop: drain host bytes into the command
//! interpreter, drain wireless arrivals into step/button/reply lines,
//! feed the watchdog, sleep, repeat.
//!
//! With the `legacy-host` feature the command interpreter is compiled out
//! and every step is reported as a raw `STEP,<interval>,<foot>` line, for
//! the standalone logging tools that predate the session protocol.

use esp_hal::delay::Delay;

use cadence_core::line::{LineEvent, LineReader};
use cadence_core::Packet;
#[cfg(not(feature = "legacy-host"))]
use cadence_core::session::Session;

use crate::host_link::{self, HostUart};
use crate::shared::{INBOUND, OUTBOUND};

// Timing constants
const POLL_INTERVAL_MS: u32 = 5;
const WATCHDOG_FEED_MS: u64 = 10_000;

/// Core 0 main loop: the host-facing side of the gateway.
pub fn run(mut uart: HostUart) -> ! {
    let delay = Delay::new();
    let mut reader: LineReader<64> = LineReader::new();
    let mut rx_buf = [0u8; 64];
    let mut inbound = heapless::Vec::new();
    let mut last_watchdog_feed: u64 = 0;

    #[cfg(not(feature = "legacy-host"))]
    let mut session = Session::new();

    loop {
        let now = now_ms();

        // Host commands. Bytes are drained even in the legacy build so a
        // chatty host cannot back up the UART FIFO.
        while let Ok(n) = uart.read_buffered(&mut rx_buf) {
            if n == 0 {
                break;
            }
            for &byte in &rx_buf[..n] {
                match reader.push(byte) {
                    #[cfg(not(feature = "legacy-host"))]
                    LineEvent::Line(raw) => {
                        let Ok(line) = core::str::from_utf8(raw) else {
                            continue;
                        };
                        let outcome = session.handle_line(line);
                        if let Some(reply) = outcome.reply {
                            host_link::send_line(&mut uart, &reply);
                        }
                        if let Some(packet) = outcome.dispatch {
                            OUTBOUND.push(packet);
                        }
                    }
                    LineEvent::Overflow => log::warn!("host: command line overflow"),
                    _ => {}
                }
            }
        }

        // Wireless arrivals from the sensor node.
        INBOUND.drain(&mut inbound);
        for packet in &inbound {
            match *packet {
                Packet::Step(ev) => {
                    #[cfg(not(feature = "legacy-host"))]
                    {
                        let line = session.on_step(now, ev);
                        host_link::send_line(&mut uart, &line);
                    }
                    #[cfg(feature = "legacy-host")]
                    {
                        let mut line: heapless::String<32> = heapless::String::new();
                        let _ = core::fmt::Write::write_fmt(
                            &mut line,
                            format_args!("STEP,{},{}", ev.interval_ms, ev.foot as u8),
                        );
                        host_link::send_line(&mut uart, &line);
                    }
                }
                #[cfg(not(feature = "legacy-host"))]
                Packet::TempoDelta { delta } => {
                    let line = session.on_tempo_delta(delta);
                    host_link::send_line(&mut uart, &line);
                }
                #[cfg(not(feature = "legacy-host"))]
                Packet::Control { cmd, arg } => {
                    let line = session.on_control_reply(cmd, arg);
                    host_link::send_line(&mut uart, &line);
                }
                #[cfg(feature = "legacy-host")]
                _ => {}
            }
        }

        // Feed watchdog to prove this loop isn't stuck
        if now - last_watchdog_feed >= WATCHDOG_FEED_MS {
            last_watchdog_feed = now;
            crate::feed_watchdog();
        }

        delay.delay_millis(POLL_INTERVAL_MS);
    }
}

fn now_ms() -> u64 {
    esp_hal::time::Instant::now().duration_since_epoch().as_millis()
}
