//! Blocking UART helpers for the line-oriented host link.

use esp_hal::uart::Uart;
use esp_hal::Blocking;

pub type HostUart = Uart<'static, Blocking>;

/// Write a whole buffer, retrying partial writes. A dead host link is not
/// an error this node can act on, so failures are swallowed.
pub fn write_all(uart: &mut HostUart, mut bytes: &[u8]) {
    while !bytes.is_empty() {
        match uart.write(bytes) {
            Ok(0) | Err(_) => break,
            Ok(n) => bytes = &bytes[n..],
        }
    }
}

/// Send one protocol line, appending the terminator.
pub fn send_line(uart: &mut HostUart, line: &str) {
    write_all(uart, line.as_bytes());
    write_all(uart, b"\n");
}
