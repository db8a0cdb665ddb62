//! Byte-at-a-time assembly of line-terminated host commands.

/// Result of pushing one received byte.
pub enum LineEvent<'a> {
    None,
    /// A complete non-empty line, terminator stripped.
    Line(&'a [u8]),
    /// The line exceeded the buffer; everything up to the next terminator
    /// is discarded.
    Overflow,
}

/// Accumulates serial bytes into lines. `\r` and `\n` both terminate, so
/// CRLF hosts produce one line (the empty `\n` remainder is swallowed).
pub struct LineReader<const N: usize = 64> {
    buf: [u8; N],
    len: usize,
    overflowed: bool,
}

impl<const N: usize> LineReader<N> {
    pub const fn new() -> Self {
        Self {
            buf: [0; N],
            len: 0,
            overflowed: false,
        }
    }

    pub fn push(&mut self, byte: u8) -> LineEvent<'_> {
        if byte == b'\r' || byte == b'\n' {
            if self.overflowed {
                self.overflowed = false;
                return LineEvent::None;
            }
            if self.len == 0 {
                return LineEvent::None;
            }
            let complete = self.len;
            self.len = 0;
            return LineEvent::Line(&self.buf[..complete]);
        }

        if self.overflowed {
            return LineEvent::None;
        }

        if self.len < N {
            self.buf[self.len] = byte;
            self.len += 1;
            return LineEvent::None;
        }

        self.len = 0;
        self.overflowed = true;
        LineEvent::Overflow
    }
}

impl<const N: usize> Default for LineReader<N> {
    fn default() -> Self {
        Self::new()
    }
}
