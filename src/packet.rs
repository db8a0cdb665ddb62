//! Wire protocol between the sensor node and the gateway.
//!
//! Every transmission is exactly [`PACKET_LEN`] bytes: a type tag followed
//! by the variant payload, zero-padded to the largest variant. The receiver
//! validates by exact length before looking at the tag, so no length prefix
//! is needed on the link.
//!
//! Wire contract (all multi-byte fields little-endian):
//!
//! | tag | variant    | payload                                  |
//! |-----|------------|------------------------------------------|
//! | 1   | Step       | interval_ms u32 at 1..5, foot u8 at 5    |
//! | 2   | TempoDelta | delta i8 at 1                            |
//! | 3   | Control    | cmd u8 at 1, arg i16 at 2..4             |
//!
//! A 5-byte buffer is additionally accepted as a legacy raw step event
//! (interval_ms u32 at 0..4, foot u8 at 4) for compatibility with older
//! senders. This is a bounded exception, not a general form.

/// Fixed size of every tagged packet on the wire.
pub const PACKET_LEN: usize = 8;

/// Size of a legacy raw step event from pre-protocol senders.
pub const LEGACY_STEP_LEN: usize = 5;

/// Control command: sample standing weight and derive a new step threshold.
pub const CMD_CALIBRATE_WEIGHT: u8 = 1;

const TAG_STEP: u8 = 1;
const TAG_TEMPO_DELTA: u8 = 2;
const TAG_CONTROL: u8 = 3;

/// Which foot produced a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Foot {
    Right = 1,
    Left = 2,
}

impl Foot {
    fn from_wire(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Foot::Right),
            2 => Some(Foot::Left),
            _ => None,
        }
    }
}

/// A detected footfall with the elapsed time since the previous sent step
/// on either foot. Zero only for the first step of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepEvent {
    pub interval_ms: u32,
    pub foot: Foot,
}

/// The tagged union exchanged between nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packet {
    Step(StepEvent),
    TempoDelta { delta: i8 },
    Control { cmd: u8, arg: i16 },
}

impl Packet {
    /// Serialize to the fixed wire size. Unused trailing bytes are zero.
    pub fn encode(&self) -> [u8; PACKET_LEN] {
        let mut buf = [0u8; PACKET_LEN];
        match *self {
            Packet::Step(ev) => {
                buf[0] = TAG_STEP;
                buf[1..5].copy_from_slice(&ev.interval_ms.to_le_bytes());
                buf[5] = ev.foot as u8;
            }
            Packet::TempoDelta { delta } => {
                buf[0] = TAG_TEMPO_DELTA;
                buf[1] = delta as u8;
            }
            Packet::Control { cmd, arg } => {
                buf[0] = TAG_CONTROL;
                buf[1] = cmd;
                buf[2..4].copy_from_slice(&arg.to_le_bytes());
            }
        }
        buf
    }

    /// Parse a received buffer. Anything that is not exactly a tagged
    /// packet or a legacy raw step event decodes to `None` and is dropped
    /// by the caller - a noisy link must never destabilize node state.
    pub fn decode(buf: &[u8]) -> Option<Packet> {
        match buf.len() {
            PACKET_LEN => Self::decode_tagged(buf),
            LEGACY_STEP_LEN => Self::decode_legacy_step(buf),
            len => {
                log::debug!("packet: bad length {}, dropped", len);
                None
            }
        }
    }

    fn decode_tagged(buf: &[u8]) -> Option<Packet> {
        match buf[0] {
            TAG_STEP => {
                let interval_ms = u32::from_le_bytes([buf[1], buf[2], buf[3], buf[4]]);
                let foot = Foot::from_wire(buf[5])?;
                Some(Packet::Step(StepEvent { interval_ms, foot }))
            }
            TAG_TEMPO_DELTA => Some(Packet::TempoDelta { delta: buf[1] as i8 }),
            TAG_CONTROL => {
                let arg = i16::from_le_bytes([buf[2], buf[3]]);
                Some(Packet::Control { cmd: buf[1], arg })
            }
            tag => {
                log::debug!("packet: unknown tag {}, dropped", tag);
                None
            }
        }
    }

    fn decode_legacy_step(buf: &[u8]) -> Option<Packet> {
        let interval_ms = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
        let foot = Foot::from_wire(buf[4])?;
        Some(Packet::Step(StepEvent { interval_ms, foot }))
    }
}
