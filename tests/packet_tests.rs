//! Wire codec tests: tagged packets, the legacy raw step form, and
//! rejection of everything else.

use cadence_core::packet::{Packet, CMD_CALIBRATE_WEIGHT, LEGACY_STEP_LEN, PACKET_LEN};
use cadence_core::{Foot, StepEvent};

// ============================================================================
// Encoding
// ============================================================================

#[test]
fn test_step_encodes_little_endian() {
    let pkt = Packet::Step(StepEvent {
        interval_ms: 0x0102_0304,
        foot: Foot::Right,
    });
    assert_eq!(pkt.encode(), [1, 0x04, 0x03, 0x02, 0x01, 1, 0, 0]);
}

#[test]
fn test_left_foot_wire_value() {
    let pkt = Packet::Step(StepEvent {
        interval_ms: 500,
        foot: Foot::Left,
    });
    assert_eq!(pkt.encode()[5], 2);
}

#[test]
fn test_tempo_delta_encodes_signed_byte() {
    assert_eq!(
        Packet::TempoDelta { delta: -5 }.encode(),
        [2, 0xFB, 0, 0, 0, 0, 0, 0]
    );
}

#[test]
fn test_control_encodes_cmd_and_arg() {
    let pkt = Packet::Control {
        cmd: CMD_CALIBRATE_WEIGHT,
        arg: -1,
    };
    assert_eq!(pkt.encode(), [3, 1, 0xFF, 0xFF, 0, 0, 0, 0]);
}

#[test]
fn test_all_variants_share_the_fixed_size() {
    let pkts = [
        Packet::Step(StepEvent {
            interval_ms: 1,
            foot: Foot::Right,
        }),
        Packet::TempoDelta { delta: 1 },
        Packet::Control { cmd: 1, arg: 1 },
    ];
    for pkt in pkts {
        assert_eq!(pkt.encode().len(), PACKET_LEN);
    }
}

// ============================================================================
// Decoding
// ============================================================================

#[test]
fn test_round_trip_every_variant() {
    let pkts = [
        Packet::Step(StepEvent {
            interval_ms: 123_456,
            foot: Foot::Left,
        }),
        Packet::TempoDelta { delta: i8::MIN },
        Packet::Control {
            cmd: CMD_CALIBRATE_WEIGHT,
            arg: 1650,
        },
    ];
    for pkt in pkts {
        assert_eq!(Packet::decode(&pkt.encode()), Some(pkt));
    }
}

#[test]
fn test_legacy_five_byte_step_accepted() {
    // interval_ms u32 at 0..4, foot u8 at 4
    let buf = [0xF4, 0x01, 0, 0, 2];
    assert_eq!(buf.len(), LEGACY_STEP_LEN);
    assert_eq!(
        Packet::decode(&buf),
        Some(Packet::Step(StepEvent {
            interval_ms: 500,
            foot: Foot::Left,
        }))
    );
}

#[test]
fn test_wrong_lengths_rejected() {
    assert_eq!(Packet::decode(&[]), None);
    assert_eq!(Packet::decode(&[1, 0, 0, 0]), None);
    assert_eq!(Packet::decode(&[1, 0, 0, 0, 0, 1, 0]), None);
    assert_eq!(Packet::decode(&[1, 0, 0, 0, 0, 1, 0, 0, 0]), None);
}

#[test]
fn test_unknown_tag_rejected() {
    assert_eq!(Packet::decode(&[0, 0, 0, 0, 0, 0, 0, 0]), None);
    assert_eq!(Packet::decode(&[9, 0, 0, 0, 0, 0, 0, 0]), None);
}

#[test]
fn test_bad_foot_byte_rejected() {
    let mut buf = Packet::Step(StepEvent {
        interval_ms: 500,
        foot: Foot::Right,
    })
    .encode();
    buf[5] = 3;
    assert_eq!(Packet::decode(&buf), None);

    // Legacy form validates the foot byte too
    assert_eq!(Packet::decode(&[0, 0, 0, 0, 0]), None);
}

#[test]
fn test_control_arg_round_trips_negative() {
    let pkt = Packet::Control { cmd: 7, arg: -1 };
    let Some(Packet::Control { arg, .. }) = Packet::decode(&pkt.encode()) else {
        panic!("control packet did not decode");
    };
    assert_eq!(arg, -1);
}
