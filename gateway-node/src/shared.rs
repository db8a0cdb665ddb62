//! Cross-core packet handoff.
//!
//! Core 1 (radio) pushes decoded arrivals from the sensor node into
//! `INBOUND`; the Core 0 loop drains them. `OUTBOUND` carries calibration
//! requests the other way. Every element is copied whole inside a single
//! critical section - the consumer never reads fields of an entry the
//! producer could still be writing.

use core::cell::RefCell;
use critical_section::Mutex;
use heapless::Deque;

use cadence_core::Packet;

pub const QUEUE_DEPTH: usize = 8;

/// FIFO of whole packets guarded by a critical section.
pub struct PacketQueue {
    inner: Mutex<RefCell<Deque<Packet, QUEUE_DEPTH>>>,
}

impl PacketQueue {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Push one packet. When full, the oldest entry is discarded - the
    /// wireless link is best-effort, so losing the stalest event is the
    /// least surprising failure mode.
    pub fn push(&self, packet: Packet) {
        critical_section::with(|cs| {
            let mut queue = self.inner.borrow_ref_mut(cs);
            if queue.is_full() {
                log::warn!("handoff: queue full, dropping oldest");
                queue.pop_front();
            }
            let _ = queue.push_back(packet);
        });
    }

    /// Move everything out in one critical section, preserving arrival
    /// order.
    pub fn drain(&self, out: &mut heapless::Vec<Packet, QUEUE_DEPTH>) {
        out.clear();
        critical_section::with(|cs| {
            let mut queue = self.inner.borrow_ref_mut(cs);
            while let Some(packet) = queue.pop_front() {
                let _ = out.push(packet);
            }
        });
    }
}

/// Packets received from the sensor node (steps, deltas, replies).
pub static INBOUND: PacketQueue = PacketQueue::new();

/// Packets to transmit to the sensor node (calibration commands).
pub static OUTBOUND: PacketQueue = PacketQueue::new();
