//! # Dmrx Burst Messages
//! Event types flowing out of the framing pipeline. The burst framer emits raw
//! [`FramerEvent`]s; the message framer resolves timeslot and timestamp and hands finished
//! [`Burst`]s and [`SyncLoss`]es to the registered listener.

use crate::sync::builtin::{SYNC_DIBIT_LENGTH, SYNC_DIBIT_OFFSET};
use crate::sync::{CarrierLock, SyncPattern};
use bitvec::prelude::*;

/// A framed burst before timeslot and timestamp assignment.
#[derive(Debug, Clone)]
pub struct FramedBurst {
    /// The 288 burst bits, MSB-first in dibit order.
    pub bits: BitVec<u8, Msb0>,
    pub pattern: SyncPattern,
    pub lock: CarrierLock,
    pub bit_errors: u8,
}

/// Output of the burst framer, in strict arrival order. A sync loss emitted while framing a
/// burst always precedes the burst it pads.
#[derive(Debug, Clone)]
pub enum FramerEvent {
    Burst(FramedBurst),
    /// Bit count processed without sync.
    SyncLoss(u32),
}

/// A timeslot-tagged, time-stamped DMR burst ready for message decoding.
#[derive(Debug, Clone)]
pub struct Burst {
    /// The 288 burst bits, MSB-first in dibit order: 12 dibits of CACH (base station bursts),
    /// 54 payload dibits, the 24-dibit sync field and 54 more payload dibits.
    pub bits: BitVec<u8, Msb0>,
    pub pattern: SyncPattern,
    pub lock: CarrierLock,
    /// Bit errors between the sync field and the matched pattern.
    pub bit_errors: u8,
    pub timeslot: u8,
    pub timestamp_ms: u64,
    /// Running count of corrected bits, seeded with the sync field errors for downstream
    /// decoders to extend.
    pub corrected_bits: u16,
}

impl Burst {
    /// The burst as 36 packed bytes.
    pub fn bytes(&self) -> &[u8] {
        self.bits.as_raw_slice()
    }

    /// Value of the 48-bit sync field.
    pub fn sync_field(&self) -> u64 {
        self.bits[SYNC_DIBIT_OFFSET * 2..(SYNC_DIBIT_OFFSET + SYNC_DIBIT_LENGTH) * 2]
            .iter()
            .fold(0u64, |acc, bit| (acc << 1) | *bit as u64)
    }
}

/// Dibits processed without finding or holding sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncLoss {
    pub bits: u32,
    pub timestamp_ms: u64,
}

/// Receiver for framed output. Implementations must not block; the framing pipeline runs on
/// the symbol processing thread.
pub trait BurstListener {
    fn burst(&mut self, burst: Burst);
    fn sync_loss(&mut self, loss: SyncLoss);
}
