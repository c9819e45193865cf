//! # Dmrx Timebase
//! Converts the bit clock into burst timestamps. Inbound sample buffers carry wall-clock
//! hints that anchor the timebase; between hints, only sync-loss intervals advance it at the
//! nominal 9600 bit/s, so burst timestamps never drift ahead of the most recent hint.

use crate::sync::builtin::DMR_BIT_RATE;

#[derive(Debug, Clone, Copy, Default)]
pub struct TimebaseTracker {
    current_ms: u64,
}

impl TimebaseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current timestamp in milliseconds.
    pub fn now(&self) -> u64 {
        self.current_ms
    }

    /// Anchors the timebase to an external wall-clock hint.
    pub fn set(&mut self, timestamp_ms: u64) {
        self.current_ms = timestamp_ms;
    }

    /// Advances by the duration of `bits` at the nominal bit rate, rounded to the nearest
    /// millisecond.
    pub fn advance(&mut self, bits: u32) {
        self.current_ms +=
            (bits as u64 * 1000 + DMR_BIT_RATE as u64 / 2) / DMR_BIT_RATE as u64;
    }
}
