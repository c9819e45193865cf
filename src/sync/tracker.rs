//! # Dmrx Sync Tracker
//! Per-timeslot synchronization state. Voice superframes transmit a sync word only on frame
//! A; the tracker carries the slot through frames B-F by advancing a predicted pattern when
//! the sync field matches nothing real. A real match is always tried first because a voice
//! superframe may terminate prematurely when the transmitter drops to a data burst.

use super::builtin::MAX_SYNCHRONIZED_BIT_ERRORS;
use super::pattern::{SyncPattern, SYNC_TABLE};

pub struct SyncTracker {
    pattern: SyncPattern,
    bit_errors: u8,
}

impl Default for SyncTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncTracker {
    pub fn new() -> Self {
        Self {
            pattern: SyncPattern::Unknown,
            bit_errors: 0,
        }
    }

    /// Pattern of the most recently tracked burst.
    pub fn pattern(&self) -> SyncPattern {
        self.pattern
    }

    /// Sync field bit errors of the most recently tracked burst.
    pub fn bit_errors(&self) -> u8 {
        self.bit_errors
    }

    pub fn is_synchronized(&self) -> bool {
        self.pattern != SyncPattern::Unknown
    }

    /// Records a detected pattern, e.g. from the searching-mode matcher.
    pub fn set(&mut self, pattern: SyncPattern, bit_errors: u8) {
        self.pattern = pattern;
        self.bit_errors = bit_errors;
    }

    /// Classifies the sync field of the burst that just completed on this tracker's timeslot.
    /// Tries a real match at the synchronized threshold, then the voice superframe chain,
    /// then degrades to `Unknown`. Returns whether the tracker still holds sync.
    pub fn track(&mut self, sync: u64) -> bool {
        for entry in &SYNC_TABLE {
            let bit_errors = (sync ^ entry.canonical).count_ones();
            if bit_errors <= MAX_SYNCHRONIZED_BIT_ERRORS as u32 {
                self.set(entry.pattern, bit_errors as u8);
                return true;
            }
        }

        if let Some(next) = self.pattern.next_voice_frame() {
            self.set(next, 0);
            return true;
        }

        self.set(SyncPattern::Unknown, 0);
        false
    }

    pub fn reset(&mut self) {
        self.set(SyncPattern::Unknown, 0);
    }
}
