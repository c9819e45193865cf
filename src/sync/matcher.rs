//! # Dmrx Soft Sync Matcher
//! Scans the delayed dibit stream for sync words with a rolling 48-bit register. Canonical
//! words match softly, tolerating up to the configured number of bit errors; the mis-lock
//! variants (+90, -90, 180 degrees) match only exactly, since accepting errors there would
//! trade a recoverable carrier anomaly for a false lock.

use super::builtin::{MAX_MATCH_THRESHOLD, SYNC_MASK};
use super::pattern::{CarrierLock, SyncPattern, SYNC_TABLE};
use crate::symbol::Dibit;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Soft match threshold out of range (got {0}, expected 1..=24)")]
    InvalidThreshold(u8),
}

/// A sync word located in the dibit stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncDetect {
    pub pattern: SyncPattern,
    pub lock: CarrierLock,
    pub bit_errors: u8,
}

pub struct SoftSyncMatcher {
    register: u64,
    threshold: u32,
}

impl SoftSyncMatcher {
    /// Creates a matcher tolerating up to `threshold` bit errors (1..=24) on canonical words.
    pub fn new(threshold: u8) -> Result<Self, SyncError> {
        if threshold == 0 || threshold > MAX_MATCH_THRESHOLD {
            return Err(SyncError::InvalidThreshold(threshold));
        }
        Ok(Self {
            register: 0,
            threshold: threshold as u32,
        })
    }

    /// Shifts the dibit into the register and checks every table entry. Returns the first
    /// match in table order, if any.
    pub fn receive(&mut self, dibit: Dibit) -> Option<SyncDetect> {
        self.register = ((self.register << 2) | dibit.value() as u64) & SYNC_MASK;
        self.check()
    }

    /// Loads the register directly, to resume searching from a known sync field value.
    pub fn set_register(&mut self, value: u64) {
        self.register = value & SYNC_MASK;
    }

    fn check(&self) -> Option<SyncDetect> {
        for entry in &SYNC_TABLE {
            let error_pattern = self.register ^ entry.canonical;

            if error_pattern == 0 {
                return Some(SyncDetect {
                    pattern: entry.pattern,
                    lock: CarrierLock::Normal,
                    bit_errors: 0,
                });
            }

            let bit_errors = error_pattern.count_ones();
            if bit_errors <= self.threshold {
                return Some(SyncDetect {
                    pattern: entry.pattern,
                    lock: CarrierLock::Normal,
                    bit_errors: bit_errors as u8,
                });
            }

            if self.register == entry.plus90 {
                return Some(SyncDetect {
                    pattern: entry.pattern,
                    lock: CarrierLock::Plus90,
                    bit_errors: 0,
                });
            }

            if self.register == entry.minus90 {
                return Some(SyncDetect {
                    pattern: entry.pattern,
                    lock: CarrierLock::Minus90,
                    bit_errors: 0,
                });
            }

            if self.register == entry.inverted {
                return Some(SyncDetect {
                    pattern: entry.pattern,
                    lock: CarrierLock::Inverted,
                    bit_errors: 0,
                });
            }
        }

        None
    }
}
