//! # Dmrx Sync Constants
//! Burst geometry and sync matching constants for DMR (ETSI TS 102-361-1). A burst is 144
//! dibits: 12 dibits of CACH (base station bursts only), 54 dibits of payload, 24 dibits of
//! sync and 54 more dibits of payload. The sync delay buffer length equals the second payload
//! half so that a sync match lines up with a complete burst in the message buffer.

/// Symbols per second; one symbol carries one dibit.
pub const DMR_SYMBOL_RATE: u32 = 4800;

/// Bits per second.
pub const DMR_BIT_RATE: u32 = 9600;

/// Dibits per burst.
pub const BURST_DIBIT_LENGTH: usize = 144;

/// Dibit offset of the sync field within a burst.
pub const SYNC_DIBIT_OFFSET: usize = 66;

/// Dibits in the sync field.
pub const SYNC_DIBIT_LENGTH: usize = 24;

/// Dibits in the second half of the burst payload, following the sync field.
pub const SYNC_DELAY_DIBIT_LENGTH: usize = 54;

/// Dibits in the Common Announcement Channel prefix of base station bursts.
pub const CACH_DIBIT_LENGTH: usize = 12;

/// Mask for the 48-bit rolling sync register.
pub const SYNC_MASK: u64 = 0xFFFF_FFFF_FFFF;

/// Maximum sync-field bit errors accepted while searching for sync.
pub const MAX_SEARCH_BIT_ERRORS: u8 = 3;

/// Maximum sync-field bit errors accepted while synchronized.
pub const MAX_SYNCHRONIZED_BIT_ERRORS: u8 = 6;

/// Widest soft-match threshold a matcher will accept at construction.
pub const MAX_MATCH_THRESHOLD: u8 = 24;

/// Dibit count that triggers a sync-loss report while searching: one second of symbols plus
/// one burst, so the counter never resets below the burst length.
pub const SYNC_LOSS_DIBIT_THRESHOLD: usize = DMR_SYMBOL_RATE as usize + BURST_DIBIT_LENGTH;

/// PLL frequency correction for a carrier locked 90 degrees off, in hertz.
pub const PLL_CORRECTION_90_DEGREES: f64 = DMR_SYMBOL_RATE as f64 / 4.0;

/// PLL frequency correction for an inverted carrier lock, in hertz.
pub const PLL_CORRECTION_180_DEGREES: f64 = DMR_SYMBOL_RATE as f64 / 2.0;
