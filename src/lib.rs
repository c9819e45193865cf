//! # Dmrx
//! Dmrx is the streaming front-end of a DMR (ETSI TS 102-361) receiver. It consumes the
//! dibit symbol stream recovered by a QPSK/4-FSK demodulator and produces framed,
//! timeslot-tagged, time-stamped 288-bit bursts ready for message decoding, along with
//! sync-loss accounting for every symbol that could not be framed.
//!
//! ## Signal flow
//!
//! ```text
//! bytes/dibits → MessageFramer → BurstFramer → { Burst | SyncLoss } → BurstListener
//!                                     ↓
//!                              PhaseLockedLoop corrections (±1200 Hz, +2400 Hz)
//! ```
//!
//! The burst framer locates 48-bit sync words inside the two-slot TDMA structure with a
//! soft matcher, then tracks each timeslot independently so that voice superframes, which
//! transmit sync only on frame A, keep their slot through frames B-F. Sync words received
//! through a carrier locked 90 or 180 degrees off match as rotated variants; the framer
//! commands the upstream PLL back into alignment and de-rotates the buffered burst.
//!
//! The whole pipeline is single-threaded and allocation-free per dibit; it is driven by
//! calling [`MessageFramer::receive`] from the symbol processing thread.

pub mod burst;
pub mod channel;
pub mod symbol;
pub mod sync;
pub mod timebase;

pub use burst::{Burst, BurstFramer, BurstListener, Cach, MessageFramer, PhaseLockedLoop, SyncLoss};
pub use symbol::{Dibit, DibitDelayBuffer};
pub use sync::{CarrierLock, SoftSyncMatcher, SyncError, SyncPattern, SyncTracker};
pub use timebase::TimebaseTracker;
