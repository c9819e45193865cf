mod matcher;
mod pattern;
mod tracker;

pub mod builtin;

pub use matcher::{SoftSyncMatcher, SyncDetect, SyncError};
pub use pattern::{
    all_patterns, cach_patterns, voice_patterns, CarrierLock, SyncEntry, SyncPattern, SYNC_TABLE,
};
pub use tracker::SyncTracker;
