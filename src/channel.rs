//! # Dmrx Channels
//! Logical slot numbers (LSN) name the two timeslots of each repeater channel as a 1-based
//! sequence: odd numbers are timeslot 0, even numbers are timeslot 1. Trunked systems signal
//! channels by LSN; mapping an LSN to RF frequencies requires a site-specific table that is
//! fed from an external configuration store. The framing core never reads this module.

use serde::{Deserialize, Serialize};

/// Maps one logical slot number to a pair of RF frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeslotFrequency {
    /// Logical slot number, 1-based.
    pub lsn: u32,
    /// Downlink frequency in hertz.
    pub downlink: u64,
    /// Uplink frequency in hertz.
    pub uplink: u64,
}

impl TimeslotFrequency {
    /// Zero-based timeslot for this LSN.
    pub fn timeslot(&self) -> u8 {
        ((self.lsn + 1) % 2) as u8
    }

    /// One-based repeater channel number for this LSN.
    pub fn channel_number(&self) -> u32 {
        (self.lsn + 1) / 2
    }
}

/// Site channel plan: a list of LSN-to-frequency mappings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeslotFrequencyMap(Vec<TimeslotFrequency>);

impl TimeslotFrequencyMap {
    pub fn new(entries: Vec<TimeslotFrequency>) -> Self {
        Self(entries)
    }

    pub fn find(&self, lsn: u32) -> Option<&TimeslotFrequency> {
        self.0.iter().find(|entry| entry.lsn == lsn)
    }

    pub fn entries(&self) -> &[TimeslotFrequency] {
        &self.0
    }
}

/// A repeater channel number paired with a timeslot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalChannel {
    channel: u32,
    timeslot: u8,
}

impl LogicalChannel {
    pub fn new(channel: u32, timeslot: u8) -> Self {
        assert!(channel >= 1, "Channel numbers are 1-based");
        assert!(timeslot <= 1, "Timeslot must be 0 or 1 (got {timeslot})");
        Self { channel, timeslot }
    }

    pub fn channel(&self) -> u32 {
        self.channel
    }

    pub fn timeslot(&self) -> u8 {
        self.timeslot
    }

    /// Logical slot number for this channel and timeslot.
    pub fn logical_slot_number(&self) -> u32 {
        (self.channel - 1) * 2 + self.timeslot as u32 + 1
    }

    pub fn downlink_frequency(&self, map: &TimeslotFrequencyMap) -> Option<u64> {
        map.find(self.logical_slot_number())
            .map(|entry| entry.downlink)
    }

    pub fn uplink_frequency(&self, map: &TimeslotFrequencyMap) -> Option<u64> {
        map.find(self.logical_slot_number())
            .map(|entry| entry.uplink)
    }
}

impl std::fmt::Display for LogicalChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LSN:{} TS:{}", self.logical_slot_number(), self.timeslot)
    }
}
