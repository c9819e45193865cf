//! # Dmrx Message Framer
//! The inbound edge of the framing pipeline. Accepts dibits one at a time or byte-packed
//! four to a byte alongside a wall-clock hint, drives the burst framer, and finishes each
//! framed burst with a timeslot and timestamp before handing it to the registered listener.
//!
//! Timeslot assignment prefers ground truth over inference: a valid CACH names the timeslot
//! outright, a direct mode sync word embeds it, and everything else toggles the last known
//! timeslot to ride the TDMA alternation.

use super::cach::Cach;
use super::framer::{BurstFramer, PhaseLockedLoop};
use super::message::{Burst, BurstListener, FramedBurst, FramerEvent, SyncLoss};
use crate::symbol::Dibit;
use crate::sync::builtin::CACH_DIBIT_LENGTH;
use crate::sync::SyncPattern;
use crate::timebase::TimebaseTracker;

pub struct MessageFramer<L: BurstListener> {
    framer: BurstFramer,
    listener: L,
    timebase: TimebaseTracker,
    timeslot0: bool,
}

impl<L: BurstListener> MessageFramer<L> {
    pub fn new(listener: L) -> Self {
        Self::build(listener, None)
    }

    /// Creates a framer that forwards carrier mis-lock corrections to `pll`.
    pub fn with_pll(listener: L, pll: Box<dyn PhaseLockedLoop>) -> Self {
        Self::build(listener, Some(pll))
    }

    fn build(listener: L, pll: Option<Box<dyn PhaseLockedLoop>>) -> Self {
        Self {
            framer: BurstFramer::new(pll),
            listener,
            timebase: TimebaseTracker::new(),
            // Seeded so the first toggled burst lands on timeslot 0
            timeslot0: false,
        }
    }

    /// Primary dibit input.
    pub fn receive(&mut self, dibit: Dibit) {
        self.framer.receive(dibit);
        self.drain();
    }

    /// Byte-packed dibit input. The buffer timestamp anchors the timebase; each byte unpacks
    /// big-endian into four dibits.
    pub fn receive_buffer(&mut self, bytes: &[u8], timestamp_ms: u64) {
        self.timebase.set(timestamp_ms);
        for &byte in bytes {
            for dibit in Dibit::unpack(byte) {
                self.receive(dibit);
            }
        }
    }

    pub fn is_synchronized(&self) -> bool {
        self.framer.is_synchronized()
    }

    /// Clears framing state. The listener registration and timebase anchor survive.
    pub fn reset(&mut self) {
        self.framer.reset();
        self.timeslot0 = false;
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn into_listener(self) -> L {
        self.listener
    }

    fn drain(&mut self) {
        while let Some(event) = self.framer.pop_event() {
            match event {
                FramerEvent::Burst(frame) => self.dispatch_burst(frame),
                FramerEvent::SyncLoss(bits) => {
                    self.timebase.advance(bits);
                    self.listener.sync_loss(SyncLoss {
                        bits,
                        timestamp_ms: self.timebase.now(),
                    });
                }
            }
        }
    }

    fn dispatch_burst(&mut self, frame: FramedBurst) {
        let cach = frame
            .pattern
            .has_cach()
            .then(|| Cach::decode(&frame.bits[..CACH_DIBIT_LENGTH * 2]));
        let timeslot = self.assign_timeslot(frame.pattern, cach.as_ref());

        self.listener.burst(Burst {
            bits: frame.bits,
            pattern: frame.pattern,
            lock: frame.lock,
            bit_errors: frame.bit_errors,
            timeslot,
            timestamp_ms: self.timebase.now(),
            corrected_bits: frame.bit_errors as u16,
        });
    }

    fn assign_timeslot(&mut self, pattern: SyncPattern, cach: Option<&Cach>) -> u8 {
        if let Some(cach) = cach {
            if cach.is_valid() {
                self.timeslot0 = cach.is_timeslot0();
                return cach.timeslot();
            }
        }

        match pattern.direct_timeslot() {
            Some(timeslot) => {
                self.timeslot0 = timeslot == 0;
                timeslot
            }
            None => {
                self.timeslot0 = !self.timeslot0;
                if self.timeslot0 {
                    0
                } else {
                    1
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::builtin::BURST_DIBIT_LENGTH;
    use crate::sync::CarrierLock;

    #[derive(Default)]
    struct Recorder {
        bursts: Vec<Burst>,
        losses: Vec<SyncLoss>,
    }

    impl BurstListener for Recorder {
        fn burst(&mut self, burst: Burst) {
            self.bursts.push(burst);
        }

        fn sync_loss(&mut self, loss: SyncLoss) {
            self.losses.push(loss);
        }
    }

    const BS_DATA: u64 = 0xDFF5_7D75_DF5D;
    const BS_VOICE: u64 = 0x755F_D7DF_75F7;
    const MS_DATA: u64 = 0xD5D7_F77F_D757;
    const DM_DATA_TS1: u64 = 0xD755_7F5F_F7F5;

    fn dibits_of(value: u64) -> Vec<Dibit> {
        (0..24)
            .map(|index| Dibit::from_value((value >> (46 - index * 2)) as u8))
            .collect()
    }

    fn burst_with_sync(sync: u64) -> Vec<Dibit> {
        let mut dibits = vec![Dibit::D00; BURST_DIBIT_LENGTH];
        dibits[66..90].copy_from_slice(&dibits_of(sync));
        dibits
    }

    fn feed(framer: &mut MessageFramer<Recorder>, dibits: &[Dibit]) {
        for &dibit in dibits {
            framer.receive(dibit);
        }
    }

    #[test]
    fn test_timeslot_toggles_without_cach_or_direct_mode() {
        let mut framer = MessageFramer::new(Recorder::default());
        let mut input = burst_with_sync(MS_DATA);
        input.extend(burst_with_sync(MS_DATA));
        input.extend(burst_with_sync(DM_DATA_TS1));
        input.extend(burst_with_sync(MS_DATA));
        feed(&mut framer, &input);

        let slots: Vec<u8> = framer
            .listener()
            .bursts
            .iter()
            .map(|burst| burst.timeslot)
            .collect();
        // Two toggles, a direct mode override, then a toggle off the override
        assert_eq!(slots, vec![0, 1, 1, 0]);
    }

    #[test]
    fn test_valid_cach_overrides_timeslot() {
        // An all-zero CACH is the zero Hamming codeword: valid, timeslot 0
        let mut framer = MessageFramer::new(Recorder::default());
        let mut input = burst_with_sync(BS_DATA);
        input.extend(burst_with_sync(BS_DATA));
        feed(&mut framer, &input);

        let slots: Vec<u8> = framer
            .listener()
            .bursts
            .iter()
            .map(|burst| burst.timeslot)
            .collect();
        assert_eq!(slots, vec![0, 0]);
    }

    #[test]
    fn test_corrupt_cach_falls_back_to_toggle() {
        let mut framer = MessageFramer::new(Recorder::default());
        let mut first = burst_with_sync(BS_DATA);
        // A lone one-dibit at a TACT position breaks the Hamming parity
        first[0] = Dibit::D11;
        let mut input = first;
        input.extend(burst_with_sync(MS_DATA));
        feed(&mut framer, &input);

        let bursts = &framer.listener().bursts;
        assert_eq!(bursts[0].pattern, SyncPattern::BaseStationData);
        assert_eq!(bursts[0].timeslot, 0);
        assert_eq!(bursts[1].timeslot, 1);
    }

    #[test]
    fn test_voice_superframe_tracks_through_syncless_frames() {
        // Slot A carries a voice superframe, slot B carries data bursts with real sync.
        // After the framer converges, the A-slot tracker predicts frames B-F in order.
        let mut framer = MessageFramer::new(Recorder::default());

        let mut input = burst_with_sync(MS_DATA); // A: acquires
        input.extend(burst_with_sync(MS_DATA)); // B
        input.extend(burst_with_sync(BS_VOICE)); // A: superframe frame A
        for _ in 0..5 {
            input.extend(burst_with_sync(MS_DATA)); // B
            input.extend(vec![Dibit::D00; BURST_DIBIT_LENGTH]); // A: no transmitted sync
        }
        feed(&mut framer, &input);

        let patterns: Vec<SyncPattern> = framer
            .listener()
            .bursts
            .iter()
            .map(|burst| burst.pattern)
            .collect();
        let slot_a: Vec<SyncPattern> = patterns.iter().copied().step_by(2).collect();
        assert_eq!(
            slot_a,
            vec![
                SyncPattern::MobileStationData,
                SyncPattern::BaseStationVoice,
                SyncPattern::BsVoiceFrameB,
                SyncPattern::BsVoiceFrameC,
                SyncPattern::BsVoiceFrameD,
                SyncPattern::BsVoiceFrameE,
                SyncPattern::BsVoiceFrameF,
            ]
        );
        assert!(patterns
            .iter()
            .skip(1)
            .step_by(2)
            .all(|&pattern| pattern == SyncPattern::MobileStationData));
        assert!(framer
            .listener()
            .bursts
            .iter()
            .all(|burst| burst.bit_errors == 0));
    }

    #[test]
    fn test_byte_ingest_anchors_timestamps() {
        let mut framer = MessageFramer::new(Recorder::default());

        // 200 zero dibits then a clean burst, packed four dibits per byte
        let mut dibits = vec![Dibit::D00; 200];
        dibits.extend(burst_with_sync(BS_DATA));
        let bytes: Vec<u8> = dibits
            .chunks(4)
            .map(|chunk| {
                chunk
                    .iter()
                    .fold(0u8, |acc, dibit| (acc << 2) | dibit.value())
            })
            .collect();

        framer.receive_buffer(&bytes, 10_000);

        let recorder = framer.listener();
        // 400 bits of sync loss advance the timebase by 400/9600 s ≈ 42 ms
        assert_eq!(recorder.losses.len(), 1);
        assert_eq!(recorder.losses[0].bits, 400);
        assert_eq!(recorder.losses[0].timestamp_ms, 10_042);
        assert_eq!(recorder.bursts.len(), 1);
        assert_eq!(recorder.bursts[0].timestamp_ms, 10_042);
        assert_eq!(recorder.bursts[0].pattern, SyncPattern::BaseStationData);
        assert_eq!(recorder.bursts[0].sync_field(), BS_DATA);
        assert_eq!(recorder.bursts[0].lock, CarrierLock::Normal);
        assert_eq!(recorder.bursts[0].bytes().len(), 36);
    }

    #[test]
    fn test_dibit_conservation_through_listener() {
        let mut framer = MessageFramer::new(Recorder::default());
        let mut input = vec![Dibit::D00; 500];
        input.extend(burst_with_sync(MS_DATA));
        input.extend(burst_with_sync(MS_DATA));
        feed(&mut framer, &input);

        let recorder = framer.listener();
        let burst_dibits = recorder.bursts.len() * BURST_DIBIT_LENGTH;
        let loss_dibits: u32 = recorder.losses.iter().map(|loss| loss.bits / 2).sum();
        assert_eq!(burst_dibits + loss_dibits as usize, input.len());
    }

    #[test]
    fn test_reset_keeps_listener() {
        let mut framer = MessageFramer::new(Recorder::default());
        feed(&mut framer, &burst_with_sync(MS_DATA));
        assert_eq!(framer.listener().bursts.len(), 1);

        framer.reset();
        assert!(!framer.is_synchronized());

        feed(&mut framer, &burst_with_sync(MS_DATA));
        assert_eq!(framer.listener().bursts.len(), 2);
    }
}
