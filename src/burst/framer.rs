//! # Dmrx Burst Framer
//! The symbol-level state machine that frames the dibit stream into 144-dibit bursts aligned
//! to the two-slot TDMA grid. While searching, every dibit (delayed by the second payload
//! half) feeds the soft sync matcher so that a match lines up with a complete burst in the
//! message buffer. Once synchronized, the framer stops matching and instead classifies the
//! sync field at each 144-dibit boundary through one of two per-timeslot trackers, toggling
//! between them every burst. A rotated sync match additionally commands a PLL frequency
//! correction and de-rotates the buffered burst before dispatch.

use super::message::{FramedBurst, FramerEvent};
use crate::symbol::{Dibit, DibitDelayBuffer};
use crate::sync::builtin::{
    BURST_DIBIT_LENGTH, DMR_SYMBOL_RATE, MAX_SEARCH_BIT_ERRORS, PLL_CORRECTION_180_DEGREES,
    PLL_CORRECTION_90_DEGREES, SYNC_DELAY_DIBIT_LENGTH, SYNC_DIBIT_LENGTH, SYNC_DIBIT_OFFSET,
    SYNC_LOSS_DIBIT_THRESHOLD,
};
use crate::sync::{CarrierLock, SoftSyncMatcher, SyncDetect, SyncError, SyncPattern, SyncTracker};
use std::collections::VecDeque;

/// Upstream carrier recovery loop that accepts frequency corrections when the framer detects
/// a rotated lock through a mis-lock sync variant.
pub trait PhaseLockedLoop {
    fn correct_inversion(&mut self, offset_hz: f64);
}

pub struct BurstFramer {
    /// Holds the most recent burst worth of dibits at all times.
    message_buffer: DibitDelayBuffer,
    /// Delays the matcher feed by the second payload half so a sync match coincides with a
    /// fully buffered burst.
    sync_delay_buffer: DibitDelayBuffer,
    matcher: SoftSyncMatcher,
    primary: SyncTracker,
    secondary: SyncTracker,
    current_is_primary: bool,
    synchronized: bool,
    dibit_counter: usize,
    pll: Option<Box<dyn PhaseLockedLoop>>,
    events: VecDeque<FramerEvent>,
}

impl BurstFramer {
    /// Creates a framer with the standard searching threshold of
    /// [`MAX_SEARCH_BIT_ERRORS`] sync bit errors.
    pub fn new(pll: Option<Box<dyn PhaseLockedLoop>>) -> Self {
        match Self::with_threshold(pll, MAX_SEARCH_BIT_ERRORS) {
            Ok(framer) => framer,
            Err(_) => unreachable!("builtin threshold is valid"),
        }
    }

    /// Creates a framer with a custom searching threshold (1..=24 sync bit errors).
    pub fn with_threshold(
        pll: Option<Box<dyn PhaseLockedLoop>>,
        threshold: u8,
    ) -> Result<Self, SyncError> {
        Ok(Self {
            message_buffer: DibitDelayBuffer::new(BURST_DIBIT_LENGTH),
            sync_delay_buffer: DibitDelayBuffer::new(SYNC_DELAY_DIBIT_LENGTH),
            matcher: SoftSyncMatcher::new(threshold)?,
            primary: SyncTracker::new(),
            secondary: SyncTracker::new(),
            current_is_primary: true,
            synchronized: false,
            dibit_counter: 0,
            pll,
            events: VecDeque::with_capacity(4),
        })
    }

    /// Primary dibit input. May queue up to one sync loss and one burst event.
    pub fn receive(&mut self, dibit: Dibit) {
        self.dibit_counter += 1;

        // The message buffer leads the matcher so it already contains the full burst when
        // the delayed sync field completes a match
        self.message_buffer.put(dibit);
        let delayed = self.sync_delay_buffer.get_and_put(dibit);

        if self.synchronized {
            if self.dibit_counter >= BURST_DIBIT_LENGTH {
                self.process_burst_boundary();
                self.toggle_tracker();
            }
        } else {
            if let Some(detect) = self.matcher.receive(delayed) {
                self.process_sync_detect(detect);
            }

            if self.dibit_counter > SYNC_LOSS_DIBIT_THRESHOLD {
                self.process_sync_loss(DMR_SYMBOL_RATE as usize);
            }
        }
    }

    /// Next queued event, in strict arrival order.
    pub fn pop_event(&mut self) -> Option<FramerEvent> {
        self.events.pop_front()
    }

    pub fn is_synchronized(&self) -> bool {
        self.synchronized
    }

    /// Clears buffers, counters and tracker state. Queued events are discarded.
    pub fn reset(&mut self) {
        self.message_buffer.reset();
        self.sync_delay_buffer.reset();
        self.matcher.set_register(0);
        self.primary.reset();
        self.secondary.reset();
        self.current_is_primary = true;
        self.synchronized = false;
        self.dibit_counter = 0;
        self.events.clear();
    }

    /// Classifies the burst that just completed against the current timeslot's tracker.
    fn process_burst_boundary(&mut self) {
        let sync = self
            .message_buffer
            .value(SYNC_DIBIT_OFFSET, SYNC_DIBIT_LENGTH);

        let tracker = self.current_tracker_mut();
        let tracked = tracker.track(sync);
        let (pattern, bit_errors) = (tracker.pattern(), tracker.bit_errors());
        self.update_synchronized_state();

        if tracked {
            self.dispatch(pattern, bit_errors, CarrierLock::Normal);
        } else if self.synchronized {
            // This timeslot lost sync but the other still holds it: dispatch a placeholder
            // so the receiver keeps tracking timeslot cadence
            self.dispatch(SyncPattern::Unknown, 0, CarrierLock::Normal);
        } else {
            tracing::debug!("sync lost on both timeslots, resuming search");
            self.matcher.set_register(sync);
        }
    }

    /// Handles a matcher fire: record sync on the current tracker, correct any carrier
    /// mis-lock, and dispatch the buffered burst.
    fn process_sync_detect(&mut self, detect: SyncDetect) {
        self.current_tracker_mut().set(detect.pattern, detect.bit_errors);
        self.update_synchronized_state();

        if !detect.lock.is_normal() {
            tracing::debug!(pattern = %detect.pattern, lock = %detect.lock, "carrier mis-lock detected");

            if let Some(pll) = self.pll.as_mut() {
                match detect.lock {
                    CarrierLock::Plus90 => pll.correct_inversion(-PLL_CORRECTION_90_DEGREES),
                    CarrierLock::Minus90 => pll.correct_inversion(PLL_CORRECTION_90_DEGREES),
                    CarrierLock::Inverted => pll.correct_inversion(PLL_CORRECTION_180_DEGREES),
                    CarrierLock::Normal => {}
                }
            }

            // Un-rotate the buffered burst so downstream decoders see the transmitted dibits
            let lock = detect.lock;
            self.message_buffer.map_in_place(|dibit| lock.correct(dibit));
        } else {
            tracing::debug!(pattern = %detect.pattern, bit_errors = detect.bit_errors, "sync acquired");
        }

        self.dispatch(detect.pattern, detect.bit_errors, detect.lock);
    }

    /// Queues the message buffer contents as a burst, preceded by a sync loss for any dibits
    /// beyond one burst length that went unaccounted since the previous dispatch.
    fn dispatch(&mut self, pattern: SyncPattern, bit_errors: u8, lock: CarrierLock) {
        if self.dibit_counter > BURST_DIBIT_LENGTH {
            self.process_sync_loss(self.dibit_counter - BURST_DIBIT_LENGTH);
        }

        let bits = self.message_buffer.pack_bits(0, BURST_DIBIT_LENGTH);
        self.dibit_counter = 0;
        self.events.push_back(FramerEvent::Burst(FramedBurst {
            bits,
            pattern,
            lock,
            bit_errors,
        }));
    }

    fn process_sync_loss(&mut self, dibits: usize) {
        self.dibit_counter -= dibits;
        self.events
            .push_back(FramerEvent::SyncLoss(dibits as u32 * 2));
    }

    fn current_tracker_mut(&mut self) -> &mut SyncTracker {
        if self.current_is_primary {
            &mut self.primary
        } else {
            &mut self.secondary
        }
    }

    fn toggle_tracker(&mut self) {
        self.current_is_primary = !self.current_is_primary;
    }

    /// The framer is synchronized while either timeslot tracker holds sync. Recomputed after
    /// every tracker mutation.
    fn update_synchronized_state(&mut self) {
        self.synchronized = self.primary.is_synchronized() || self.secondary.is_synchronized();
    }
}
