//! Ordered pulse scheduling
//!
//! One worker thread walks the estimate sequence in order and emits a
//! pulse event per estimate at a fixed interval. Consumers receive the
//! events over a channel; dropping the receiver or setting the stop flag
//! ends the replay early.

use crate::mapping::{FeedbackPulse, FrequencyMap};
use crossbeam_channel::{self, Receiver};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

/// One scheduled pulse, in estimate order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseEvent {
    /// Position in the estimate sequence (0-indexed)
    pub index: usize,
    /// The frequency estimate that produced this pulse, in Hz
    pub frequency_hz: f32,
    /// The resolved feedback pulse
    pub pulse: FeedbackPulse,
}

/// Replays a frequency estimate sequence as timed pulses.
pub struct PulseScheduler {
    map: FrequencyMap,
    interval: Duration,
}

impl PulseScheduler {
    /// Create a scheduler over the given band map with a fixed
    /// inter-pulse interval.
    pub fn new(map: FrequencyMap, interval: Duration) -> Self {
        Self { map, interval }
    }

    /// Resolve the whole sequence without any timing.
    ///
    /// Useful for tests and for callers that do their own pacing.
    pub fn resolve_all(&self, estimates: &[f32]) -> Vec<PulseEvent> {
        estimates
            .iter()
            .enumerate()
            .map(|(index, &frequency_hz)| PulseEvent {
                index,
                frequency_hz,
                pulse: self.map.resolve(frequency_hz),
            })
            .collect()
    }

    /// Start the replay on a worker thread.
    ///
    /// Events arrive on the returned receiver, one per estimate in input
    /// order, spaced by the configured interval (the first fires
    /// immediately). The replay stops early if the stop flag is set or
    /// every receiver is dropped.
    pub fn run_async(
        &self,
        estimates: Vec<f32>,
        stop: Arc<AtomicBool>,
    ) -> (Receiver<PulseEvent>, JoinHandle<()>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let events = self.resolve_all(&estimates);
        let interval = self.interval;

        let handle = thread::spawn(move || {
            for event in events {
                if stop.load(Ordering::Relaxed) {
                    debug!(delivered = event.index, "pulse replay stopped");
                    break;
                }
                if event.index > 0 {
                    thread::sleep(interval);
                }
                if tx.send(event).is_err() {
                    // Receiver gone, nobody is listening anymore
                    break;
                }
            }
        });

        (rx, handle)
    }
}
