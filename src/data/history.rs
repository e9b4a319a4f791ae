//! Bounded rolling history of latency samples.

use std::collections::VecDeque;

use super::monitor::LatencySample;

/// Maximum number of samples retained in the rolling history.
pub const MAX_HISTORY_SIZE: usize = 20;

/// Rolling buffer of the most recent latency samples, in arrival order.
///
/// Oldest samples are evicted FIFO once the buffer is full, so the buffer
/// always holds the last [`MAX_HISTORY_SIZE`] measurements and always ends
/// with the sample pushed most recently.
#[derive(Debug, Clone)]
pub struct LatencyHistory {
    samples: VecDeque<LatencySample>,
}

impl Default for LatencyHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl LatencyHistory {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    /// Append a sample, evicting from the front past capacity.
    ///
    /// Total operation; cannot fail.
    pub fn push(&mut self, sample: LatencySample) {
        self.samples.push_back(sample);
        while self.samples.len() > MAX_HISTORY_SIZE {
            self.samples.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The most recently pushed sample.
    pub fn latest(&self) -> Option<&LatencySample> {
        self.samples.back()
    }

    /// Iterate samples oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &LatencySample> {
        self.samples.iter()
    }

    /// Buffered latencies normalized to 0-7 for 8-level bar display.
    ///
    /// Returns an empty Vec if there's not enough history.
    pub fn sparkline(&self) -> Vec<u8> {
        if self.samples.len() < 2 {
            return Vec::new();
        }

        let values: Vec<f64> = self.samples.iter().map(|s| s.latency_ms).collect();
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let range = (max - min).max(f64::EPSILON);

        values
            .iter()
            .map(|&v| {
                let normalized = ((v - min) / range * 7.0) as u8;
                normalized.min(7)
            })
            .collect()
    }

    /// Latency change rate (ms per second) over the latest interval.
    ///
    /// Returns None if there's not enough history, or if the last two
    /// samples share a timestamp.
    pub fn latest_rate(&self) -> Option<f64> {
        let len = self.samples.len();
        if len < 2 {
            return None;
        }

        let current = self.samples.get(len - 1)?;
        let previous = self.samples.get(len - 2)?;
        let elapsed = (current.time - previous.time).num_milliseconds() as f64 / 1000.0;

        if elapsed > 0.0 {
            Some((current.latency_ms - previous.latency_ms) / elapsed)
        } else {
            None
        }
    }
}
