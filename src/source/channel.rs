//! Channel-based probe source.
//!
//! Receives latency samples via a tokio mpsc channel. This is useful for
//! embedding the monitor in a host application that resolves probes itself
//! and pushes samples in-process.
//!
//! An mpsc channel (rather than a latest-value watch channel) is required
//! here: the detector is order-sensitive and every sample must be observed
//! exactly once, so coalescing intermediate values could drop a transition.

use tokio::sync::mpsc;

use super::ProbeSource;
use crate::data::LatencySample;

/// A probe source that receives samples via an in-process channel.
///
/// The producer (e.g. an async prober awaiting round trips) sends samples
/// through the channel and this source hands them to the ingestion loop.
///
/// # Example
///
/// ```
/// use netpulse::ChannelSource;
///
/// // Create a channel pair
/// let (tx, source) = ChannelSource::create("http-probe");
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: mpsc::Receiver<LatencySample>,
    description: String,
    last_error: Option<String>,
}

impl ChannelSource {
    /// Create a new channel source.
    ///
    /// # Arguments
    ///
    /// * `receiver` - The receiving end of an mpsc channel
    /// * `source_description` - Where the samples come from
    ///   (e.g. "http-probe", "icmp:gateway")
    pub fn new(receiver: mpsc::Receiver<LatencySample>, source_description: &str) -> Self {
        let description = format!("channel: {}", source_description);
        Self {
            receiver,
            description,
            last_error: None,
        }
    }

    /// Create a channel pair for sending samples to a ChannelSource.
    ///
    /// Returns (sender, source) where the sender is handed to the sample
    /// producer and the source feeds the monitor.
    pub fn create(source_description: &str) -> (mpsc::Sender<LatencySample>, Self) {
        let (tx, rx) = mpsc::channel(64);
        let source = Self::new(rx, source_description);
        (tx, source)
    }
}

impl ProbeSource for ChannelSource {
    fn poll(&mut self) -> Option<LatencySample> {
        match self.receiver.try_recv() {
            Ok(sample) => Some(sample),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                if self.last_error.is_none() {
                    self.last_error = Some("Channel closed".to_string());
                }
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.last_error.clone()
    }
}
