//! Probe source abstraction for receiving latency samples.
//!
//! This module provides a trait-based abstraction for receiving latency
//! samples from various producers (sample log files, in-process channels,
//! async byte streams). Samples cross this boundary one at a time, already
//! resolved; any probing, retries, or timeouts belong to the producer.

mod channel;
mod file;
mod stream;

pub use channel::ChannelSource;
pub use file::FileSource;
pub use stream::StreamSource;

use std::fmt::Debug;

use crate::data::LatencySample;

/// Trait for receiving latency samples from various producers.
///
/// Implementations deliver samples one per `poll` call, in production
/// order. Ordering matters: the incident detector is edge-triggered and not
/// commutative, so reordering samples can change which one gets recorded as
/// a transition trigger.
///
/// # Example
///
/// ```
/// use netpulse::{FileSource, ProbeSource};
///
/// let mut source = FileSource::new("samples.jsonl");
/// if let Some(sample) = source.poll() {
///     println!("latency: {}ms", sample.latency_ms);
/// }
/// ```
pub trait ProbeSource: Send + Debug {
    /// Poll for the next sample.
    ///
    /// Returns `Some(sample)` if one is available, `None` otherwise.
    /// This method should be non-blocking.
    fn poll(&mut self) -> Option<LatencySample>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for logging and status display.
    fn description(&self) -> &str;

    /// Check if the source has encountered an error.
    ///
    /// Returns the most recent error message, if any.
    fn error(&self) -> Option<String>;
}
