//! # netpulse
//!
//! A latency monitor and incident detector, usable as a library or through
//! the `netpulse` CLI.
//!
//! netpulse consumes a stream of round-trip latency samples and turns it
//! into three things: a bounded rolling history (the last 20 samples), a
//! current health status (`ok` or `issue`), and a discrete incident log.
//! Detection is hysteresis-based and edge-triggered: a record is written
//! only when a sample crosses the issue boundary, so a noisy stream of bad
//! readings produces one issue record per episode, not one per sample.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Session                           │
//! │  ┌─────────┐      ┌──────────────────────────────────┐   │
//! │  │  app    │─────▶│ data: NetworkMonitor             │   │
//! │  │ (host)  │      │   ├── LatencyHistory (≤20, FIFO) │   │
//! │  └────┬────┘      │   ├── classify() ─▶ IncidentLog  │   │
//! │       │           │   └── RouteTrace                 │   │
//! │       ▼           └──────────────────────────────────┘   │
//! │  ┌─────────┐                                             │
//! │  │ source  │◀── FileSource | StreamSource | ChannelSource│
//! │  │ (input) │                                             │
//! │  └─────────┘                                             │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Session host draining a probe source into the monitor
//! - **[`source`]**: Probe source abstraction ([`ProbeSource`] trait) with
//!   implementations for sample-log tailing, async byte streams, and
//!   in-process channels
//! - **[`data`]**: The decision core - bounded history, the pure
//!   [`classify`] transition function, the [`NetworkMonitor`] container,
//!   and route-trace auxiliary state
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Tail a JSON-lines sample log
//! netpulse --file samples.jsonl
//!
//! # Replay samples from stdin and print a report
//! netpulse --stdin --once < samples.jsonl
//! ```
//!
//! ### As a library
//!
//! ```
//! use chrono::Utc;
//! use netpulse::{LatencySample, NetworkMonitor, Thresholds};
//!
//! let mut monitor = NetworkMonitor::new(Thresholds::default());
//! let outcome = monitor.ingest(LatencySample::new(Utc::now(), 150.0));
//! assert!(outcome.record.is_some()); // 150ms crossed the issue boundary
//! ```
//!
//! ### With an in-process probe
//!
//! ```
//! use netpulse::{App, ChannelSource, Thresholds};
//!
//! let (tx, source) = ChannelSource::create("http-probe");
//! let app = App::new(Box::new(source), Thresholds::default());
//! ```

pub mod app;
pub mod data;
pub mod source;

// Re-export main types for convenience
pub use app::App;
pub use data::{
    classify, HealthStatus, IncidentKind, IncidentRecord, IngestOutcome, LatencyHistory,
    LatencySample, NetworkMonitor, RouteTrace, Thresholds, TraceHop, MAX_HISTORY_SIZE,
};
pub use source::{ChannelSource, FileSource, ProbeSource, StreamSource};
