//! Data models and decision logic for the latency monitor.
//!
//! ## Submodules
//!
//! - [`history`]: Bounded rolling buffer of recent samples
//! - [`monitor`]: Core types and the incident detector ([`NetworkMonitor`],
//!   [`HealthStatus`], [`Thresholds`], the pure [`classify`] transition)
//! - [`trace`]: Route-trace auxiliary state
//!
//! ## Data Flow
//!
//! ```text
//! LatencySample (one per probe)
//!        │
//!        ▼
//! NetworkMonitor::ingest()
//!        │
//!        ├──▶ LatencyHistory::push() (last 20 samples, FIFO)
//!        │
//!        └──▶ classify() ──▶ IncidentRecord (only on status transitions)
//! ```

pub mod history;
pub mod monitor;
pub mod trace;

pub use history::{LatencyHistory, MAX_HISTORY_SIZE};
pub use monitor::{
    classify, HealthStatus, IncidentKind, IncidentRecord, IngestOutcome, LatencySample,
    NetworkMonitor, Thresholds,
};
pub use trace::{RouteTrace, TraceHop};
