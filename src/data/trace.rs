//! Route-trace request state.
//!
//! Plain request/response state for an in-flight route trace, kept as a
//! peer of the incident detector inside the monitor. No decision logic
//! lives here; the trace itself is performed by an external collaborator.

use serde::{Deserialize, Serialize};

/// One hop in a route-trace result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceHop {
    /// Position along the route, starting at 1.
    pub hop: u32,
    /// Address of the responding node.
    pub address: String,
    /// Round-trip time to this hop, if it answered.
    pub latency_ms: Option<f64>,
}

/// State of the current route-trace request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteTrace {
    /// Target host of the trace; empty when idle.
    pub host: String,
    /// Hop results from the last completed trace, if any.
    pub hops: Option<Vec<TraceHop>>,
    /// Whether a trace request is currently in flight.
    pub is_tracing: bool,
}

impl RouteTrace {
    /// Mark a trace to `host` as in flight, dropping results from any
    /// previous trace.
    pub fn begin(&mut self, host: &str) {
        self.host = host.to_string();
        self.hops = None;
        self.is_tracing = true;
    }

    /// Store the completed hop results.
    pub fn finish(&mut self, hops: Vec<TraceHop>) {
        self.hops = Some(hops);
        self.is_tracing = false;
    }

    /// Reset host, results, and the in-flight flag.
    pub fn clear(&mut self) {
        self.host.clear();
        self.hops = None;
        self.is_tracing = false;
    }
}
