//! Session host wiring a probe source to the monitor.

use anyhow::Result;
use tracing::{info, warn};

use crate::data::{IncidentKind, NetworkMonitor, Thresholds};
use crate::source::ProbeSource;

/// Owns one probe source and one monitor for the lifetime of a session.
///
/// The host drains the source and feeds every sample to the monitor in
/// arrival order, logging each status transition. Observers read monitor
/// state between calls; updates are synchronous, so no partially applied
/// sample is ever visible.
pub struct App {
    pub running: bool,

    source: Box<dyn ProbeSource>,
    pub monitor: NetworkMonitor,
    pub load_error: Option<String>,
}

impl App {
    /// Create a new App with the given probe source and thresholds.
    pub fn new(source: Box<dyn ProbeSource>, thresholds: Thresholds) -> Self {
        Self {
            running: true,
            source,
            monitor: NetworkMonitor::new(thresholds),
            load_error: None,
        }
    }

    /// Returns a description of the current probe source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Drain the probe source and ingest every pending sample.
    ///
    /// Returns the number of samples ingested. Source-level errors are
    /// recorded in `load_error` rather than failing the call; a stale error
    /// is cleared once the source recovers.
    pub fn reload_data(&mut self) -> Result<usize> {
        let mut ingested = 0;

        while let Some(sample) = self.source.poll() {
            let outcome = self.monitor.ingest(sample);
            if let Some(record) = outcome.record {
                match record.kind {
                    IncidentKind::Issue { is_outage } => {
                        warn!(
                            id = record.id,
                            value = record.value,
                            is_outage,
                            "latency issue opened"
                        );
                    }
                    IncidentKind::Recovery => {
                        info!(id = record.id, value = record.value, "latency recovered");
                    }
                }
            }
            ingested += 1;
        }

        self.load_error = self.source.error();
        Ok(ingested)
    }

    /// Empty the incident log, leaving status and history untouched.
    pub fn clear_incident_log(&mut self) {
        self.monitor.clear_incident_log();
    }

    /// Signal the session to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }
}
