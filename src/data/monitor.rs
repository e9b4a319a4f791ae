//! Latency classification and incident detection.
//!
//! This module turns a stream of latency samples into health status and a
//! discrete incident log. Detection is edge-triggered: a record is created
//! only when a sample crosses the issue boundary, never for every bad
//! sample, so the log represents episodes rather than raw readings.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::history::LatencyHistory;
use super::trace::{RouteTrace, TraceHop};

/// Thresholds for latency classification.
///
/// These determine when a link is considered degraded and when a degradation
/// is severe enough to count as an outage.
#[derive(Debug, Clone)]
pub struct Thresholds {
    /// Latency strictly above this (milliseconds) is "bad".
    pub issue_ms: f64,
    /// Latency at or above this marks the opening issue record as an outage.
    pub outage_ms: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            issue_ms: 100.0,
            outage_ms: 500.0,
        }
    }
}

/// A single round-trip latency measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencySample {
    /// When the measurement was taken.
    pub time: DateTime<Utc>,
    /// Measured round-trip latency in milliseconds. Expected non-negative;
    /// a negative value from a trusted probe is accepted verbatim.
    pub latency_ms: f64,
}

impl LatencySample {
    pub fn new(time: DateTime<Utc>, latency_ms: f64) -> Self {
        Self { time, latency_ms }
    }
}

/// Current link health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Issue,
}

impl HealthStatus {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            HealthStatus::Ok => "OK",
            HealthStatus::Issue => "ISSUE",
        }
    }
}

/// The kind of transition an incident record marks.
///
/// The outage flag lives on the `Issue` variant only, so a recovery record
/// cannot carry one by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum IncidentKind {
    /// Entry into degraded health. The outage flag is computed from the
    /// sample that triggered the transition and is not re-evaluated while
    /// the episode lasts.
    Issue { is_outage: bool },
    /// Return to healthy.
    Recovery,
}

/// One entry in the incident log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRecord {
    /// Unique id, assigned from a monotonic counter. Stable across rapid
    /// successive transitions, unlike a wall-clock id.
    pub id: u64,
    #[serde(flatten)]
    pub kind: IncidentKind,
    /// Timestamp of the sample that triggered the transition.
    pub time: DateTime<Utc>,
    /// Latency of the triggering sample, in milliseconds.
    pub value: f64,
}

impl IncidentRecord {
    /// True for issue records whose triggering latency reached the outage
    /// threshold.
    pub fn is_outage(&self) -> bool {
        matches!(self.kind, IncidentKind::Issue { is_outage: true })
    }
}

/// Decide whether a sample causes a status transition.
///
/// Pure function of the current status and the sample's latency. Returns the
/// kind of incident to record, or `None` when the status is unchanged
/// (steady healthy and steady unhealthy samples record nothing).
pub fn classify(
    status: HealthStatus,
    latency_ms: f64,
    thresholds: &Thresholds,
) -> Option<IncidentKind> {
    let is_bad = latency_ms > thresholds.issue_ms;
    match (status, is_bad) {
        (HealthStatus::Ok, true) => Some(IncidentKind::Issue {
            is_outage: latency_ms >= thresholds.outage_ms,
        }),
        (HealthStatus::Issue, false) => Some(IncidentKind::Recovery),
        _ => None,
    }
}

/// Result of ingesting one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestOutcome {
    /// Health status after the sample was applied.
    pub status: HealthStatus,
    /// The record appended to the log, if the sample crossed a boundary.
    pub record: Option<IncidentRecord>,
}

/// Process-wide monitoring state: rolling history, health status, incident
/// log, and the route-trace sidecar.
///
/// All mutation goes through the named operations; readers get borrows, so
/// the boundedness and edge-trigger invariants cannot be broken externally.
#[derive(Debug, Clone)]
pub struct NetworkMonitor {
    thresholds: Thresholds,
    history: LatencyHistory,
    status: HealthStatus,
    incidents: VecDeque<IncidentRecord>,
    trace: RouteTrace,
    next_id: u64,
}

impl Default for NetworkMonitor {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}

impl NetworkMonitor {
    /// Create a monitor with empty history, empty log, and status `Ok`.
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            history: LatencyHistory::new(),
            status: HealthStatus::Ok,
            incidents: VecDeque::new(),
            trace: RouteTrace::default(),
            next_id: 1,
        }
    }

    /// Apply one sample to the history buffer and the incident detector in a
    /// single logical step. This is the only mutator of health state.
    ///
    /// Samples must be ingested in production order; the detector is not
    /// commutative. A non-finite latency is a caller contract violation.
    pub fn ingest(&mut self, sample: LatencySample) -> IngestOutcome {
        debug_assert!(
            sample.latency_ms.is_finite(),
            "latency must be a finite number"
        );

        let record = classify(self.status, sample.latency_ms, &self.thresholds).map(|kind| {
            let record = IncidentRecord {
                id: self.next_id,
                kind,
                time: sample.time,
                value: sample.latency_ms,
            };
            self.next_id += 1;
            self.status = match kind {
                IncidentKind::Issue { .. } => HealthStatus::Issue,
                IncidentKind::Recovery => HealthStatus::Ok,
            };
            self.incidents.push_front(record.clone());
            record
        });

        self.history.push(sample);

        IngestOutcome {
            status: self.status,
            record,
        }
    }

    /// Current health status.
    pub fn status(&self) -> HealthStatus {
        self.status
    }

    /// Rolling history of the most recent samples, arrival order.
    pub fn history(&self) -> &LatencyHistory {
        &self.history
    }

    /// Incident log, newest first.
    pub fn incident_log(&self) -> &VecDeque<IncidentRecord> {
        &self.incidents
    }

    /// The thresholds this monitor classifies with.
    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Empty the incident log. Status and history are left unchanged.
    pub fn clear_incident_log(&mut self) {
        self.incidents.clear();
    }

    /// Route-trace sidecar state.
    pub fn trace(&self) -> &RouteTrace {
        &self.trace
    }

    /// Mark a route trace to `host` as in flight, dropping stale results.
    pub fn begin_trace(&mut self, host: &str) {
        self.trace.begin(host);
    }

    /// Store the hop results for the in-flight trace.
    pub fn finish_trace(&mut self, hops: Vec<TraceHop>) {
        self.trace.finish(hops);
    }

    /// Reset the route-trace state to empty.
    pub fn clear_trace(&mut self) {
        self.trace.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn sample(secs: i64, latency_ms: f64) -> LatencySample {
        LatencySample::new(at(secs), latency_ms)
    }

    #[test]
    fn test_classify_ok_with_good_sample_is_steady() {
        let t = Thresholds::default();
        assert_eq!(classify(HealthStatus::Ok, 20.0, &t), None);
        assert_eq!(classify(HealthStatus::Ok, 100.0, &t), None); // strictly greater
    }

    #[test]
    fn test_classify_ok_with_bad_sample_opens_issue() {
        let t = Thresholds::default();
        assert_eq!(
            classify(HealthStatus::Ok, 150.0, &t),
            Some(IncidentKind::Issue { is_outage: false })
        );
        assert_eq!(
            classify(HealthStatus::Ok, 100.01, &t),
            Some(IncidentKind::Issue { is_outage: false })
        );
    }

    #[test]
    fn test_classify_outage_at_threshold_boundary() {
        let t = Thresholds::default();
        assert_eq!(
            classify(HealthStatus::Ok, 500.0, &t),
            Some(IncidentKind::Issue { is_outage: true })
        );
        assert_eq!(
            classify(HealthStatus::Ok, 499.9, &t),
            Some(IncidentKind::Issue { is_outage: false })
        );
        assert_eq!(
            classify(HealthStatus::Ok, 1200.0, &t),
            Some(IncidentKind::Issue { is_outage: true })
        );
    }

    #[test]
    fn test_classify_issue_with_bad_sample_is_steady() {
        let t = Thresholds::default();
        assert_eq!(classify(HealthStatus::Issue, 150.0, &t), None);
        assert_eq!(classify(HealthStatus::Issue, 600.0, &t), None);
    }

    #[test]
    fn test_classify_issue_with_good_sample_recovers() {
        let t = Thresholds::default();
        assert_eq!(classify(HealthStatus::Issue, 80.0, &t), Some(IncidentKind::Recovery));
        assert_eq!(classify(HealthStatus::Issue, 100.0, &t), Some(IncidentKind::Recovery));
    }

    #[test]
    fn test_classify_negative_latency_is_not_bad() {
        let t = Thresholds::default();
        assert_eq!(classify(HealthStatus::Ok, -5.0, &t), None);
        assert_eq!(classify(HealthStatus::Issue, -5.0, &t), Some(IncidentKind::Recovery));
    }

    #[test]
    fn test_custom_thresholds() {
        let t = Thresholds {
            issue_ms: 50.0,
            outage_ms: 200.0,
        };
        assert_eq!(
            classify(HealthStatus::Ok, 60.0, &t),
            Some(IncidentKind::Issue { is_outage: false })
        );
        assert_eq!(
            classify(HealthStatus::Ok, 200.0, &t),
            Some(IncidentKind::Issue { is_outage: true })
        );
    }

    #[test]
    fn test_new_monitor_is_empty_and_ok() {
        let monitor = NetworkMonitor::default();
        assert_eq!(monitor.status(), HealthStatus::Ok);
        assert!(monitor.history().is_empty());
        assert!(monitor.incident_log().is_empty());
        assert_eq!(monitor.trace(), &RouteTrace::default());
    }

    #[test]
    fn test_good_sample_leaves_log_empty() {
        let mut monitor = NetworkMonitor::default();
        let outcome = monitor.ingest(sample(1, 20.0));

        assert_eq!(outcome.status, HealthStatus::Ok);
        assert!(outcome.record.is_none());
        assert!(monitor.incident_log().is_empty());
        assert_eq!(monitor.history().len(), 1);
        assert_eq!(monitor.history().latest().unwrap().latency_ms, 20.0);
    }

    #[test]
    fn test_bad_sample_opens_issue() {
        let mut monitor = NetworkMonitor::default();
        monitor.ingest(sample(1, 20.0));
        let outcome = monitor.ingest(sample(2, 150.0));

        assert_eq!(outcome.status, HealthStatus::Issue);
        let record = outcome.record.unwrap();
        assert_eq!(record.kind, IncidentKind::Issue { is_outage: false });
        assert_eq!(record.value, 150.0);
        assert_eq!(record.time, at(2));
        assert_eq!(monitor.incident_log().len(), 1);
    }

    #[test]
    fn test_continuing_bad_samples_record_nothing() {
        let mut monitor = NetworkMonitor::default();
        monitor.ingest(sample(1, 20.0));
        monitor.ingest(sample(2, 150.0));
        let outcome = monitor.ingest(sample(3, 600.0));

        assert_eq!(outcome.status, HealthStatus::Issue);
        assert!(outcome.record.is_none());
        assert_eq!(monitor.incident_log().len(), 1);
    }

    #[test]
    fn test_recovery_prepends_to_log() {
        let mut monitor = NetworkMonitor::default();
        monitor.ingest(sample(1, 20.0));
        monitor.ingest(sample(2, 150.0));
        monitor.ingest(sample(3, 600.0));
        let outcome = monitor.ingest(sample(4, 80.0));

        assert_eq!(outcome.status, HealthStatus::Ok);
        let log = monitor.incident_log();
        assert_eq!(log.len(), 2);
        // Newest first.
        assert_eq!(log[0].kind, IncidentKind::Recovery);
        assert_eq!(log[0].value, 80.0);
        assert_eq!(log[1].kind, IncidentKind::Issue { is_outage: false });
        assert_eq!(log[1].value, 150.0);
    }

    #[test]
    fn test_outage_flag_not_upgraded_within_episode() {
        // A sample worsening past the outage threshold while already in
        // Issue must not rewrite the opening record.
        let mut monitor = NetworkMonitor::default();
        monitor.ingest(sample(1, 150.0));
        monitor.ingest(sample(2, 900.0));

        let log = monitor.incident_log();
        assert_eq!(log.len(), 1);
        assert!(!log[0].is_outage());
    }

    #[test]
    fn test_outage_flag_set_at_entry() {
        let mut monitor = NetworkMonitor::default();
        monitor.ingest(sample(1, 750.0));

        let log = monitor.incident_log();
        assert_eq!(log.len(), 1);
        assert!(log[0].is_outage());
    }

    #[test]
    fn test_healthy_streak_is_idempotent() {
        let mut monitor = NetworkMonitor::default();
        monitor.ingest(sample(1, 150.0));
        monitor.ingest(sample(2, 50.0));
        let log_len = monitor.incident_log().len();

        for i in 3..40 {
            let outcome = monitor.ingest(sample(i, 50.0));
            assert_eq!(outcome.status, HealthStatus::Ok);
            assert!(outcome.record.is_none());
        }
        assert_eq!(monitor.incident_log().len(), log_len);
    }

    #[test]
    fn test_history_bounded_to_last_twenty() {
        let mut monitor = NetworkMonitor::default();
        for i in 1..=25 {
            monitor.ingest(sample(i, i as f64));
        }

        assert_eq!(monitor.history().len(), 20);
        let latencies: Vec<f64> = monitor.history().iter().map(|s| s.latency_ms).collect();
        let expected: Vec<f64> = (6..=25).map(|i| i as f64).collect();
        assert_eq!(latencies, expected);
    }

    #[test]
    fn test_log_kinds_alternate() {
        let mut monitor = NetworkMonitor::default();
        let latencies = [20.0, 150.0, 600.0, 80.0, 90.0, 501.0, 30.0, 110.0];
        for (i, &latency) in latencies.iter().enumerate() {
            monitor.ingest(sample(i as i64, latency));
        }

        // Transitions: 150 opens, 80 recovers, 501 opens, 30 recovers, 110 opens.
        let log = monitor.incident_log();
        assert_eq!(log.len(), 5);
        let records: Vec<_> = log.iter().collect();
        for pair in records.windows(2) {
            let same_kind = matches!(
                (&pair[0].kind, &pair[1].kind),
                (IncidentKind::Issue { .. }, IncidentKind::Issue { .. })
                    | (IncidentKind::Recovery, IncidentKind::Recovery)
            );
            assert!(!same_kind, "consecutive records must alternate kinds");
        }
    }

    #[test]
    fn test_record_ids_unique_and_increasing() {
        let mut monitor = NetworkMonitor::default();
        for i in 0..10 {
            // Alternate bad/good so every sample transitions.
            let latency = if i % 2 == 0 { 200.0 } else { 50.0 };
            monitor.ingest(sample(i, latency));
        }

        let ids: Vec<u64> = monitor.incident_log().iter().map(|r| r.id).collect();
        // Newest first, so ids descend.
        for pair in ids.windows(2) {
            assert!(pair[0] > pair[1]);
        }
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn test_clear_incident_log_keeps_status_and_history() {
        let mut monitor = NetworkMonitor::default();
        monitor.ingest(sample(1, 20.0));
        monitor.ingest(sample(2, 150.0));

        monitor.clear_incident_log();

        assert!(monitor.incident_log().is_empty());
        assert_eq!(monitor.status(), HealthStatus::Issue);
        assert_eq!(monitor.history().len(), 2);
    }

    #[test]
    fn test_recovery_after_cleared_log_still_records() {
        let mut monitor = NetworkMonitor::default();
        monitor.ingest(sample(1, 150.0));
        monitor.clear_incident_log();
        monitor.ingest(sample(2, 40.0));

        let log = monitor.incident_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].kind, IncidentKind::Recovery);
        assert_eq!(monitor.status(), HealthStatus::Ok);
    }

    #[test]
    fn test_trace_lifecycle() {
        let mut monitor = NetworkMonitor::default();
        monitor.begin_trace("backbone.example.net");
        assert!(monitor.trace().is_tracing);
        assert_eq!(monitor.trace().host, "backbone.example.net");

        monitor.finish_trace(vec![TraceHop {
            hop: 1,
            address: "10.0.0.1".to_string(),
            latency_ms: Some(0.4),
        }]);
        assert!(!monitor.trace().is_tracing);
        assert_eq!(monitor.trace().hops.as_ref().unwrap().len(), 1);

        monitor.clear_trace();
        assert_eq!(monitor.trace(), &RouteTrace::default());
    }

    #[test]
    fn test_clear_trace_leaves_detector_alone() {
        let mut monitor = NetworkMonitor::default();
        monitor.ingest(sample(1, 150.0));
        monitor.begin_trace("example.net");

        monitor.clear_trace();

        assert_eq!(monitor.status(), HealthStatus::Issue);
        assert_eq!(monitor.incident_log().len(), 1);
        assert_eq!(monitor.history().len(), 1);
    }

    #[test]
    fn test_record_serializes_with_flattened_kind() {
        let record = IncidentRecord {
            id: 3,
            kind: IncidentKind::Issue { is_outage: true },
            time: at(0),
            value: 750.0,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "issue");
        assert_eq!(json["is_outage"], true);
        assert_eq!(json["value"], 750.0);
        assert_eq!(json["id"], 3);

        let recovery = IncidentRecord {
            id: 4,
            kind: IncidentKind::Recovery,
            time: at(1),
            value: 30.0,
        };
        let json = serde_json::to_value(&recovery).unwrap();
        assert_eq!(json["kind"], "recovery");
        assert!(json.get("is_outage").is_none());
    }

    #[test]
    fn test_sample_round_trips_through_json() {
        let json = r#"{"time":"2026-08-30T12:00:00Z","latency_ms":42.5}"#;
        let parsed: LatencySample = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.latency_ms, 42.5);

        let back = serde_json::to_string(&parsed).unwrap();
        let reparsed: LatencySample = serde_json::from_str(&back).unwrap();
        assert_eq!(parsed, reparsed);
    }
}
