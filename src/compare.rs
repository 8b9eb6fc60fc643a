//! Historical comparison between two normalized snapshots. Alerts are
//! produced fresh per call and never stored here; the caller decides what to
//! do with them.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::normalize::NormalizedRecord;

const SPIKE_PCT_WARNING: f64 = 50.0;
const SPIKE_PCT_CRITICAL: f64 = 100.0;
const SCORE_DROP_WARNING: f64 = 20.0;
const SCORE_DROP_CRITICAL: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Spike,
    NewError,
    ErrorResolved,
    ScoreDrop,
}

impl AlertKind {
    fn slug(&self) -> &'static str {
        match self {
            AlertKind::Spike => "spike",
            AlertKind::NewError => "new-error",
            AlertKind::ErrorResolved => "error-resolved",
            AlertKind::ScoreDrop => "score-drop",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl Severity {
    fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::Warning => 1,
            Severity::Info => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
    pub identity: String,
    pub current_value: Option<f64>,
    pub previous_value: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    fn new(
        kind: AlertKind,
        severity: Severity,
        identity: &str,
        message: String,
        current_value: Option<f64>,
        previous_value: Option<f64>,
    ) -> Self {
        Self {
            id: format!("{}-{}", kind.slug(), identity),
            kind,
            severity,
            message,
            identity: identity.to_string(),
            current_value,
            previous_value,
            timestamp: Utc::now(),
        }
    }
}

/// Diff `current` against `previous`, keyed by resolved identity.
///
/// With no baseline there is no detection: an absent or empty `previous`
/// yields no alerts. Current records without a baseline match are skipped;
/// there is deliberately no "newly appeared" alert kind. The rules are
/// independent, so one record can raise several alerts. Output is sorted
/// critical first, stable within equal severity.
pub fn detect_anomalies(current: &[NormalizedRecord], previous: &[NormalizedRecord]) -> Vec<Alert> {
    if previous.is_empty() {
        return Vec::new();
    }

    let baseline: HashMap<String, &NormalizedRecord> =
        previous.iter().map(|r| (r.identity(), r)).collect();

    let mut alerts = Vec::new();
    for cur in current {
        let identity = cur.identity();
        let Some(prev) = baseline.get(&identity).copied() else {
            continue;
        };
        check_spike(cur, prev, &identity, &mut alerts);
        check_errors(cur, prev, &identity, &mut alerts);
        check_score_drop(cur, prev, &identity, &mut alerts);
    }

    alerts.sort_by_key(|a| a.severity.rank());
    debug!(alerts = alerts.len(), current = current.len(), "anomaly pass done");
    alerts
}

fn check_spike(
    cur: &NormalizedRecord,
    prev: &NormalizedRecord,
    identity: &str,
    alerts: &mut Vec<Alert>,
) {
    let (Some(cur_wait), Some(prev_wait)) = (cur.wait_days, prev.wait_days) else {
        return;
    };
    if prev_wait <= 0.0 {
        return;
    }
    let pct = (cur_wait - prev_wait) / prev_wait * 100.0;
    if pct < SPIKE_PCT_WARNING {
        return;
    }
    let severity = if pct >= SPIKE_PCT_CRITICAL {
        Severity::Critical
    } else {
        Severity::Warning
    };
    alerts.push(Alert::new(
        AlertKind::Spike,
        severity,
        identity,
        format!(
            "wait time for {identity} jumped {pct:.0}% (from {prev_wait} to {cur_wait} days)"
        ),
        Some(cur_wait),
        Some(prev_wait),
    ));
}

fn check_errors(
    cur: &NormalizedRecord,
    prev: &NormalizedRecord,
    identity: &str,
    alerts: &mut Vec<Alert>,
) {
    if cur.has_error && !prev.has_error {
        alerts.push(Alert::new(
            AlertKind::NewError,
            Severity::Critical,
            identity,
            format!("{identity} started reporting an error"),
            None,
            None,
        ));
    } else if !cur.has_error && prev.has_error {
        alerts.push(Alert::new(
            AlertKind::ErrorResolved,
            Severity::Info,
            identity,
            format!("error for {identity} is resolved"),
            None,
            None,
        ));
    }
}

fn check_score_drop(
    cur: &NormalizedRecord,
    prev: &NormalizedRecord,
    identity: &str,
    alerts: &mut Vec<Alert>,
) {
    let (Some(cur_score), Some(prev_score)) = (cur.score, prev.score) else {
        return;
    };
    let drop = prev_score - cur_score;
    if drop < SCORE_DROP_WARNING {
        return;
    }
    let severity = if drop >= SCORE_DROP_CRITICAL {
        Severity::Critical
    } else {
        Severity::Warning
    };
    alerts.push(Alert::new(
        AlertKind::ScoreDrop,
        severity,
        identity,
        format!(
            "score for {identity} dropped {drop:.0} points (from {prev_score} to {cur_score})"
        ),
        Some(cur_score),
        Some(prev_score),
    ));
}
