//! Maps raw rows onto canonical typed records. This stage is total: every
//! field is either a cleanly coerced value or an explicit absent marker, so
//! one bad cell never drops a record.

pub mod aliases;
pub mod coerce;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::classify;
use crate::record::{Category, RawRecord};

/// A raw row with its canonical fields resolved and coerced. The original
/// columns ride along untouched for passthrough display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub raw: RawRecord,
    pub wait_days: Option<f64>,
    pub score: Option<f64>,
    pub captured_at: Option<DateTime<Utc>>,
    pub has_error: bool,
    pub category: Category,
    pub index: usize,
}

impl NormalizedRecord {
    /// The name used to match this record across snapshots: first non-empty
    /// identity alias, falling back to the row position.
    pub fn identity(&self) -> String {
        self.raw
            .first_non_empty(aliases::IDENTITY)
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| format!("record {}", self.index))
    }
}

/// Normalize a fetched row set. Deterministic and infallible; identical
/// input always yields identical output.
pub fn normalize(rows: &[RawRecord]) -> Vec<NormalizedRecord> {
    let records: Vec<NormalizedRecord> = rows
        .iter()
        .enumerate()
        .map(|(index, raw)| normalize_one(raw, index))
        .collect();
    debug!(
        records = records.len(),
        with_errors = records.iter().filter(|r| r.has_error).count(),
        "normalized rows"
    );
    records
}

fn normalize_one(raw: &RawRecord, index: usize) -> NormalizedRecord {
    let wait_days = raw
        .first_non_empty(aliases::WAIT_DAYS)
        .and_then(coerce::parse_number);
    let score = raw
        .first_non_empty(aliases::SCORE)
        .and_then(coerce::parse_number);
    let captured_at = raw
        .first_non_empty(aliases::CAPTURED_AT)
        .and_then(coerce::parse_timestamp);

    let has_error = raw
        .first_non_empty(aliases::ERROR_CODE)
        .or_else(|| raw.first_non_empty(aliases::ERROR_DETAILS))
        .is_some();

    NormalizedRecord {
        raw: raw.clone(),
        wait_days,
        score,
        captured_at,
        has_error,
        category: classify(raw),
        index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> RawRecord {
        RawRecord::new(
            pairs
                .iter()
                .map(|(h, v)| (h.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn end_to_end_clinic_row() {
        let raw = record(&[
            ("Name", "HRT Clinic A"),
            ("Days Out", "7"),
            ("Error Code", ""),
        ]);
        let recs = normalize(&[raw]);
        let rec = &recs[0];
        assert_eq!(rec.category, Category::Hrt);
        assert_eq!(rec.wait_days, Some(7.0));
        assert!(!rec.has_error);
        assert_eq!(rec.identity(), "HRT Clinic A");
    }

    #[test]
    fn alias_resolution_takes_first_non_empty() {
        let raw = record(&[("Days Out", ""), ("Wait Days", "14"), ("Wait", "99")]);
        let recs = normalize(&[raw]);
        let rec = &recs[0];
        assert_eq!(rec.wait_days, Some(14.0));
    }

    #[test]
    fn unparsable_cells_become_none_not_failures() {
        let raw = record(&[
            ("Name", "Clinic B"),
            ("Days Out", "call for info"),
            ("Score", ""),
            ("Last Updated", "unknown"),
        ]);
        let recs = normalize(&[raw]);
        let rec = &recs[0];
        assert_eq!(rec.wait_days, None);
        assert_eq!(rec.score, None);
        assert_eq!(rec.captured_at, None);
    }

    #[test]
    fn error_flag_from_code_or_details() {
        let with_code = record(&[("Error Code", "403")]);
        let with_details = record(&[("Error Details", "site unreachable")]);
        let blank = record(&[("Error Code", "  "), ("Error Details", "")]);
        assert!(normalize(&[with_code])[0].has_error);
        assert!(normalize(&[with_details])[0].has_error);
        assert!(!normalize(&[blank])[0].has_error);
    }

    #[test]
    fn identity_falls_back_to_row_position() {
        let raw = record(&[("Days Out", "3")]);
        let recs = normalize(&[raw]);
        let rec = &recs[0];
        assert_eq!(rec.identity(), "record 0");
    }

    #[test]
    fn snapshot_survives_a_json_file_round_trip() -> anyhow::Result<()> {
        use std::io::Write;

        let raw = record(&[
            ("Name", "HRT Clinic A"),
            ("Days Out", "7"),
            ("Last Updated", "2024-03-05"),
        ]);
        let snapshot = normalize(&[raw]);

        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(serde_json::to_string(&snapshot)?.as_bytes())?;
        let restored: Vec<NormalizedRecord> =
            serde_json::from_str(&std::fs::read_to_string(file.path())?)?;
        assert_eq!(restored, snapshot);
        Ok(())
    }

    #[test]
    fn normalization_is_deterministic() {
        let raw = record(&[
            ("Name", "Clinic C"),
            ("Days Out", " 1,234.5% "),
            ("Last Updated", "3/5/2024"),
        ]);
        let a = normalize(&[raw.clone()]);
        let b = normalize(&[raw]);
        assert_eq!(a, b);
        assert_eq!(a[0].wait_days, Some(1234.5));
    }
}
