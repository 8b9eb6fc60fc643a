//! Peer benchmarks: rank records within a category by wait time and compute
//! deviation from the category mean.

use serde::{Deserialize, Serialize};

use crate::normalize::NormalizedRecord;
use crate::record::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusBand {
    Excellent,
    Good,
    Average,
    Poor,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Benchmark {
    pub identity: String,
    pub metric: Option<f64>,
    pub category_mean: Option<f64>,
    pub percent_deviation: Option<f64>,
    pub rank: usize,
    pub category_size: usize,
    pub status_band: StatusBand,
}

/// Band thresholds apply to the raw wait-days value. A missing metric lands
/// in `Average`, matching the dashboard's longstanding behavior (see
/// DESIGN.md before changing this).
fn band_for(metric: Option<f64>) -> StatusBand {
    match metric {
        Some(v) if v <= 7.0 => StatusBand::Excellent,
        Some(v) if v <= 14.0 => StatusBand::Good,
        Some(v) if v <= 30.0 => StatusBand::Average,
        Some(v) if v <= 60.0 => StatusBand::Poor,
        Some(_) => StatusBand::Critical,
        None => StatusBand::Average,
    }
}

/// Rank records by wait days, ascending, against their category peers.
///
/// The mean excludes missing metrics; records with a missing metric still
/// get a rank (sorted last) so the table can show every row. Ties break on
/// identity so rank assignment never depends on input order. Deviation is
/// null when the value or mean is missing, and also when the mean is zero
/// (an all-zero cohort has no deviation to report, not a division by zero).
pub fn compute_benchmarks(
    records: &[NormalizedRecord],
    category_filter: Option<Category>,
) -> Vec<Benchmark> {
    let peers: Vec<&NormalizedRecord> = records
        .iter()
        .filter(|r| category_filter.map_or(true, |c| r.category == c))
        .collect();

    let defined: Vec<f64> = peers.iter().filter_map(|r| r.wait_days).collect();
    let mean = if defined.is_empty() {
        None
    } else {
        Some(defined.iter().sum::<f64>() / defined.len() as f64)
    };

    let mut ordered: Vec<(String, Option<f64>)> =
        peers.iter().map(|r| (r.identity(), r.wait_days)).collect();
    ordered.sort_by(|(a_id, a), (b_id, b)| match (a, b) {
        (Some(x), Some(y)) => x
            .partial_cmp(y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a_id.cmp(b_id)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a_id.cmp(b_id),
    });

    let category_size = ordered.len();
    ordered
        .into_iter()
        .enumerate()
        .map(|(pos, (identity, metric))| {
            let percent_deviation = match (metric, mean) {
                (Some(v), Some(m)) if m != 0.0 => Some((v - m) / m * 100.0),
                _ => None,
            };
            Benchmark {
                identity,
                metric,
                category_mean: mean,
                percent_deviation,
                rank: pos + 1,
                category_size,
                status_band: band_for(metric),
            }
        })
        .collect()
}
