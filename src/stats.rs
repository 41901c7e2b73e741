//! Latency reduction: mean and percentiles over millisecond samples.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::error::{BenchError, Result};

/// Summary statistics for one benchmark run, all in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricBundle {
    pub avg: f64,
    pub p50: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
    #[serde(rename = "p99.5")]
    pub p99_5: f64,
    #[serde(rename = "p99.9")]
    pub p99_9: f64,
}

impl MetricBundle {
    /// Reduce latency samples. Fails on an empty sample set.
    pub fn from_samples(samples: &[f64]) -> Result<Self> {
        if samples.is_empty() {
            return Err(BenchError::Validation(
                "cannot compute metrics from zero latency samples".to_string(),
            ));
        }
        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);

        Ok(Self {
            avg: mean(samples),
            p50: percentile_sorted(&sorted, 50.0),
            p90: percentile_sorted(&sorted, 90.0),
            p95: percentile_sorted(&sorted, 95.0),
            p99: percentile_sorted(&sorted, 99.0),
            p99_5: percentile_sorted(&sorted, 99.5),
            p99_9: percentile_sorted(&sorted, 99.9),
        })
    }

    /// Human-readable rendering headed by `label`.
    pub fn render(&self, label: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{label}:");
        for (name, value) in [
            ("Average", self.avg),
            ("P50", self.p50),
            ("P90", self.p90),
            ("P95", self.p95),
            ("P99", self.p99),
            ("P99.5", self.p99_5),
            ("P99.9", self.p99_9),
        ] {
            let _ = writeln!(out, "  {:<8} {value:.2}ms", format!("{name}:"));
        }
        out
    }
}

pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Percentile `q` (0..=100) with linear interpolation between closest ranks.
/// Returns 0.0 for an empty slice.
pub fn percentile(samples: &[f64], q: f64) -> f64 {
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    percentile_sorted(&sorted, q)
}

fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = (q.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            let frac = rank - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}
