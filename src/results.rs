//! Benchmark results file and text summaries.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::benchmark::QuantizationResult;
use crate::dataset::write_json;
use crate::error::Result;
use crate::stats::MetricBundle;
use crate::sweep::{OversamplingAccuracy, OversamplingLatency};

const RULE: &str = "============================================================";

/// Oversampling sweep outcome for one quantized collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OversamplingReport {
    pub collection: String,
    pub latency: Vec<OversamplingLatency>,
    pub accuracy: Vec<OversamplingAccuracy>,
}

/// Contents of a results file: baseline latency plus one entry per
/// quantization method, keyed by method name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResults {
    pub baseline: MetricBundle,
    #[serde(default)]
    pub quantization: BTreeMap<String, QuantizationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oversampling: Option<OversamplingReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

impl BenchmarkResults {
    pub fn new(baseline: MetricBundle) -> Self {
        Self {
            baseline,
            quantization: BTreeMap::new(),
            oversampling: None,
            generated_at: Some(Utc::now()),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        write_json(path, self)?;
        info!(path = %path.display(), "results saved");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Baseline figures followed by each method's latency and speedup
    /// (baseline / quantized) for average and p95.
    pub fn analysis_summary(&self) -> String {
        let b = &self.baseline;
        let mut out = String::new();
        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(out, "QUANTIZATION PERFORMANCE ANALYSIS");
        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(out);
        let _ = writeln!(out, "Baseline Performance:");
        let _ = writeln!(out, "  Average: {:.2}ms", b.avg);
        let _ = writeln!(out, "  P50:     {:.2}ms", b.p50);
        let _ = writeln!(out, "  P90:     {:.2}ms", b.p90);
        let _ = writeln!(out, "  P95:     {:.2}ms", b.p95);
        let _ = writeln!(out, "  P99:     {:.2}ms", b.p99);
        let _ = writeln!(out, "  P99.5:   {:.2}ms", b.p99_5);

        if self.quantization.is_empty() {
            return out;
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Quantization Results:");
        for (method, result) in &self.quantization {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}:", method.to_uppercase());
            for (heading, m) in [
                ("Without rescoring", &result.no_rescoring),
                ("With rescoring", &result.with_rescoring),
            ] {
                let _ = writeln!(out, "  {heading}:");
                let _ = writeln!(
                    out,
                    "    Average: {:.2}ms ({})",
                    m.avg,
                    format_speedup(speedup(b.avg, m.avg))
                );
                let _ = writeln!(
                    out,
                    "    P95:     {:.2}ms ({})",
                    m.p95,
                    format_speedup(speedup(b.p95, m.p95))
                );
            }
        }
        out
    }
}

/// `baseline / candidate`, or `None` when the candidate is not positive.
pub fn speedup(baseline: f64, candidate: f64) -> Option<f64> {
    (candidate > 0.0).then(|| baseline / candidate)
}

fn format_speedup(ratio: Option<f64>) -> String {
    match ratio {
        Some(r) => format!("{r:.1}x"),
        None => "n/a".to_string(),
    }
}

/// Per-factor latency and accuracy table, ordered by factor.
pub fn oversampling_summary(
    latency: &[OversamplingLatency],
    accuracy: &[OversamplingAccuracy],
) -> String {
    let mut rows: Vec<&OversamplingLatency> = latency.iter().collect();
    rows.sort_by(|a, b| a.factor.total_cmp(&b.factor));

    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "OVERSAMPLING FACTOR OPTIMIZATION");
    let _ = writeln!(out, "{RULE}");

    for row in rows {
        let _ = writeln!(out);
        let _ = writeln!(out, "  {}x:", row.factor);
        let _ = writeln!(
            out,
            "    {:.2}ms avg latency, {:.2}ms P95 latency",
            row.avg_latency, row.p95_latency
        );
        match accuracy.iter().find(|a| a.factor == row.factor) {
            Some(a) => {
                let _ = writeln!(out, "    {:.2} avg accuracy retention", a.avg_accuracy);
            }
            None => {
                let _ = writeln!(out, "    accuracy not measured");
            }
        }
    }
    out
}
