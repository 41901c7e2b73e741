//! Oversampling sweeps over a quantized collection.
//!
//! The latency sweep and the accuracy sweep are independent: each walks the
//! factor list in order and produces one entry per factor.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::benchmark::{ensure_queries, LatencyBenchmark};
use crate::error::Result;
use crate::stats::{mean, percentile};
use crate::types::{PointId, SearchParams};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OversamplingLatency {
    pub factor: f64,
    pub avg_latency: f64,
    pub p95_latency: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OversamplingAccuracy {
    pub factor: f64,
    pub avg_accuracy: f64,
}

/// Fraction of `baseline` also present in `candidate`; 0 for an empty baseline.
pub fn accuracy_score(baseline: &HashSet<PointId>, candidate: &HashSet<PointId>) -> f64 {
    if baseline.is_empty() {
        return 0.0;
    }
    baseline.intersection(candidate).count() as f64 / baseline.len() as f64
}

/// Rescored query latency per oversampling factor. No warmup.
pub async fn tune_oversampling(
    bench: &LatencyBenchmark,
    collection: &str,
    queries: &[String],
    factors: &[f64],
) -> Result<Vec<OversamplingLatency>> {
    ensure_queries(queries)?;
    let mut results = Vec::with_capacity(factors.len());

    for &factor in factors {
        let mut samples = Vec::with_capacity(queries.len());
        for query in queries {
            let vector = bench.encode(query)?;
            let (latency_ms, _) = bench
                .timed_query(collection, vector, None, Some(SearchParams::rescored(factor)))
                .await?;
            samples.push(latency_ms);
        }

        let entry = OversamplingLatency {
            factor,
            avg_latency: mean(&samples),
            p95_latency: percentile(&samples, 95.0),
        };
        info!(
            collection,
            factor,
            avg_ms = entry.avg_latency,
            p95_ms = entry.p95_latency,
            "oversampling latency measured"
        );
        results.push(entry);
    }

    Ok(results)
}

/// Top-K overlap between a baseline collection and a rescored quantized
/// collection, averaged over queries, per oversampling factor.
pub async fn measure_accuracy(
    bench: &LatencyBenchmark,
    baseline_collection: &str,
    baseline_using: Option<&str>,
    quantized_collection: &str,
    queries: &[String],
    factors: &[f64],
) -> Result<Vec<OversamplingAccuracy>> {
    ensure_queries(queries)?;
    let mut results = Vec::with_capacity(factors.len());

    for &factor in factors {
        let mut scores = Vec::with_capacity(queries.len());
        for query in queries {
            let vector = bench.encode(query)?;

            let (_, baseline_hits) = bench
                .timed_query(baseline_collection, vector.clone(), baseline_using, None)
                .await?;
            let (_, quantized_hits) = bench
                .timed_query(
                    quantized_collection,
                    vector,
                    None,
                    Some(SearchParams::rescored(factor)),
                )
                .await?;

            let baseline: HashSet<PointId> = baseline_hits.iter().map(|p| p.id).collect();
            let candidate: HashSet<PointId> = quantized_hits.iter().map(|p| p.id).collect();
            scores.push(accuracy_score(&baseline, &candidate));
        }

        let entry = OversamplingAccuracy {
            factor,
            avg_accuracy: mean(&scores),
        };
        info!(
            baseline = baseline_collection,
            quantized = quantized_collection,
            factor,
            avg_accuracy = entry.avg_accuracy,
            "accuracy retention measured"
        );
        results.push(entry);
    }

    Ok(results)
}
