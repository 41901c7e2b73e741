//! Query latency measurement against a populated collection.
//!
//! One run is: optional warmup query, then exactly one query per test string
//! in list order, then reduction of the recorded round-trip times. Query text
//! is encoded before the clock starts, so samples cover only the remote call.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info, instrument};

use crate::client::VectorStore;
use crate::config::BenchmarkConfig;
use crate::embedding::EmbeddingService;
use crate::error::{BenchError, Result};
use crate::metrics;
use crate::stats::MetricBundle;
use crate::types::{QueryRequest, ScoredPoint, SearchParams};

const WARMUP_QUERY: &str = "warmup query";

/// Latency of one quantized collection searched two ways.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantizationResult {
    pub no_rescoring: MetricBundle,
    pub with_rescoring: MetricBundle,
}

pub struct LatencyBenchmark {
    store: Arc<dyn VectorStore>,
    embeddings: Arc<EmbeddingService>,
    config: BenchmarkConfig,
}

impl LatencyBenchmark {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embeddings: Arc<EmbeddingService>,
        config: BenchmarkConfig,
    ) -> Self {
        Self {
            store,
            embeddings,
            config,
        }
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    pub fn encode(&self, text: &str) -> Result<Vec<f32>> {
        self.embeddings.encode(text)
    }

    /// Issue one query and return its round-trip time in milliseconds with the hits.
    pub async fn timed_query(
        &self,
        collection: &str,
        vector: Vec<f32>,
        using: Option<&str>,
        params: Option<SearchParams>,
    ) -> Result<(f64, Vec<ScoredPoint>)> {
        let request = QueryRequest {
            query: vector,
            limit: self.config.limit,
            using: using.map(str::to_string),
            params,
        };

        let start = Instant::now();
        let hits = self.store.query_points(collection, &request).await?;
        let elapsed = start.elapsed();

        metrics::QUERIES_TOTAL.with_label_values(&[collection]).inc();
        metrics::QUERY_DURATION
            .with_label_values(&[collection])
            .observe(elapsed.as_secs_f64());

        Ok((elapsed.as_secs_f64() * 1000.0, hits))
    }

    /// One throwaway query to warm remote caches. No-op when disabled.
    pub async fn warmup(&self, collection: &str, using: Option<&str>) -> Result<()> {
        if !self.config.warmup_enabled {
            return Ok(());
        }
        let vector = self.encode(WARMUP_QUERY)?;
        self.timed_query(collection, vector, using, None).await?;
        debug!(collection, "warmup query issued");
        Ok(())
    }

    /// Run the full latency protocol and reduce the samples.
    ///
    /// `using` and `params` are passed through to every measured query.
    #[instrument(skip(self, queries, params), fields(queries = queries.len()))]
    pub async fn measure_latency(
        &self,
        collection: &str,
        queries: &[String],
        using: Option<&str>,
        params: Option<SearchParams>,
        label: &str,
    ) -> Result<MetricBundle> {
        ensure_queries(queries)?;
        self.warmup(collection, using).await?;

        let mut samples = Vec::with_capacity(queries.len());
        for query in queries {
            let vector = self.encode(query)?;
            let (latency_ms, _) = self.timed_query(collection, vector, using, params).await?;
            samples.push(latency_ms);
        }

        let bundle = MetricBundle::from_samples(&samples)?;
        info!(
            collection,
            label,
            avg_ms = bundle.avg,
            p50_ms = bundle.p50,
            p95_ms = bundle.p95,
            p99_ms = bundle.p99,
            "latency measured"
        );
        debug!("\n{}", bundle.render(label));
        Ok(bundle)
    }

    /// Measure a quantized collection without rescoring, then with rescoring
    /// at the configured oversampling.
    pub async fn benchmark_quantization(
        &self,
        collection: &str,
        queries: &[String],
        method: &str,
    ) -> Result<QuantizationResult> {
        let no_rescoring = self
            .measure_latency(
                collection,
                queries,
                None,
                None,
                &format!("{method} (No Rescoring)"),
            )
            .await?;

        let with_rescoring = self
            .measure_latency(
                collection,
                queries,
                None,
                Some(SearchParams::rescored(self.config.rescore_oversampling)),
                &format!("{method} (With Rescoring)"),
            )
            .await?;

        Ok(QuantizationResult {
            no_rescoring,
            with_rescoring,
        })
    }
}

/// An empty query list has no latency distribution.
pub(crate) fn ensure_queries(queries: &[String]) -> Result<()> {
    if queries.is_empty() {
        return Err(BenchError::Validation(
            "at least one test query is required".to_string(),
        ));
    }
    Ok(())
}
