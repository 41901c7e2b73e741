#![allow(dead_code)]

pub mod harness;
pub mod server;

use std::sync::Arc;

use quantbench::benchmark::LatencyBenchmark;
use quantbench::config::{BenchmarkConfig, UploadConfig};
use quantbench::dataset::Item;
use quantbench::embedding::{EmbeddingService, HashEmbedder};

pub const TEST_DIMENSIONS: usize = 8;

/// `n` items with ids `1000..1000+n`, so payload ids never coincide with point ids.
pub fn items(n: usize) -> Vec<Item> {
    (0..n)
        .map(|i| Item {
            id: 1000 + i as u64,
            domain: "tech".to_string(),
            title: format!("Rust for Testing - Edition {i}"),
            description: format!("item number {i}"),
            metadata: Default::default(),
            extra: Default::default(),
        })
        .collect()
}

/// One distinct vector per item.
pub fn vectors(n: usize) -> Vec<Vec<f32>> {
    (0..n)
        .map(|i| {
            let mut v = vec![0.0; TEST_DIMENSIONS];
            v[i % TEST_DIMENSIONS] = 1.0 + i as f32;
            v
        })
        .collect()
}

pub fn upload_config(batch_size: usize, enable_retry: bool, max_retries: u32) -> UploadConfig {
    UploadConfig {
        batch_size,
        enable_retry,
        max_retries,
        initial_backoff_secs: 2.0,
    }
}

pub fn embeddings() -> Arc<EmbeddingService> {
    Arc::new(EmbeddingService::new(
        Box::new(HashEmbedder::new(TEST_DIMENSIONS)),
        100,
    ))
}

pub fn bench_config(warmup_enabled: bool) -> BenchmarkConfig {
    BenchmarkConfig {
        warmup_enabled,
        limit: 5,
        ..BenchmarkConfig::default()
    }
}

pub fn latency_benchmark(
    store: Arc<harness::ScriptedStore>,
    warmup_enabled: bool,
) -> LatencyBenchmark {
    LatencyBenchmark::new(store, embeddings(), bench_config(warmup_enabled))
}

pub fn queries(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("test query {i}")).collect()
}
