//! quantbench: latency and accuracy benchmarks for quantized vector collections
//! on a remote vector search service.

pub mod benchmark;
pub mod client;
pub mod collection;
pub mod config;
pub mod dataset;
pub mod embedding;
pub mod error;
pub mod generate;
pub mod metrics;
pub mod results;
pub mod startup;
pub mod stats;
pub mod sweep;
pub mod types;
pub mod uploader;
