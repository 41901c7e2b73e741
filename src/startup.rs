//! Process bootstrap: config path resolution, logging, and construction of the
//! remote client and embedding service from a loaded `Config`.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::client::{QdrantClient, VectorStore};
use crate::config::{Config, LoggingConfig};
use crate::embedding::EmbeddingService;
use crate::error::Result;

/// Resolve the configuration file path.
///
/// Priority:
/// 1. `QBENCH_CONFIG` environment variable
/// 2. `./quantbench.toml` if it exists
/// 3. None (use defaults)
pub fn resolve_config_path() -> Option<String> {
    std::env::var("QBENCH_CONFIG").ok().or_else(|| {
        let default = "quantbench.toml";
        std::path::Path::new(default)
            .exists()
            .then(|| default.to_string())
    })
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the effective level from `logging`
/// (quiet > verbose > level) applies. Logs go to stderr so stdout stays free
/// for summaries.
pub fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.effective_level()));

    match logging.format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

/// Connect to the configured service. Fails before any network call when the
/// URL or API key is missing.
pub fn build_store(config: &Config) -> Result<Arc<dyn VectorStore>> {
    let client = QdrantClient::new(&config.connection)?;
    tracing::info!(
        url = %config.connection.url,
        timeout_secs = config.connection.timeout_secs,
        "vector service client ready"
    );
    Ok(Arc::new(client))
}

/// Load the embedding model once for the life of the process.
pub fn build_embeddings(config: &Config) -> Result<Arc<EmbeddingService>> {
    Ok(Arc::new(EmbeddingService::from_config(&config.embedding)?))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BenchError;

    #[test]
    fn test_resolve_config_path_from_env() {
        let original = std::env::var("QBENCH_CONFIG").ok();

        std::env::set_var("QBENCH_CONFIG", "bench.toml");
        let path = resolve_config_path();

        match original {
            Some(v) => std::env::set_var("QBENCH_CONFIG", v),
            None => std::env::remove_var("QBENCH_CONFIG"),
        }

        assert_eq!(path, Some("bench.toml".to_string()));
    }

    #[test]
    fn test_build_store_requires_credentials() {
        let mut config = Config::default();
        config.connection.url = String::new();
        config.connection.api_key = String::new();
        assert!(matches!(build_store(&config), Err(BenchError::Config(_))));
    }

    #[test]
    fn test_build_embeddings_hash_backend() {
        let mut config = Config::default();
        config.embedding.backend = "hash".into();
        config.embedding.vector_size = 32;
        let service = build_embeddings(&config).unwrap();
        assert_eq!(service.dimensions(), 32);
    }
}
