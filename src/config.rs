use crate::error::{BenchError, Result};
use crate::types::{
    BinaryEncoding, BinaryQuantization, Distance, QuantizationConfig, QuantizationMethod,
    ScalarQuantization, ScalarType,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub collection: CollectionConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub benchmark: BenchmarkConfig,
    #[serde(default)]
    pub quantization: QuantizationSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// `hash` (built in, deterministic) or `fastembed` (requires the cargo feature).
    #[serde(default = "default_embedding_backend")]
    pub backend: String,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    #[serde(default = "default_vector_size")]
    pub vector_size: usize,
    #[serde(default = "default_encode_batch_size")]
    pub encode_batch_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    #[serde(default)]
    pub distance: Distance,
    #[serde(default = "default_on_disk")]
    pub on_disk: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub enable_retry: bool,
    /// Total attempts per batch when retry is enabled.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_initial_backoff_secs")]
    pub initial_backoff_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    #[serde(default = "default_warmup_enabled")]
    pub warmup_enabled: bool,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default = "default_oversampling_factors")]
    pub oversampling_factors: Vec<f64>,
    /// Oversampling used by the with-rescoring half of the quantization comparison.
    #[serde(default = "default_rescore_oversampling")]
    pub rescore_oversampling: f64,
    #[serde(default = "default_test_queries")]
    pub test_queries: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantizationSettings {
    #[serde(default = "default_scalar")]
    pub scalar: QuantizationConfig,
    #[serde(default = "default_binary")]
    pub binary: QuantizationConfig,
    #[serde(default = "default_binary_2bit")]
    pub binary_2bit: QuantizationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub quiet: bool,
}

// Default value functions
fn default_url() -> String {
    std::env::var("QDRANT_URL").unwrap_or_default()
}
fn default_api_key() -> String {
    std::env::var("QDRANT_API_KEY").unwrap_or_default()
}
fn default_timeout_secs() -> u64 {
    std::env::var("QBENCH_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(60)
}
fn default_embedding_backend() -> String {
    std::env::var("QBENCH_EMBEDDING_BACKEND").unwrap_or_else(|_| "hash".to_string())
}
fn default_model_name() -> String {
    "all-MiniLM-L6-v2".to_string()
}
fn default_vector_size() -> usize {
    384
}
fn default_encode_batch_size() -> usize {
    1000
}
fn default_on_disk() -> bool {
    true
}
fn default_batch_size() -> usize {
    std::env::var("QBENCH_BATCH_SIZE")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(50)
}
fn default_max_retries() -> u32 {
    3
}
fn default_initial_backoff_secs() -> f64 {
    2.0
}
fn default_warmup_enabled() -> bool {
    true
}
fn default_limit() -> usize {
    10
}
fn default_oversampling_factors() -> Vec<f64> {
    vec![2.0, 3.0, 5.0, 8.0, 10.0]
}
fn default_rescore_oversampling() -> f64 {
    3.0
}
fn default_test_queries() -> Vec<String> {
    [
        "python machine learning tutorial",
        "javascript web development",
        "learn rust programming security",
        "intermediate algorithms and data structures",
        "practical examples best practices",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
fn default_scalar() -> QuantizationConfig {
    QuantizationConfig::Scalar(ScalarQuantization {
        kind: ScalarType::Int8,
        quantile: Some(0.99),
        always_ram: Some(true),
    })
}
fn default_binary() -> QuantizationConfig {
    QuantizationConfig::Binary(BinaryQuantization {
        always_ram: Some(true),
        encoding: None,
    })
}
fn default_binary_2bit() -> QuantizationConfig {
    QuantizationConfig::Binary(BinaryQuantization {
        always_ram: Some(true),
        encoding: Some(BinaryEncoding::TwoBits),
    })
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    std::env::var("QBENCH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string())
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            api_key: default_api_key(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: default_embedding_backend(),
            model_name: default_model_name(),
            vector_size: default_vector_size(),
            encode_batch_size: default_encode_batch_size(),
        }
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            distance: Distance::default(),
            on_disk: default_on_disk(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            enable_retry: false,
            max_retries: default_max_retries(),
            initial_backoff_secs: default_initial_backoff_secs(),
        }
    }
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            warmup_enabled: default_warmup_enabled(),
            limit: default_limit(),
            oversampling_factors: default_oversampling_factors(),
            rescore_oversampling: default_rescore_oversampling(),
            test_queries: default_test_queries(),
        }
    }
}

impl Default for QuantizationSettings {
    fn default() -> Self {
        Self {
            scalar: default_scalar(),
            binary: default_binary(),
            binary_2bit: default_binary_2bit(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            verbose: false,
            quiet: false,
        }
    }
}

impl ConnectionConfig {
    /// Both the service URL and API key are required before any remote call.
    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(BenchError::Config(
                "QDRANT_URL must be set in environment or config file".to_string(),
            ));
        }
        if self.api_key.is_empty() {
            return Err(BenchError::Config(
                "QDRANT_API_KEY must be set in environment or config file".to_string(),
            ));
        }
        Ok(())
    }
}

impl QuantizationSettings {
    pub fn get(&self, method: QuantizationMethod) -> &QuantizationConfig {
        match method {
            QuantizationMethod::Scalar => &self.scalar,
            QuantizationMethod::Binary => &self.binary,
            QuantizationMethod::Binary2Bit => &self.binary_2bit,
        }
    }
}

impl LoggingConfig {
    /// `quiet` wins over `verbose`, which wins over `level`.
    pub fn effective_level(&self) -> String {
        if self.quiet {
            "error".to_string()
        } else if self.verbose {
            "debug".to_string()
        } else {
            self.level.to_lowercase()
        }
    }
}

impl Config {
    /// Load config from a TOML file, falling back to defaults.
    /// After loading, env var overrides are applied so that:
    /// env var > TOML file > defaults.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                let content = std::fs::read_to_string(p).map_err(|e| {
                    BenchError::Config(format!("failed to read config file {p}: {e}"))
                })?;
                toml::from_str(&content)
                    .map_err(|e| BenchError::Config(format!("failed to parse config: {e}")))?
            }
            None => Config::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reject values the upload and benchmark loops cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.upload.batch_size == 0 {
            return Err(BenchError::Config("upload.batch_size must be > 0".into()));
        }
        if self.upload.max_retries == 0 {
            return Err(BenchError::Config("upload.max_retries must be > 0".into()));
        }
        if !(self.upload.initial_backoff_secs > 0.0) {
            return Err(BenchError::Config(
                "upload.initial_backoff_secs must be > 0".into(),
            ));
        }
        if self.benchmark.limit == 0 {
            return Err(BenchError::Config("benchmark.limit must be > 0".into()));
        }
        if self.embedding.vector_size == 0 {
            return Err(BenchError::Config("embedding.vector_size must be > 0".into()));
        }
        if self.embedding.encode_batch_size == 0 {
            return Err(BenchError::Config(
                "embedding.encode_batch_size must be > 0".into(),
            ));
        }
        if let Some(f) = self
            .benchmark
            .oversampling_factors
            .iter()
            .chain(std::iter::once(&self.benchmark.rescore_oversampling))
            .find(|f| !(**f > 0.0))
        {
            return Err(BenchError::Config(format!(
                "oversampling factors must be > 0, got {f}"
            )));
        }
        Ok(())
    }

    /// Apply environment variable overrides on top of file/default values.
    fn apply_env_overrides(&mut self) {
        // Connection
        if let Some(v) = std::env::var("QDRANT_URL").ok().filter(|s| !s.is_empty()) {
            self.connection.url = v;
        }
        if let Some(v) = std::env::var("QDRANT_API_KEY")
            .ok()
            .filter(|s| !s.is_empty())
        {
            self.connection.api_key = v;
        }
        if let Some(v) = std::env::var("QBENCH_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.connection.timeout_secs = v;
        }

        // Embedding
        if let Ok(v) = std::env::var("QBENCH_EMBEDDING_BACKEND") {
            self.embedding.backend = v;
        }

        // Upload
        if let Some(v) = std::env::var("QBENCH_BATCH_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.upload.batch_size = v;
        }

        // Logging
        if let Ok(v) = std::env::var("QBENCH_LOG_FORMAT") {
            self.logging.format = v;
        }
    }
}
