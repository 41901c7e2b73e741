//! Text → vector encoding.
//!
//! - `hash`: deterministic feature-hashing embedder, always available
//! - `fastembed`: sentence-transformer models via ONNX Runtime (cargo feature `fastembed`)
//!
//! `EmbeddingService` wraps whichever embedder is loaded and bounds memory by
//! encoding in fixed-size sub-batches while preserving input order.

mod hash;

#[cfg(feature = "fastembed")]
mod fastembed;

pub use hash::HashEmbedder;

#[cfg(feature = "fastembed")]
pub use self::fastembed::FastEmbedder;

use tracing::{debug, info};

use crate::config::EmbeddingConfig;
use crate::dataset::Item;
use crate::error::{BenchError, Result};

/// Default number of texts handed to the model per call.
pub const DEFAULT_ENCODE_BATCH_SIZE: usize = 1000;

/// A loaded embedding model. Deterministic for a fixed model and input.
pub trait Embedder: Send + Sync {
    /// Length of every vector this embedder produces.
    fn dimensions(&self) -> usize;

    fn encode(&self, text: &str) -> Result<Vec<f32>>;

    /// Encode several texts; output order matches input order.
    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.encode(t)).collect()
    }
}

/// Build the embedder named by `config.backend`.
///
/// An unknown backend, or a model that cannot be loaded, is a fatal
/// initialization error.
pub fn load_embedder(config: &EmbeddingConfig) -> Result<Box<dyn Embedder>> {
    match config.backend.as_str() {
        "hash" => Ok(Box::new(HashEmbedder::new(config.vector_size))),
        #[cfg(feature = "fastembed")]
        "fastembed" => Ok(Box::new(FastEmbedder::load(&config.model_name)?)),
        #[cfg(not(feature = "fastembed"))]
        "fastembed" => Err(BenchError::Config(
            "embedding backend 'fastembed' requires building with `--features fastembed`"
                .to_string(),
        )),
        other => Err(BenchError::Config(format!(
            "unknown embedding backend '{other}' (expected hash or fastembed)"
        ))),
    }
}

/// Order-preserving, sub-batched encoding over a loaded embedder.
pub struct EmbeddingService {
    embedder: Box<dyn Embedder>,
    batch_size: usize,
}

impl EmbeddingService {
    pub fn new(embedder: Box<dyn Embedder>, batch_size: usize) -> Self {
        Self {
            embedder,
            batch_size: batch_size.max(1),
        }
    }

    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        let embedder = load_embedder(config)?;
        if embedder.dimensions() != config.vector_size {
            return Err(BenchError::Config(format!(
                "embedding model produces {} dimensions but embedding.vector_size is {}",
                embedder.dimensions(),
                config.vector_size
            )));
        }
        info!(
            backend = %config.backend,
            model = %config.model_name,
            dimensions = embedder.dimensions(),
            "loaded embedding model"
        );
        Ok(Self::new(embedder, config.encode_batch_size))
    }

    pub fn dimensions(&self) -> usize {
        self.embedder.dimensions()
    }

    pub fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let vector = self.embedder.encode(text)?;
        self.check_dimensions(&vector)?;
        Ok(vector)
    }

    /// Encode `texts` in sub-batches of the configured size.
    pub fn encode_many<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(self.batch_size) {
            let refs: Vec<&str> = chunk.iter().map(|t| t.as_ref()).collect();
            let encoded = self.embedder.encode_batch(&refs)?;
            if encoded.len() != refs.len() {
                return Err(BenchError::Embedding(format!(
                    "embedder returned {} vectors for {} texts",
                    encoded.len(),
                    refs.len()
                )));
            }
            for vector in &encoded {
                self.check_dimensions(vector)?;
            }
            vectors.extend(encoded);
            debug!(encoded = vectors.len(), total = texts.len(), "encoding progress");
        }

        info!(count = texts.len(), "encoded texts");
        Ok(vectors)
    }

    /// Encode each item's combined `title description` text.
    pub fn encode_items(&self, items: &[Item]) -> Result<Vec<Vec<f32>>> {
        info!(count = items.len(), "pre-computing embeddings");
        let texts: Vec<String> = items.iter().map(Item::embedding_text).collect();
        self.encode_many(&texts)
    }

    fn check_dimensions(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.embedder.dimensions() {
            return Err(BenchError::Embedding(format!(
                "expected {} dimensions, got {}",
                self.embedder.dimensions(),
                vector.len()
            )));
        }
        Ok(())
    }
}
