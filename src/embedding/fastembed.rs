use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use super::Embedder;
use crate::error::{BenchError, Result};

/// Sentence-transformer embedder running locally through ONNX Runtime.
pub struct FastEmbedder {
    model: TextEmbedding,
    dimensions: usize,
}

impl FastEmbedder {
    /// Load `model_name`, downloading weights on first use.
    pub fn load(model_name: &str) -> Result<Self> {
        let (model, dimensions) = match model_name {
            "all-MiniLM-L6-v2" | "sentence-transformers/all-MiniLM-L6-v2" => {
                (EmbeddingModel::AllMiniLML6V2, 384)
            }
            "bge-small-en-v1.5" | "BAAI/bge-small-en-v1.5" => (EmbeddingModel::BGESmallENV15, 384),
            "bge-base-en-v1.5" | "BAAI/bge-base-en-v1.5" => (EmbeddingModel::BGEBaseENV15, 768),
            other => {
                return Err(BenchError::Config(format!(
                    "unsupported embedding model '{other}'"
                )))
            }
        };

        let model = TextEmbedding::try_new(
            InitOptions::new(model).with_show_download_progress(false),
        )
        .map_err(|e| BenchError::Embedding(format!("failed to load model {model_name}: {e}")))?;

        Ok(Self { model, dimensions })
    }
}

impl Embedder for FastEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        self.encode_batch(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| BenchError::Embedding("no embedding generated".to_string()))
    }

    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.model
            .embed(texts.to_vec(), None)
            .map_err(|e| BenchError::Embedding(format!("encode failed: {e}")))
    }
}
