use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::client::VectorStore;
use crate::config::CollectionConfig;
use crate::error::{BenchError, Result};
use crate::types::{
    CollectionInfo, CollectionKind, CreateCollection, QuantizationConfig, SparseIndexParams,
    SparseVectorParams, VectorParams, VectorsConfig, DENSE_VECTOR_NAME, SPARSE_VECTOR_NAME,
};

/// Creates, deletes, and inspects remote collections in one of three layouts.
pub struct CollectionManager {
    store: Arc<dyn VectorStore>,
    config: CollectionConfig,
    vector_size: usize,
}

impl CollectionManager {
    pub fn new(store: Arc<dyn VectorStore>, config: CollectionConfig, vector_size: usize) -> Self {
        Self {
            store,
            config,
            vector_size,
        }
    }

    pub async fn exists(&self, name: &str) -> Result<bool> {
        self.store.collection_exists(name).await
    }

    /// Delete `name`. A missing collection is not an error.
    #[instrument(skip(self))]
    pub async fn delete(&self, name: &str) -> Result<()> {
        if !self.store.collection_exists(name).await? {
            return Ok(());
        }
        self.store.delete_collection(name).await?;
        info!(collection = name, "deleted collection");
        Ok(())
    }

    /// Single unnamed dense vector.
    #[instrument(skip(self))]
    pub async fn create_standard(&self, name: &str) -> Result<()> {
        let spec = CreateCollection {
            vectors: VectorsConfig::Single(self.dense_params(Some(self.config.on_disk))),
            sparse_vectors: None,
            quantization_config: None,
        };
        self.store.create_collection(name, &spec).await?;
        info!(collection = name, kind = "standard", "created collection");
        Ok(())
    }

    /// Named dense field plus a companion sparse field.
    #[instrument(skip(self))]
    pub async fn create_hybrid(&self, name: &str) -> Result<()> {
        let spec = CreateCollection {
            vectors: VectorsConfig::Named(BTreeMap::from([(
                DENSE_VECTOR_NAME.to_string(),
                self.dense_params(Some(self.config.on_disk)),
            )])),
            sparse_vectors: Some(BTreeMap::from([(
                SPARSE_VECTOR_NAME.to_string(),
                SparseVectorParams {
                    index: SparseIndexParams { on_disk: false },
                },
            )])),
            quantization_config: None,
        };
        self.store.create_collection(name, &spec).await?;
        info!(collection = name, kind = "hybrid", "created collection");
        Ok(())
    }

    /// Unnamed dense vector compressed with `quantization`. Raw vectors stay
    /// on disk so rescoring against them remains possible.
    #[instrument(skip(self, quantization))]
    pub async fn create_quantized(
        &self,
        name: &str,
        quantization: &QuantizationConfig,
    ) -> Result<()> {
        let spec = CreateCollection {
            vectors: VectorsConfig::Single(self.dense_params(Some(true))),
            sparse_vectors: None,
            quantization_config: Some(quantization.clone()),
        };
        self.store.create_collection(name, &spec).await?;
        info!(collection = name, kind = "quantized", "created collection");
        Ok(())
    }

    /// Delete `name` if present, then create it with the given layout.
    ///
    /// `Quantized` without a quantization config fails before any remote call.
    #[instrument(skip(self, quantization))]
    pub async fn recreate(
        &self,
        name: &str,
        kind: CollectionKind,
        quantization: Option<&QuantizationConfig>,
    ) -> Result<()> {
        if kind == CollectionKind::Quantized && quantization.is_none() {
            return Err(missing_quantization(name));
        }

        self.delete(name).await?;

        match (kind, quantization) {
            (CollectionKind::Standard, _) => self.create_standard(name).await,
            (CollectionKind::Hybrid, _) => self.create_hybrid(name).await,
            (CollectionKind::Quantized, Some(q)) => self.create_quantized(name, q).await,
            (CollectionKind::Quantized, None) => Err(missing_quantization(name)),
        }
    }

    /// Fails with `CollectionNotFound` when `name` is absent.
    pub async fn get_info(&self, name: &str) -> Result<CollectionInfo> {
        self.store.collection_info(name).await
    }

    fn dense_params(&self, on_disk: Option<bool>) -> VectorParams {
        VectorParams {
            size: self.vector_size,
            distance: self.config.distance,
            on_disk,
        }
    }
}

fn missing_quantization(name: &str) -> BenchError {
    BenchError::Config(format!(
        "quantization config is required to create quantized collection '{name}'"
    ))
}
