use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::client::VectorStore;
use crate::config::UploadConfig;
use crate::dataset::Item;
use crate::error::{BenchError, Result};
use crate::metrics;
use crate::types::{Point, PointId, PointVector};

/// Cumulative point count between progress log lines.
const PROGRESS_INTERVAL: usize = 1000;

/// Pushes an item corpus with precomputed vectors into a collection in
/// fixed-size batches, one upsert per batch.
pub struct Uploader {
    store: Arc<dyn VectorStore>,
    config: UploadConfig,
}

impl Uploader {
    pub fn new(store: Arc<dyn VectorStore>, config: UploadConfig) -> Self {
        Self { store, config }
    }

    /// Upload `items` with their `vectors`, returning the number of points
    /// acknowledged.
    ///
    /// Batch `k` carries identifiers `k*B .. k*B + len - 1`. With
    /// `vector_name` set, vectors are stored as `{name: [...]}`.
    /// A failed batch aborts the upload; earlier batches stay written.
    #[instrument(skip(self, items, vectors), fields(items = items.len()))]
    pub async fn upload(
        &self,
        collection: &str,
        items: &[Item],
        vectors: &[Vec<f32>],
        vector_name: Option<&str>,
    ) -> Result<usize> {
        if items.len() != vectors.len() {
            return Err(BenchError::SizeMismatch {
                items: items.len(),
                vectors: vectors.len(),
            });
        }
        let batch_size = self.config.batch_size;
        if batch_size == 0 {
            return Err(BenchError::Config("upload.batch_size must be > 0".into()));
        }

        let total = items.len();
        let mut uploaded = 0usize;

        for (batch_index, (item_batch, vector_batch)) in items
            .chunks(batch_size)
            .zip(vectors.chunks(batch_size))
            .enumerate()
        {
            let offset = (batch_index * batch_size) as PointId;
            let points = build_points(offset, item_batch, vector_batch, vector_name)?;
            if let Err(e) = self.upsert_batch(collection, &points, batch_index).await {
                warn!(
                    collection,
                    batch = batch_index,
                    offset,
                    uploaded,
                    total,
                    error = %e,
                    "upload aborted"
                );
                return Err(e);
            }

            let before = uploaded;
            uploaded += points.len();
            if crossed_progress(before, uploaded) {
                info!(collection, uploaded, total, "upload progress");
            }
        }

        info!(collection, uploaded, "upload complete");
        Ok(uploaded)
    }

    /// One batch, retried on transient failures when retry is enabled.
    async fn upsert_batch(&self, collection: &str, points: &[Point], batch_index: usize) -> Result<()> {
        let attempts = if self.config.enable_retry {
            self.config.max_retries.max(1)
        } else {
            1
        };

        let mut attempt = 1u32;
        loop {
            match self.store.upsert_points(collection, points).await {
                Ok(()) => {
                    metrics::UPSERT_BATCHES_TOTAL
                        .with_label_values(&[collection, "ok"])
                        .inc();
                    metrics::POINTS_UPLOADED_TOTAL
                        .with_label_values(&[collection])
                        .inc_by(points.len() as u64);
                    debug!(collection, batch = batch_index, points = points.len(), attempt, "batch upserted");
                    return Ok(());
                }
                Err(e) => {
                    metrics::UPSERT_BATCHES_TOTAL
                        .with_label_values(&[collection, "error"])
                        .inc();

                    let retryable = self.config.enable_retry && e.is_transient();
                    if !retryable || attempt >= attempts {
                        if retryable {
                            warn!(collection, batch = batch_index, attempts, error = %e, "batch failed after all attempts");
                        }
                        return Err(e);
                    }

                    let wait = self.backoff(attempt);
                    warn!(
                        collection,
                        batch = batch_index,
                        attempt,
                        attempts,
                        wait_secs = wait.as_secs_f64(),
                        error = %e,
                        "batch upsert failed, retrying"
                    );
                    metrics::UPSERT_RETRIES_TOTAL
                        .with_label_values(&[collection])
                        .inc();
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Delay before retry number `retry` (1-based): `initial_backoff * retry`.
    pub fn backoff(&self, retry: u32) -> Duration {
        Duration::try_from_secs_f64(self.config.initial_backoff_secs * retry as f64)
            .unwrap_or(Duration::ZERO)
    }
}

/// Whether going from `before` to `after` cumulative points passes a
/// multiple of the progress interval.
pub fn crossed_progress(before: usize, after: usize) -> bool {
    after / PROGRESS_INTERVAL > before / PROGRESS_INTERVAL
}

/// Pair items with vectors into points numbered from `offset`.
pub fn build_points(
    offset: PointId,
    items: &[Item],
    vectors: &[Vec<f32>],
    vector_name: Option<&str>,
) -> Result<Vec<Point>> {
    items
        .iter()
        .zip(vectors)
        .enumerate()
        .map(|(i, (item, vector))| {
            Ok(Point {
                id: offset + i as PointId,
                vector: PointVector::new(vector.clone(), vector_name),
                payload: item.payload()?,
            })
        })
        .collect()
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64) -> Item {
        Item {
            id,
            domain: "tech".into(),
            title: format!("title {id}"),
            description: "description".into(),
            metadata: Default::default(),
            extra: Default::default(),
        }
    }

    #[test]
    fn test_build_points_ids_and_vector_shape() {
        let items = vec![item(100), item(101)];
        let vectors = vec![vec![0.1, 0.2], vec![0.3, 0.4]];

        let points = build_points(10, &items, &vectors, None).unwrap();
        assert_eq!(points[0].id, 10);
        assert_eq!(points[1].id, 11);
        assert_eq!(points[1].vector, PointVector::Dense(vec![0.3, 0.4]));
        // payload carries the item's own id, not the point id
        assert_eq!(points[0].payload["id"], 100);

        let named = build_points(0, &items, &vectors, Some("dense")).unwrap();
        match &named[0].vector {
            PointVector::Named(map) => assert_eq!(map["dense"], vec![0.1, 0.2]),
            other => panic!("expected named vector, got {other:?}"),
        }
    }

    #[test]
    fn test_progress_fires_once_per_thousand() {
        let fired = |batch: usize, total: usize| -> Vec<usize> {
            let mut uploaded = 0;
            let mut at = Vec::new();
            while uploaded < total {
                let before = uploaded;
                uploaded = (uploaded + batch).min(total);
                if crossed_progress(before, uploaded) {
                    at.push(uploaded);
                }
            }
            at
        };

        assert_eq!(fired(50, 3000), vec![1000, 2000, 3000]);
        assert_eq!(fired(1000, 2500), vec![1000, 2000]);
        // batch sizes that do not divide 1000 still report once per thousand
        assert_eq!(fired(300, 2400), vec![1200, 2100]);
        assert_eq!(fired(700, 700), Vec::<usize>::new());
        assert!(!crossed_progress(0, 999));
        assert!(crossed_progress(999, 1000));
    }

    #[test]
    fn test_backoff_is_linear() {
        struct NoStore;
        #[async_trait::async_trait]
        impl VectorStore for NoStore {
            async fn collection_exists(&self, _: &str) -> Result<bool> {
                Ok(false)
            }
            async fn create_collection(&self, _: &str, _: &crate::types::CreateCollection) -> Result<()> {
                Ok(())
            }
            async fn delete_collection(&self, _: &str) -> Result<()> {
                Ok(())
            }
            async fn collection_info(&self, name: &str) -> Result<crate::types::CollectionInfo> {
                Err(BenchError::CollectionNotFound {
                    collection: name.into(),
                })
            }
            async fn upsert_points(&self, _: &str, _: &[Point]) -> Result<()> {
                Ok(())
            }
            async fn query_points(
                &self,
                _: &str,
                _: &crate::types::QueryRequest,
            ) -> Result<Vec<crate::types::ScoredPoint>> {
                Ok(Vec::new())
            }
        }

        let uploader = Uploader::new(
            Arc::new(NoStore),
            UploadConfig {
                batch_size: 5,
                enable_retry: true,
                max_retries: 3,
                initial_backoff_secs: 2.0,
            },
        );
        assert_eq!(uploader.backoff(1), Duration::from_secs(2));
        assert_eq!(uploader.backoff(2), Duration::from_secs(4));
        assert_eq!(uploader.backoff(3), Duration::from_secs(6));
    }
}
