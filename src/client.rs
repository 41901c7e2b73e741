//! Boundary to the remote vector search service.
//!
//! Everything above this module talks to a `VectorStore`; `QdrantClient` is the
//! REST implementation used by the binary. Tests substitute in-memory doubles.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::ConnectionConfig;
use crate::error::{BenchError, Result};
use crate::types::{CollectionInfo, CreateCollection, Point, QueryRequest, ScoredPoint};

/// Collection lifecycle, point upsert, and query calls against a vector service.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn collection_exists(&self, name: &str) -> Result<bool>;

    async fn create_collection(&self, name: &str, spec: &CreateCollection) -> Result<()>;

    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Fails with `CollectionNotFound` if the collection is absent.
    async fn collection_info(&self, name: &str) -> Result<CollectionInfo>;

    /// Upsert one batch of points as a single call.
    async fn upsert_points(&self, name: &str, points: &[Point]) -> Result<()>;

    /// Run a similarity query, returning hits in rank order.
    async fn query_points(&self, name: &str, request: &QueryRequest) -> Result<Vec<ScoredPoint>>;
}

/// Standard response envelope: `{"result": ..., "status": ..., "time": ...}`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct ExistsResult {
    exists: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    points: Vec<ScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct InfoResult {
    status: String,
    #[serde(default)]
    points_count: Option<u64>,
    #[serde(default)]
    indexed_vectors_count: Option<u64>,
}

/// REST client for a Qdrant deployment.
pub struct QdrantClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl QdrantClient {
    /// Build a client from validated connection settings.
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BenchError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let resp = request.header("api-key", &self.api_key).send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().await.unwrap_or_default();
        Err(BenchError::Remote {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let resp = self.send(request).await?;
        let envelope: Envelope<T> = resp.json().await?;
        Ok(envelope.result)
    }
}

#[async_trait]
impl VectorStore for QdrantClient {
    async fn collection_exists(&self, name: &str) -> Result<bool> {
        let result: ExistsResult = self
            .send_json(self.http.get(self.url(&format!("/collections/{name}/exists"))))
            .await?;
        Ok(result.exists)
    }

    async fn create_collection(&self, name: &str, spec: &CreateCollection) -> Result<()> {
        self.send(
            self.http
                .put(self.url(&format!("/collections/{name}")))
                .json(spec),
        )
        .await?;
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.send(self.http.delete(self.url(&format!("/collections/{name}"))))
            .await?;
        Ok(())
    }

    async fn collection_info(&self, name: &str) -> Result<CollectionInfo> {
        let result = self
            .send_json::<InfoResult>(self.http.get(self.url(&format!("/collections/{name}"))))
            .await;
        match result {
            Ok(info) => Ok(CollectionInfo {
                name: name.to_string(),
                status: info.status,
                points_count: info.points_count,
                indexed_vectors_count: info.indexed_vectors_count,
            }),
            Err(BenchError::Remote { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Err(BenchError::CollectionNotFound {
                    collection: name.to_string(),
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn upsert_points(&self, name: &str, points: &[Point]) -> Result<()> {
        debug!(collection = name, points = points.len(), "upserting batch");
        self.send(
            self.http
                .put(self.url(&format!("/collections/{name}/points?wait=true")))
                .json(&serde_json::json!({ "points": points })),
        )
        .await?;
        Ok(())
    }

    async fn query_points(&self, name: &str, request: &QueryRequest) -> Result<Vec<ScoredPoint>> {
        let result: QueryResult = self
            .send_json(
                self.http
                    .post(self.url(&format!("/collections/{name}/points/query")))
                    .json(request),
            )
            .await?;
        Ok(result.points)
    }
}
