use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::time::Instant;

use quantbench::client::VectorStore;
use quantbench::error::{BenchError, Result};
use quantbench::types::{
    CollectionInfo, CreateCollection, Point, PointId, PointVector, QueryRequest, ScoredPoint,
};

/// One recorded call against the scripted store.
#[derive(Debug, Clone)]
pub enum Call {
    Exists(String),
    Create(String, CreateCollection),
    Delete(String),
    Info(String),
    Upsert {
        collection: String,
        ids: Vec<PointId>,
        vectors: Vec<PointVector>,
        at: Instant,
    },
    Query {
        collection: String,
        request: QueryRequest,
    },
}

/// In-memory `VectorStore` that records every call, fails upserts on a
/// script, and answers queries with fixed per-collection hit lists.
#[derive(Default)]
pub struct ScriptedStore {
    calls: Mutex<Vec<Call>>,
    collections: Mutex<HashMap<String, CreateCollection>>,
    upsert_script: Mutex<VecDeque<Option<BenchError>>>,
    query_hits: Mutex<HashMap<String, Vec<PointId>>>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue errors returned by the next upsert calls, in order.
    pub fn fail_upserts(&self, errors: impl IntoIterator<Item = BenchError>) {
        self.script_upserts(errors.into_iter().map(Some));
    }

    /// Queue per-call upsert outcomes; `None` succeeds. Unscripted calls succeed.
    pub fn script_upserts(&self, outcomes: impl IntoIterator<Item = Option<BenchError>>) {
        self.upsert_script.lock().unwrap().extend(outcomes);
    }

    /// Every query against `collection` returns these ids in order.
    pub fn set_query_hits(&self, collection: &str, ids: &[PointId]) {
        self.query_hits
            .lock()
            .unwrap()
            .insert(collection.to_string(), ids.to_vec());
    }

    /// Pretend `name` already exists.
    pub fn seed_collection(&self, name: &str, spec: CreateCollection) {
        self.collections
            .lock()
            .unwrap()
            .insert(name.to_string(), spec);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn upserts(&self) -> Vec<(Vec<PointId>, Instant)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Upsert { ids, at, .. } => Some((ids, at)),
                _ => None,
            })
            .collect()
    }

    pub fn queries(&self) -> Vec<(String, QueryRequest)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Query {
                    collection,
                    request,
                } => Some((collection, request)),
                _ => None,
            })
            .collect()
    }

    pub fn created(&self, name: &str) -> Option<CreateCollection> {
        self.collections.lock().unwrap().get(name).cloned()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl VectorStore for ScriptedStore {
    async fn collection_exists(&self, name: &str) -> Result<bool> {
        self.record(Call::Exists(name.to_string()));
        Ok(self.collections.lock().unwrap().contains_key(name))
    }

    async fn create_collection(&self, name: &str, spec: &CreateCollection) -> Result<()> {
        self.record(Call::Create(name.to_string(), spec.clone()));
        self.collections
            .lock()
            .unwrap()
            .insert(name.to_string(), spec.clone());
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.record(Call::Delete(name.to_string()));
        self.collections.lock().unwrap().remove(name);
        Ok(())
    }

    async fn collection_info(&self, name: &str) -> Result<CollectionInfo> {
        self.record(Call::Info(name.to_string()));
        if !self.collections.lock().unwrap().contains_key(name) {
            return Err(BenchError::CollectionNotFound {
                collection: name.to_string(),
            });
        }
        Ok(CollectionInfo {
            name: name.to_string(),
            status: "green".to_string(),
            points_count: Some(0),
            indexed_vectors_count: Some(0),
        })
    }

    async fn upsert_points(&self, name: &str, points: &[Point]) -> Result<()> {
        self.record(Call::Upsert {
            collection: name.to_string(),
            ids: points.iter().map(|p| p.id).collect(),
            vectors: points.iter().map(|p| p.vector.clone()).collect(),
            at: Instant::now(),
        });
        match self.upsert_script.lock().unwrap().pop_front().flatten() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn query_points(&self, name: &str, request: &QueryRequest) -> Result<Vec<ScoredPoint>> {
        self.record(Call::Query {
            collection: name.to_string(),
            request: request.clone(),
        });
        let hits = self
            .query_hits
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or_default();
        Ok(hits
            .into_iter()
            .take(request.limit)
            .enumerate()
            .map(|(rank, id)| ScoredPoint {
                id,
                score: 1.0 - rank as f32 * 0.01,
            })
            .collect())
    }
}
