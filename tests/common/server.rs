use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use quantbench::client::QdrantClient;
use quantbench::config::ConnectionConfig;

pub const TEST_API_KEY: &str = "test-key";

#[derive(Default)]
struct FakeCollection {
    spec: Value,
    points: BTreeMap<u64, Value>,
}

/// Shared state of the fake service, readable from tests.
#[derive(Clone, Default)]
pub struct FakeQdrant {
    collections: Arc<Mutex<HashMap<String, FakeCollection>>>,
    exists_delay: Arc<Mutex<Option<Duration>>>,
}

impl FakeQdrant {
    /// Hold every exists call for `delay` before answering.
    pub fn slow_down_exists(&self, delay: Duration) {
        *self.exists_delay.lock().unwrap() = Some(delay);
    }

    pub fn point_ids(&self, collection: &str) -> Vec<u64> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .map(|c| c.points.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn spec(&self, collection: &str) -> Option<Value> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .map(|c| c.spec.clone())
    }

    pub fn point(&self, collection: &str, id: u64) -> Option<Value> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .and_then(|c| c.points.get(&id).cloned())
    }
}

fn ok(result: Value) -> Response {
    Json(json!({ "result": result, "status": "ok", "time": 0.0 })).into_response()
}

fn not_found(name: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "status": { "error": format!("Collection `{name}` doesn't exist!") } })),
    )
        .into_response()
}

async fn require_api_key(request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get("api-key")
        .and_then(|v| v.to_str().ok())
        == Some(TEST_API_KEY);
    if !authorized {
        return (StatusCode::UNAUTHORIZED, "Invalid api-key").into_response();
    }
    next.run(request).await
}

async fn collection_exists(State(state): State<FakeQdrant>, Path(name): Path<String>) -> Response {
    let delay = *state.exists_delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    let exists = state.collections.lock().unwrap().contains_key(&name);
    ok(json!({ "exists": exists }))
}

async fn create_collection(
    State(state): State<FakeQdrant>,
    Path(name): Path<String>,
    Json(spec): Json<Value>,
) -> Response {
    state.collections.lock().unwrap().insert(
        name,
        FakeCollection {
            spec,
            points: BTreeMap::new(),
        },
    );
    ok(json!(true))
}

async fn delete_collection(State(state): State<FakeQdrant>, Path(name): Path<String>) -> Response {
    let existed = state.collections.lock().unwrap().remove(&name).is_some();
    ok(json!(existed))
}

async fn collection_info(State(state): State<FakeQdrant>, Path(name): Path<String>) -> Response {
    let collections = state.collections.lock().unwrap();
    match collections.get(&name) {
        Some(c) => ok(json!({
            "status": "green",
            "points_count": c.points.len(),
            "indexed_vectors_count": 0,
            "config": { "params": c.spec },
        })),
        None => not_found(&name),
    }
}

async fn upsert_points(
    State(state): State<FakeQdrant>,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut collections = state.collections.lock().unwrap();
    let Some(collection) = collections.get_mut(&name) else {
        return not_found(&name);
    };
    let Some(points) = body["points"].as_array() else {
        return (StatusCode::BAD_REQUEST, "missing points").into_response();
    };
    for point in points {
        let Some(id) = point["id"].as_u64() else {
            return (StatusCode::BAD_REQUEST, "bad point id").into_response();
        };
        collection.points.insert(id, point.clone());
    }
    ok(json!({ "operation_id": 0, "status": "completed" }))
}

/// Returns the first `limit` stored points in id order with descending scores.
async fn query_points(
    State(state): State<FakeQdrant>,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let collections = state.collections.lock().unwrap();
    let Some(collection) = collections.get(&name) else {
        return not_found(&name);
    };
    let limit = body["limit"].as_u64().unwrap_or(10) as usize;
    let points: Vec<Value> = collection
        .points
        .keys()
        .take(limit)
        .enumerate()
        .map(|(rank, id)| json!({ "id": id, "version": 0, "score": 1.0 - rank as f64 * 0.01 }))
        .collect();
    ok(json!({ "points": points }))
}

pub fn build_router(state: FakeQdrant) -> Router {
    Router::new()
        .route("/collections/:name/exists", get(collection_exists))
        .route(
            "/collections/:name",
            get(collection_info)
                .put(create_collection)
                .delete(delete_collection),
        )
        .route("/collections/:name/points", put(upsert_points))
        .route("/collections/:name/points/query", post(query_points))
        .layer(middleware::from_fn(require_api_key))
        .with_state(state)
}

/// Start the fake service on an ephemeral port, returning (base_url, state).
pub async fn start_fake_qdrant() -> (String, FakeQdrant) {
    quantbench::metrics::init();

    let state = FakeQdrant::default();
    let app = build_router(state.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (base_url, state)
}

pub fn client_for(base_url: &str, api_key: &str) -> QdrantClient {
    client_with_timeout(base_url, api_key, 5)
}

pub fn client_with_timeout(base_url: &str, api_key: &str, timeout_secs: u64) -> QdrantClient {
    QdrantClient::new(&ConnectionConfig {
        url: base_url.to_string(),
        api_key: api_key.to_string(),
        timeout_secs,
    })
    .unwrap()
}
