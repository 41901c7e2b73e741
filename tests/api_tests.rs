mod common;

use std::sync::Arc;
use std::time::Duration;

use common::server::{client_for, client_with_timeout, start_fake_qdrant, TEST_API_KEY};
use common::{bench_config, embeddings, items, upload_config};

use quantbench::benchmark::LatencyBenchmark;
use quantbench::client::VectorStore;
use quantbench::collection::CollectionManager;
use quantbench::config::{CollectionConfig, QuantizationSettings};
use quantbench::error::BenchError;
use quantbench::types::{CollectionKind, QuantizationMethod, QueryRequest, DENSE_VECTOR_NAME};
use quantbench::uploader::Uploader;

#[tokio::test]
async fn test_hybrid_upload_and_info() {
    let (base_url, fake) = start_fake_qdrant().await;
    let store: Arc<dyn VectorStore> = Arc::new(client_for(&base_url, TEST_API_KEY));
    let embed = embeddings();

    let manager = CollectionManager::new(store.clone(), CollectionConfig::default(), embed.dimensions());
    manager
        .recreate("hybrid_docs", CollectionKind::Hybrid, None)
        .await
        .unwrap();
    assert!(manager.exists("hybrid_docs").await.unwrap());

    let spec = fake.spec("hybrid_docs").unwrap();
    assert_eq!(spec["vectors"]["dense"]["size"], 8);
    assert_eq!(spec["sparse_vectors"]["sparse"]["index"]["on_disk"], false);

    let corpus = items(7);
    let vectors = embed.encode_items(&corpus).unwrap();
    let uploaded = Uploader::new(store.clone(), upload_config(3, true, 3))
        .upload("hybrid_docs", &corpus, &vectors, Some(DENSE_VECTOR_NAME))
        .await
        .unwrap();
    assert_eq!(uploaded, 7);
    assert_eq!(fake.point_ids("hybrid_docs"), (0..7).collect::<Vec<_>>());

    // payload is the whole record, vectors are keyed by field name
    let point = fake.point("hybrid_docs", 4).unwrap();
    assert_eq!(point["payload"]["id"], 1004);
    assert_eq!(point["payload"]["domain"], "tech");
    assert_eq!(point["vector"]["dense"].as_array().unwrap().len(), 8);

    let info = manager.get_info("hybrid_docs").await.unwrap();
    assert_eq!(info.name, "hybrid_docs");
    assert_eq!(info.status, "green");
    assert_eq!(info.points_count, Some(7));
}

#[tokio::test]
async fn test_quantized_collection_wire_format() {
    let (base_url, fake) = start_fake_qdrant().await;
    let store: Arc<dyn VectorStore> = Arc::new(client_for(&base_url, TEST_API_KEY));
    let settings = QuantizationSettings::default();

    let manager = CollectionManager::new(store, CollectionConfig::default(), 8);
    let name = QuantizationMethod::Binary2Bit.collection_name();
    manager
        .recreate(
            &name,
            CollectionKind::Quantized,
            Some(settings.get(QuantizationMethod::Binary2Bit)),
        )
        .await
        .unwrap();

    let spec = fake.spec(&name).unwrap();
    assert_eq!(spec["vectors"]["size"], 8);
    assert_eq!(spec["vectors"]["on_disk"], true);
    assert_eq!(spec["quantization_config"]["binary"]["encoding"], "two_bits");
}

#[tokio::test]
async fn test_query_and_latency_against_service() {
    let (base_url, _fake) = start_fake_qdrant().await;
    let store: Arc<dyn VectorStore> = Arc::new(client_for(&base_url, TEST_API_KEY));
    let embed = embeddings();

    CollectionManager::new(store.clone(), CollectionConfig::default(), 8)
        .create_standard("docs")
        .await
        .unwrap();
    let corpus = items(12);
    let vectors = embed.encode_items(&corpus).unwrap();
    Uploader::new(store.clone(), upload_config(5, false, 1))
        .upload("docs", &corpus, &vectors, None)
        .await
        .unwrap();

    let hits = store
        .query_points(
            "docs",
            &QueryRequest {
                query: vectors[0].clone(),
                limit: 4,
                using: None,
                params: None,
            },
        )
        .await
        .unwrap();
    let ids: Vec<u64> = hits.iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3]);

    let bench = LatencyBenchmark::new(store, embed, bench_config(true));
    let bundle = bench
        .measure_latency(
            "docs",
            &["first query".to_string(), "second query".to_string()],
            None,
            None,
            "Baseline",
        )
        .await
        .unwrap();
    assert!(bundle.avg > 0.0);
    assert!(bundle.p50 <= bundle.p99);
}

#[tokio::test]
async fn test_missing_collection_info() {
    let (base_url, _fake) = start_fake_qdrant().await;
    let client = client_for(&base_url, TEST_API_KEY);

    assert!(!client.collection_exists("ghost").await.unwrap());
    let err = client.collection_info("ghost").await.unwrap_err();
    assert!(matches!(
        err,
        BenchError::CollectionNotFound { ref collection } if collection == "ghost"
    ));
}

#[tokio::test]
async fn test_bad_api_key_is_remote_error() {
    let (base_url, _fake) = start_fake_qdrant().await;
    let client = client_for(&base_url, "wrong-key");

    let err = client.collection_exists("docs").await.unwrap_err();
    assert!(matches!(err, BenchError::Remote { status: 401, .. }));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_refused_connection_is_transient() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(&format!("http://{addr}"), TEST_API_KEY);
    let err = client.collection_exists("docs").await.unwrap_err();
    assert!(matches!(err, BenchError::Transport(_)), "got {err:?}");
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_slow_service_is_timeout() {
    let (base_url, fake) = start_fake_qdrant().await;
    fake.slow_down_exists(Duration::from_secs(3));

    let client = client_with_timeout(&base_url, TEST_API_KEY, 1);
    let err = client.collection_exists("docs").await.unwrap_err();
    assert!(matches!(err, BenchError::Timeout(_)), "got {err:?}");
    assert!(err.is_transient());
}
