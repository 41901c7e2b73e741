use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static::lazy_static! {
    pub static ref UPSERT_BATCHES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "quantbench_upsert_batches_total", "Upsert batch attempts", &["collection", "status"]
    ).unwrap();
    pub static ref UPSERT_RETRIES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "quantbench_upsert_retries_total", "Upsert batches retried after a transient failure",
        &["collection"]
    ).unwrap();
    pub static ref POINTS_UPLOADED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "quantbench_points_uploaded_total", "Points acknowledged by the service", &["collection"]
    ).unwrap();
    pub static ref QUERY_DURATION: HistogramVec = register_histogram_vec!(
        "quantbench_query_duration_seconds", "Query round-trip latency", &["collection"],
        vec![0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    ).unwrap();
    pub static ref QUERIES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "quantbench_queries_total", "Queries issued, warmups included", &["collection"]
    ).unwrap();
}

pub fn init() {
    lazy_static::initialize(&UPSERT_BATCHES_TOTAL);
    lazy_static::initialize(&UPSERT_RETRIES_TOTAL);
    lazy_static::initialize(&POINTS_UPLOADED_TOTAL);
    lazy_static::initialize(&QUERY_DURATION);
    lazy_static::initialize(&QUERIES_TOTAL);
}

/// Prometheus text exposition of every registered metric.
pub fn render() -> String {
    let mut buf = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buf) {
        tracing::warn!(error = %e, "failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buf).unwrap_or_default()
}
