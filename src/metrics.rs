//! Prometheus metrics for the knowledge graph CLI.
//!
//! Exposes:
//! - `kg_rag_command_duration_seconds` (histogram)
//! - `kg_rag_command_total` (counter with status)
//! - `kg_rag_command_inflight` (gauge)
//! - `kg_rag_llm_requests_total` (counter by call site and status)
//! - `kg_rag_extraction_fallbacks_total` (counter)
//! - process metrics via `process` collector

use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use once_cell::sync::Lazy;
use prometheus::process_collector::ProcessCollector;
use prometheus::{
    default_registry, register_histogram_vec, register_int_counter,
    register_int_counter_vec, register_int_gauge_vec, Encoder, HistogramVec, IntCounter,
    IntCounterVec, IntGaugeVec, TextEncoder,
};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

static PROCESS_COLLECTOR: Lazy<()> = Lazy::new(|| {
    if let Err(err) = default_registry().register(Box::new(ProcessCollector::for_self())) {
        warn!("Failed to register process collector: {}", err);
    }
});

static COMMAND_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    // Exponential buckets from 50ms up to ~3 minutes.
    let buckets =
        prometheus::exponential_buckets(0.05, 2.0, 14).expect("failed to create histogram buckets");
    register_histogram_vec!(
        "kg_rag_command_duration_seconds",
        "CLI command duration in seconds",
        &["command"],
        buckets
    )
    .expect("failed to register command duration histogram")
});

static COMMAND_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "kg_rag_command_total",
        "Total command executions by status",
        &["command", "status"]
    )
    .expect("failed to register command counter")
});

static COMMAND_INFLIGHT: Lazy<IntGaugeVec> = Lazy::new(|| {
    register_int_gauge_vec!(
        "kg_rag_command_inflight",
        "Number of in-flight commands",
        &["command"]
    )
    .expect("failed to register inflight gauge")
});

static LLM_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "kg_rag_llm_requests_total",
        "Language model calls by call site and status",
        &["call_site", "status"]
    )
    .expect("failed to register llm request counter")
});

static EXTRACTION_FALLBACKS: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "kg_rag_extraction_fallbacks_total",
        "Chunks whose extraction reply could not be parsed"
    )
    .expect("failed to register extraction fallback counter")
});

/// Ensure collectors are registered.
fn init_collectors() {
    Lazy::force(&PROCESS_COLLECTOR);
    Lazy::force(&COMMAND_DURATION);
    Lazy::force(&COMMAND_TOTAL);
    Lazy::force(&COMMAND_INFLIGHT);
    Lazy::force(&LLM_REQUESTS);
    Lazy::force(&EXTRACTION_FALLBACKS);
}

/// Increment inflight gauge for a command.
pub fn record_command_start(command: &'static str) {
    init_collectors();
    COMMAND_INFLIGHT.with_label_values(&[command]).inc();
}

/// Record command completion with duration and status.
pub fn record_command_result(command: &'static str, duration: Duration, success: bool) {
    init_collectors();
    COMMAND_INFLIGHT.with_label_values(&[command]).dec();
    COMMAND_DURATION
        .with_label_values(&[command])
        .observe(duration.as_secs_f64());
    COMMAND_TOTAL
        .with_label_values(&[command, if success { "ok" } else { "error" }])
        .inc();
}

/// Count one language model call (`extraction`, `keywords`, `answer`).
pub fn record_llm_request(call_site: &'static str, success: bool) {
    LLM_REQUESTS
        .with_label_values(&[call_site, if success { "ok" } else { "error" }])
        .inc();
}

/// Count one extraction reply replaced by the empty result.
pub fn record_extraction_fallback() {
    EXTRACTION_FALLBACKS.inc();
}

async fn metrics_response() -> Result<Response<Full<Bytes>>, Infallible> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", err);
        let mut response = Response::new(Full::from("encode error"));
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        return Ok(response);
    }

    let mut response = Response::new(Full::from(buffer));
    if let Ok(value) = hyper::header::HeaderValue::from_str(encoder.format_type()) {
        response
            .headers_mut()
            .insert(hyper::header::CONTENT_TYPE, value);
    }
    Ok(response)
}

async fn handle_request(req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
    match req.uri().path() {
        "/metrics" => metrics_response().await,
        _ => {
            let mut response = Response::new(Full::new(Bytes::new()));
            *response.status_mut() = StatusCode::NOT_FOUND;
            Ok(response)
        }
    }
}

async fn serve(addr: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Prometheus metrics endpoint started");

    loop {
        let (stream, peer) = listener.accept().await?;
        let service = service_fn(handle_request);
        let io = TokioIo::new(stream);

        tokio::spawn(async move {
            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                warn!(?peer, "Metrics connection error: {}", err);
            }
        });
    }
}

/// Spawn the metrics HTTP endpoint on the given address.
pub fn spawn_metrics_server(addr: SocketAddr) {
    init_collectors();
    tokio::spawn(async move {
        if let Err(err) = serve(addr).await {
            error!(%addr, "Metrics server failed: {}", err);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn records_successful_command_metrics() {
        let cmd = "test_command_metrics_success";

        record_command_start(cmd);
        assert_eq!(COMMAND_INFLIGHT.with_label_values(&[cmd]).get(), 1);

        record_command_result(cmd, Duration::from_millis(120), true);

        assert_eq!(COMMAND_INFLIGHT.with_label_values(&[cmd]).get(), 0);
        assert_eq!(COMMAND_TOTAL.with_label_values(&[cmd, "ok"]).get(), 1);
        assert_eq!(
            COMMAND_DURATION
                .with_label_values(&[cmd])
                .get_sample_count(),
            1
        );
    }

    #[test]
    fn records_failed_command_metrics() {
        let cmd = "test_command_metrics_error";

        record_command_start(cmd);
        record_command_result(cmd, Duration::from_secs(2), false);

        assert_eq!(COMMAND_TOTAL.with_label_values(&[cmd, "error"]).get(), 1);
    }

    #[test]
    fn llm_requests_are_counted_per_call_site() {
        let before_ok = LLM_REQUESTS.with_label_values(&["answer", "ok"]).get();
        let before_err = LLM_REQUESTS.with_label_values(&["answer", "error"]).get();

        record_llm_request("answer", true);
        record_llm_request("answer", false);

        assert!(LLM_REQUESTS.with_label_values(&["answer", "ok"]).get() > before_ok);
        assert!(LLM_REQUESTS.with_label_values(&["answer", "error"]).get() > before_err);
    }

    #[test]
    fn extraction_fallbacks_are_counted() {
        let before = EXTRACTION_FALLBACKS.get();
        record_extraction_fallback();
        assert!(EXTRACTION_FALLBACKS.get() > before);
    }

    #[tokio::test]
    async fn metrics_response_contains_registered_metrics() {
        let cmd = "test_metrics_response";
        record_command_start(cmd);
        record_command_result(cmd, Duration::from_millis(10), true);
        record_extraction_fallback();

        let response = metrics_response().await.expect("metrics response");
        assert_eq!(response.status(), StatusCode::OK);

        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("collect metrics body")
            .to_bytes();
        let text = String::from_utf8(body_bytes.to_vec()).expect("utf-8 metrics body");
        assert!(text.contains("kg_rag_command_total"));
        assert!(text.contains("kg_rag_extraction_fallbacks_total"));
        assert!(text.contains(cmd));
    }

    #[tokio::test]
    async fn metrics_response_has_correct_content_type() {
        let response = metrics_response().await.expect("metrics response");

        let content_type = response.headers().get(hyper::header::CONTENT_TYPE);
        let ct_str = content_type.and_then(|v| v.to_str().ok()).unwrap_or_default();
        assert!(ct_str.contains("text/"));
    }
}
