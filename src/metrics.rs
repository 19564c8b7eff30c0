//! Prometheus metrics for Gearshift.
//!
//! Installs a global Prometheus recorder using `metrics-exporter-prometheus`,
//! defines metric name constants, provides a Tower-compatible middleware for
//! HTTP RED metrics, and exposes the `/metrics` endpoint handler.

use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;

// -- Metric name constants ----------------------------------------------------

/// Total HTTP requests (counter). Labels: method, path, status.
pub const HTTP_REQUESTS_TOTAL: &str = "gearshift_http_requests_total";

/// HTTP request duration in seconds (histogram). Labels: method, path.
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "gearshift_http_request_duration_seconds";

/// Total catalog and booking operations (counter). Labels: operation, status.
pub const OPERATIONS_TOTAL: &str = "gearshift_operations_total";

/// Total images written to object storage (counter).
pub const IMAGES_UPLOADED_TOTAL: &str = "gearshift_images_uploaded_total";

/// Total image bytes written to object storage (counter).
pub const UPLOAD_BYTES_TOTAL: &str = "gearshift_upload_bytes_total";

// -- Global recorder installation ---------------------------------------------

/// Singleton handle to the Prometheus recorder.
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus metrics recorder. Idempotent -- safe to call
/// multiple times (e.g. in tests). Returns a reference to the global handle.
pub fn init_metrics() -> &'static PrometheusHandle {
    PROMETHEUS_HANDLE.get_or_init(|| {
        PrometheusBuilder::new()
            .install_recorder()
            .expect("failed to install Prometheus recorder")
    })
}

/// Register metric descriptions with the global recorder. Call once after
/// `init_metrics()`.
pub fn describe_metrics() {
    describe_counter!(HTTP_REQUESTS_TOTAL, "Total HTTP requests");
    describe_histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        "HTTP request duration in seconds"
    );
    describe_counter!(OPERATIONS_TOTAL, "Total rental operations by type and outcome");
    describe_counter!(IMAGES_UPLOADED_TOTAL, "Total images stored");
    describe_counter!(UPLOAD_BYTES_TOTAL, "Total image bytes stored");
}

/// Count one service operation. `status` is `ok` or the error code.
pub fn record_operation(operation: &'static str, status: &'static str) {
    counter!(OPERATIONS_TOTAL, "operation" => operation, "status" => status).increment(1);
}

/// Count one stored image of `bytes` length.
pub fn record_upload(bytes: usize) {
    counter!(IMAGES_UPLOADED_TOTAL).increment(1);
    counter!(UPLOAD_BYTES_TOTAL).increment(bytes as u64);
}

// -- Metrics middleware -------------------------------------------------------

/// Axum middleware that records HTTP RED metrics for every request.
///
/// Excludes `/metrics` from self-instrumentation to avoid feedback loops.
/// Must be the outermost layer so it captures the full request lifecycle.
pub async fn metrics_middleware(
    req: Request<axum::body::Body>,
    next: axum::middleware::Next,
) -> Response {
    // Do not instrument the metrics endpoint itself.
    if req.uri().path() == "/metrics" {
        return next.run(req).await;
    }

    let method = req.method().to_string();
    let path = normalize_path(req.uri().path());

    let start = Instant::now();
    let response = next.run(req).await;
    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!(HTTP_REQUESTS_TOTAL, "method" => method.clone(), "path" => path.clone(), "status" => status).increment(1);
    histogram!(HTTP_REQUEST_DURATION_SECONDS, "method" => method, "path" => path).record(duration);

    response
}

// -- Path normalization -------------------------------------------------------

/// Normalize an actual request path to a route template for metric labels.
///
/// Ids and object keys are replaced so label cardinality stays bounded.
///
/// Examples:
/// - `/api/v1/all-cars` -> `/api/v1/all-cars`
/// - `/api/v1/single-car/12` -> `/api/v1/single-car/{id}`
/// - `/uploads/gearshift-images/1-a-car.jpg` -> `/uploads/{key}`
/// - anything unrouted -> `/other`
fn normalize_path(path: &str) -> String {
    const STATIC_ROUTES: [&str; 8] = [
        "/health",
        "/metrics",
        "/openapi.json",
        "/api/v1/all-cars",
        "/api/v1/insert-car",
        "/api/v1/book-car",
        "/api/v1/book_car",
        "/api/v1/bookings_completed",
    ];
    const ID_ROUTES: [&str; 4] = [
        "/api/v1/single-car/",
        "/api/v1/edit-car/",
        "/api/v1/delete-car/",
        "/api/v1/delete-booking/",
    ];

    if STATIC_ROUTES.contains(&path) {
        return path.to_string();
    }
    if path.starts_with("/uploads/") {
        return "/uploads/{key}".to_string();
    }
    if path.starts_with("/gearshift-api-docs") {
        return "/gearshift-api-docs".to_string();
    }
    for prefix in ID_ROUTES {
        if let Some(rest) = path.strip_prefix(prefix) {
            if !rest.is_empty() && !rest.contains('/') {
                return format!("{prefix}{{id}}");
            }
        }
    }
    "/other".to_string()
}

// -- Metrics endpoint handler -------------------------------------------------

/// `GET /metrics` -- Render Prometheus exposition format text.
pub async fn metrics_handler() -> impl IntoResponse {
    let body = init_metrics().render();
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4")],
        body,
    )
}

// -- Tests --------------------------------------------------------------------
