//! Per-request access-log middleware.
//!
//! Install with [`axum::middleware::from_fn_with_state`]:
//!
//! ```ignore
//! let log = AccessLog::new(config.access_log.clone(), sink);
//! let app = router.layer(middleware::from_fn_with_state(log, record_request));
//! ```
//!
//! The middleware snapshots the request (method, path, headers, query,
//! request id) before delegating to the next handler, fills in status and
//! elapsed time afterwards, and emits exactly one record per request. The
//! response reaches the client byte-for-byte unchanged; when response
//! capture is enabled the body is buffered, copied into the record, and
//! restored from the same bytes.

use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use wiretap_core::config::AccessLogConfig;
use wiretap_sink::{AccessLogRecord, LogSink};

/// Shared middleware state: the immutable configuration plus the sink that
/// receives finished records.
pub struct AccessLog {
    pub config: AccessLogConfig,
    pub sink: Arc<dyn LogSink>,
}

impl AccessLog {
    pub fn new(config: AccessLogConfig, sink: Arc<dyn LogSink>) -> Arc<Self> {
        Arc::new(Self { config, sink })
    }
}

/// The middleware function. One record in, one record out, per request.
pub async fn record_request(
    State(log): State<Arc<AccessLog>>,
    request: Request,
    next: Next,
) -> Response {
    let mut record = AccessLogRecord::new(request.method().as_str(), request.uri().path());
    record.request_id = request_id(request.headers());
    record.query = parse_query(request.uri().query().unwrap_or(""));
    record.headers = collect_headers(request.headers());
    let start = Instant::now();

    let response = next.run(request).await;

    record.duration_ms = start.elapsed().as_secs_f64() * 1000.0;
    record.status = response.status().as_u16();

    if !log.config.include_response {
        log.sink.emit(&record);
        return response;
    }

    // Buffer the body so it can be both recorded and delivered. The record
    // gets a capped copy; the client gets the original bytes.
    let (parts, body) = response.into_parts();
    match to_bytes(body, usize::MAX).await {
        Ok(bytes) => {
            record.response_body = Some(logged_copy(&bytes, log.config.max_body_bytes));
            log.sink.emit(&record);
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(e) => {
            // The body was already undeliverable; record what was observed.
            tracing::error!(error = %e, "Failed to read response body for access log");
            log.sink.emit(&record);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Inbound `X-Request-Id` when present, fresh UUIDv4 otherwise. The response
/// is never mutated, so the id is recorded but not echoed back.
fn request_id(headers: &HeaderMap) -> String {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Query string → pairs, repeated keys preserved in wire order.
fn parse_query(query: &str) -> Vec<(String, String)> {
    if query.is_empty() {
        return Vec::new();
    }
    serde_urlencoded::from_str(query).unwrap_or_default()
}

/// All request headers, multi-valued, names lowercased.
fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, Vec<String>> {
    let mut out: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        out.entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    out
}

/// UTF-8 (lossy) copy of the body for the record, capped at `max` bytes.
/// Only the logged copy is truncated — never the delivered response.
fn logged_copy(bytes: &[u8], max: usize) -> String {
    let end = bytes.len().min(max);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
