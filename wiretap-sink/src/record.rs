//! The per-request access-log record.
//!
//! One record is created when a request enters the middleware and finalized
//! when the response has been produced. Records are handed to a [`crate::LogSink`]
//! and then dropped — nothing here is persisted or shared between requests.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single access-log record, emitted once per HTTP request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessLogRecord {
    /// ISO-8601 UTC timestamp (RFC 3339), set when the request arrives.
    pub timestamp: String,
    /// Value of the inbound `X-Request-Id` header, or a fresh UUIDv4.
    pub request_id: String,
    /// HTTP method (uppercase: `GET`, `POST`, …).
    pub method: String,
    /// Request path without the query string.
    pub path: String,
    /// Query parameters in wire order. Repeated keys appear once per value.
    pub query: Vec<(String, String)>,
    /// Request headers, multi-valued, names lowercased.
    pub headers: BTreeMap<String, Vec<String>>,
    /// HTTP response status code returned to the client.
    pub status: u16,
    /// Elapsed time in milliseconds (request received → response produced).
    pub duration_ms: f64,
    /// Response body copy. Present only when response capture is enabled;
    /// the field is omitted from serialized output otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_body: Option<String>,
}

impl AccessLogRecord {
    /// Create a record with the request-phase fields; response fields are
    /// filled in after the downstream handler returns.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            request_id: String::new(),
            method: method.into(),
            path: path.into(),
            query: Vec::new(),
            headers: BTreeMap::new(),
            status: 0,
            duration_ms: 0.0,
            response_body: None,
        }
    }

    /// First value of a request header, if recorded.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|vals| vals.first())
            .map(String::as_str)
    }

    /// Serialize to a compact JSON line suitable for log shipping.
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
