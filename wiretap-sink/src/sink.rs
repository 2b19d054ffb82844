//! The sink boundary: where finished records leave the request path.
//!
//! `emit` is infallible by contract — a sink that fails internally reports
//! the failure on the diagnostic channel (`tracing`) and drops the record.
//! Nothing on this path may surface an error to the HTTP client.

use crate::record::AccessLogRecord;
use std::sync::{Arc, Mutex};

/// Destination for finished access-log records.
pub trait LogSink: Send + Sync {
    fn emit(&self, record: &AccessLogRecord);
}

/// Default sink: one structured `tracing` event per request.
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, record: &AccessLogRecord) {
        tracing::info!(
            target: "wiretap::access",
            request_id = %record.request_id,
            method = %record.method,
            path = %record.path,
            status = record.status,
            duration_ms = record.duration_ms,
            response_body = record.response_body.as_deref(),
            "access"
        );
    }
}

/// Fan-out to several sinks; each receives every record.
pub struct MultiSink {
    sinks: Vec<Arc<dyn LogSink>>,
}

impl MultiSink {
    pub fn new(sinks: Vec<Arc<dyn LogSink>>) -> Self {
        Self { sinks }
    }
}

impl LogSink for MultiSink {
    fn emit(&self, record: &AccessLogRecord) {
        for sink in &self.sinks {
            sink.emit(record);
        }
    }
}

/// In-memory capture sink for tests.
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<AccessLogRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn records(&self) -> Vec<AccessLogRecord> {
        self.records.lock().map(|g| g.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LogSink for MemorySink {
    fn emit(&self, record: &AccessLogRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
    }
}
