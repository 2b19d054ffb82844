//! Batched HTTP push sink — true no-op when disabled.
//!
//! When `enabled = false`, no channel or task is created and `emit` returns
//! immediately. When enabled, records are queued on a bounded channel and a
//! background task batches them into newline-delimited JSON POSTs. The
//! request path never blocks: on a full queue the record is dropped.

use crate::record::AccessLogRecord;
use crate::sink::LogSink;
use tokio::sync::mpsc;
use tokio::time::{Duration, interval};
use tracing::{debug, error};

use wiretap_core::config::PushSinkConfig;

pub struct PushSink {
    sender: Option<mpsc::Sender<AccessLogRecord>>,
}

impl PushSink {
    /// Must be called from within a tokio runtime when `config.enabled`.
    pub fn new(config: PushSinkConfig) -> Self {
        if !config.enabled {
            return Self { sender: None };
        }

        let (tx, rx) = mpsc::channel(10_000);
        tokio::spawn(Self::flush_loop(config, rx));
        Self { sender: Some(tx) }
    }

    /// No-op constructor for disabled push logging.
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    async fn flush_loop(config: PushSinkConfig, mut rx: mpsc::Receiver<AccessLogRecord>) {
        let client = reqwest::Client::new();
        let mut batch: Vec<AccessLogRecord> = Vec::with_capacity(config.batch_size);
        let mut flush_interval = interval(Duration::from_secs(config.flush_interval_secs));

        loop {
            tokio::select! {
                Some(record) = rx.recv() => {
                    batch.push(record);
                    if batch.len() >= config.batch_size {
                        Self::flush(&client, &config.endpoint, &mut batch).await;
                    }
                }
                _ = flush_interval.tick() => {
                    if !batch.is_empty() {
                        Self::flush(&client, &config.endpoint, &mut batch).await;
                    }
                }
            }
        }
    }

    async fn flush(client: &reqwest::Client, endpoint: &str, batch: &mut Vec<AccessLogRecord>) {
        if batch.is_empty() {
            return;
        }
        let mut body = String::new();
        for record in batch.iter() {
            body.push_str(&record.to_json_line());
            body.push('\n');
        }
        let count = batch.len();
        match client
            .post(endpoint)
            .header("Content-Type", "application/stream+json")
            .body(body)
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => {
                debug!(count, "Flushed access log records");
            }
            Ok(resp) => {
                error!(status = %resp.status(), "Access log push failed");
            }
            Err(e) => {
                error!(error = %e, "Access log push connection error");
            }
        }
        batch.clear();
    }
}

impl LogSink for PushSink {
    #[inline]
    fn emit(&self, record: &AccessLogRecord) {
        if let Some(ref sender) = self.sender {
            let _ = sender.try_send(record.clone());
        }
    }
}
