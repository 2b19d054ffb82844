//! App assembly: sink selection, middleware installation, serving.

use axum::{Router, middleware};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use wiretap_core::config::{AccessLogConfig, AppConfig};
use wiretap_middleware::{AccessLog, record_request};
use wiretap_sink::{FileSink, LogSink, MultiSink, PushSink, TracingSink};

use crate::demo::demo_router;

/// Build the sink stack from configuration: file and push sinks when
/// enabled (fanned out), the tracing sink otherwise.
pub fn make_sink(config: &AccessLogConfig) -> Arc<dyn LogSink> {
    let mut sinks: Vec<Arc<dyn LogSink>> = Vec::new();

    if config.file.enabled {
        match FileSink::new(config.file.clone()) {
            Ok(sink) => sinks.push(Arc::new(sink)),
            Err(e) => error!(error = %e, "Failed to open access log file, sink skipped"),
        }
    }
    if config.push.enabled {
        sinks.push(Arc::new(PushSink::new(config.push.clone())));
    }

    match sinks.len() {
        0 => Arc::new(TracingSink),
        1 => sinks.remove(0),
        _ => Arc::new(MultiSink::new(sinks)),
    }
}

/// The demo app wrapped with the access-log layer when enabled.
pub fn build_app(config: &AppConfig, sink: Arc<dyn LogSink>) -> Router {
    let router = demo_router();
    if !config.access_log.enabled {
        return router;
    }
    let log = AccessLog::new(config.access_log.clone(), sink);
    router.layer(middleware::from_fn_with_state(log, record_request))
}

/// Bind and serve until Ctrl-C.
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let sink = make_sink(&config.access_log);
    let app = build_app(&config, sink);

    let listener = TcpListener::bind(&config.server.addr).await?;
    info!(addr = %config.server.addr, "Wiretap demo server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Wiretap stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
