//! Demo endpoints used to exercise the access-log middleware.
//!
//! Not part of the middleware itself — ordinary handlers that give the
//! tests (and the demo binary) something to log.

use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_extra::extract::Query;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Demo {
    pub name: String,
    pub age: u32,
    pub address: Vec<String>,
}

pub fn demo_router() -> Router {
    Router::new()
        .route("/get/test1", get(plain))
        .route("/get/sleep", get(sleep))
        .route("/get/demo", get(demo))
        .route("/get/fail", get(fail))
}

async fn plain() -> &'static str {
    "OK"
}

#[derive(Deserialize)]
struct SleepParams {
    time: u64,
}

/// Sleeps for `time` milliseconds, then echoes the count back.
async fn sleep(Query(params): Query<SleepParams>) -> String {
    tokio::time::sleep(Duration::from_millis(params.time)).await;
    params.time.to_string()
}

/// Echoes the query parameters back as JSON. `address` is multi-valued.
async fn demo(Query(demo): Query<Demo>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json;charset=UTF-8")],
        Json(demo),
    )
}

/// Always fails — exercises the failure-logging path.
async fn fail() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "handler failure")
}
