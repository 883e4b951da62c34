//! `POST /v1/blacklist/check_hash`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use blacklist_reconciler::{BlacklistReconciler, ChainTableReader};
use obs_telemetry::Metrics;

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState<R> {
    pub reconciler: Arc<BlacklistReconciler<R>>,
}

/// Builds the blacklist HTTP surface's router. Mounted by the node binary
/// alongside whatever else shares its HTTP listener. Every response is
/// counted by status code on `metrics` — HTTP response codes are one of
/// the ambient counters the telemetry stack exports.
pub fn router<R>(reconciler: Arc<BlacklistReconciler<R>>, metrics: Arc<Metrics>) -> Router
where
    R: ChainTableReader + Send + Sync + 'static,
{
    Router::new()
        .route("/v1/blacklist/check_hash", post(check_hash))
        .with_state(AppState { reconciler })
        .layer(middleware::from_fn(move |req: Request, next: Next| {
            let metrics = metrics.clone();
            async move {
                let response = next.run(req).await;
                metrics.http_responses.with_label_values(&[response.status().as_str()]).inc();
                response
            }
        }))
        .layer(TraceLayer::new_for_http())
}

async fn check_hash<R>(State(state): State<AppState<R>>, body: Bytes) -> Result<Json<Value>, ApiError>
where
    R: ChainTableReader + Send + Sync + 'static,
{
    // An empty body is valid input; treat it as `{}` rather than a parse
    // error. The body carries no fields `check_hash` consumes, but a
    // non-empty, malformed body is still rejected.
    if !body.is_empty() {
        serde_json::from_slice::<Value>(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    }

    let result = state.reconciler.check_hash()?;
    Ok(Json(json!({
        "local_hash": result.local_hash,
        "onchain_hash": result.onchain_hash,
        "submitted_hash": result.submitted_hash,
        "msg": result.message,
    })))
}

/// Logs a warning if `addr` isn't bound to loopback — the blacklist
/// endpoint has no authentication of its own and is meant for local
/// tooling, not public exposure.
pub fn warn_if_not_loopback(addr: SocketAddr) {
    if !addr.ip().is_loopback() {
        tracing::warn!(%addr, "blacklist HTTP surface is bound to a non-loopback address");
    }
}
