//! Prometheus exposition for the poster
//!
//! Installs the global recorder for the `danbot_stats_*` metrics the SDK emits
//! and serves them next to a readiness-aware health check.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use danbot_stats::{Readiness, StatsClient};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return a handle for rendering metrics.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

#[derive(Clone)]
pub struct MetricsState {
    pub prometheus: PrometheusHandle,
    pub stats: Arc<StatsClient>,
}

pub fn build_router(state: MetricsState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// 200 while pending or ready, 503 once normalization has failed.
async fn health_handler(State(state): State<MetricsState>) -> impl IntoResponse {
    let readiness = state.stats.readiness();
    let status = match readiness {
        Readiness::Failed(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };
    let mut body = serde_json::json!({ "status": readiness.label() });
    match &readiness {
        Readiness::Ready(client) => body["client_id"] = client.id().into(),
        Readiness::Failed(e) => body["error"] = e.kind().code().into(),
        Readiness::Pending => {}
    }
    (status, axum::Json(body))
}

async fn metrics_handler(State(state): State<MetricsState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        state.prometheus.render(),
    )
}
