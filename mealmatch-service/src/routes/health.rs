use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;

use mealmatch_shared::{HealthCheck, HealthResponse, HealthStatus};

use crate::AppState;

/// Liveness plus a round trip to the record store.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Response {
    let backend = state.config.store.as_str();
    let check = match state.store.ping() {
        Ok(()) => HealthCheck::healthy(backend),
        Err(e) => HealthCheck::unhealthy(backend, e.to_string()),
    };

    let response = HealthResponse::healthy("mealmatch-service", env!("CARGO_PKG_VERSION"))
        .with_checks(vec![check]);

    let status = match response.status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };

    (status, Json(response)).into_response()
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    state.metrics_handle.render()
}
