//! MealMatch: campus meal posts, host-approved join requests,
//! compatibility-ranked matches and peer karma.

pub mod config;
pub mod matching;
pub mod models;
pub mod participation;
pub mod routes;
pub mod schema;
pub mod services;
pub mod store;

use std::sync::Arc;

use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;

use config::AppConfig;
use store::RecordStore;

pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub config: AppConfig,
    pub metrics_handle: PrometheusHandle,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    routes::router(state)
}
