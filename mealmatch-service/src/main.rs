use std::sync::Arc;

use mealmatch_service::config::{AppConfig, StoreBackend};
use mealmatch_service::store::{MemoryStore, PgStore, RecordStore};
use mealmatch_service::{build_router, AppState};
use mealmatch_shared::db::create_pool;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mealmatch_shared::middleware::init_tracing("mealmatch-service");

    let config = AppConfig::load()?;
    let port = config.port;

    let store: Arc<dyn RecordStore> = match config.store {
        StoreBackend::Postgres => {
            let pool = create_pool(&config.database_url, config.database_pool_size)?;
            Arc::new(PgStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store, data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let metrics_handle = mealmatch_shared::middleware::init_metrics()?;

    let state = Arc::new(AppState {
        store,
        config,
        metrics_handle,
    });
    let app = build_router(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "mealmatch-service starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
