use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::{StructuredLogger, TracingLogger};
use configs::{AppConfig, StorageConfig};
use tokio::net::TcpListener;
use tracing::info;

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;
use service::{
    file::sighting_store::SightingStore,
    runtime,
    sighting::SightingRepository,
    storage::WriteMode,
};

fn write_mode(storage: &StorageConfig) -> WriteMode {
    if storage.atomic_writes { WriteMode::Atomic } else { WriteMode::InPlace }
}

/// Open the record store and wire it into request state.
/// A malformed data file aborts startup instead of starting empty.
pub async fn build_state(
    storage: &StorageConfig,
    logger: Arc<dyn StructuredLogger>,
) -> Result<AppState, StartupError> {
    runtime::ensure_data_dir(&storage.data_file).await?;
    let store = SightingStore::open(storage.data_file.clone(), write_mode(storage))
        .await
        .map_err(|e| StartupError::Storage(e.to_string()))?;
    info!(path = %store.path().display(), records = store.len().await, "record store ready");
    let repo: Arc<dyn SightingRepository> = store;
    Ok(AppState::new(repo, logger))
}

/// Serve `app` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    Ok(())
}

async fn ctrl_c() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}

/// Public entry: build the app from `cfg` and run the HTTP server
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let logger: Arc<dyn StructuredLogger> = Arc::new(TracingLogger::from_env());
    let state = build_state(&cfg.storage, logger).await?;
    let app: Router = routes::build_router(state);

    let addr: SocketAddr = cfg
        .server
        .bind_addr()
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("{}: {e}", cfg.server.bind_addr())))?;
    info!(%addr, "starting sighting server");
    let listener = TcpListener::bind(addr).await?;
    serve(listener, app, ctrl_c()).await
}
