use anyhow::Context;
use configs::AppConfig;
use service::{storage::StoreError, Services};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{build_router, AppOptions, AppState};

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl+C; running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

/// Connect the store, bind, and serve until Ctrl+C.
pub async fn run(cfg: AppConfig) -> Result<(), StartupError> {
    let services = Services::connect(&cfg.store).await.map_err(|e| match e {
        StoreError::Config(m) => StartupError::InvalidConfig(m),
        other => StartupError::StoreUnavailable(other.to_string()),
    })?;
    info!(store = services.store.kind(), uri = %cfg.store.redacted_uri(), "store connected");

    let app = build_router(AppState::from(services), AppOptions { testing: cfg.server.testing });
    if cfg.server.testing {
        warn!("testing mode: remove-all routes are mounted");
    }

    let addr = cfg.server.bind_addr();
    let listener = TcpListener::bind(&addr).await.with_context(|| format!("bind {addr}"))?;
    info!(%addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server")?;
    info!("server stopped");
    Ok(())
}
