//! MicroTrack dashboard - plant growth telemetry table and analytics
//!
//! Loads observations from the MicroTrack data API and serves a paginated,
//! sortable, searchable table plus six analytics charts behind a session guard.

pub mod analytics;
pub mod charts;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod io;
pub mod loader;
pub mod observation;
pub mod state;
pub mod table;

pub use config::{load_config, Config};
pub use error::{DashboardError, Result};

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::io::ReqwestHttpClient;
use crate::loader::DataLoader;

/// Run the dashboard service with the given configuration
pub async fn run(config: Config) -> Result<()> {
    let http: Arc<dyn io::HttpClient> = Arc::new(ReqwestHttpClient::new(io::REQUEST_TIMEOUT)?);
    let loader = Arc::new(DataLoader::new(&config.api, &config.display, http));
    let cancel = CancellationToken::new();

    // Initial load completes before the first request is served
    let rows = loader.load().await;
    let state = state::new_state_handle(rows);

    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Shutdown signal received"),
            Err(e) => tracing::error!("Failed to listen for ctrl-c: {}", e),
        }
        cancel_for_signal.cancel();
    });

    let router = dashboard::build_router(state, loader, config.session.clone());
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        DashboardError::Dashboard(format!(
            "Failed to bind dashboard to port {}: {}",
            config.server.port, e
        ))
    })?;
    tracing::info!("Dashboard listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            cancel.cancelled().await;
        })
        .await?;

    tracing::info!("Dashboard stopped");
    Ok(())
}
