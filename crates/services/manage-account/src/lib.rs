//! Account management composite.
//!
//! Serves user lookups backed by the profile service, including the concurrent
//! batched details lookup used by other composites.

pub mod aggregator;
pub mod clients;
pub mod config;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use common::shutdown_signal;

use crate::clients::HttpProfileClient;
use crate::config::AccountConfig;
use crate::routes::create_router;
use crate::state::AppState;

/// Boxed error returned by the server entry points.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Run the service as an embedded component (for combined binary).
pub async fn run_embedded(host: &str, port: u16, shutdown: CancellationToken) -> Result<(), BoxError> {
    let config = AccountConfig::from_env();
    run_server_with_config(host, port, config, shutdown).await
}

/// Run the HTTP server with the given configuration until `shutdown` fires.
pub async fn run_server_with_config(
    host: &str,
    port: u16,
    config: AccountConfig,
    shutdown: CancellationToken,
) -> Result<(), BoxError> {
    let profile_client = Arc::new(HttpProfileClient::new(&config.profile)?);
    info!(
        profile = %config.profile.base_url,
        max_concurrency = config.max_concurrency,
        "Profile client ready"
    );

    let state = AppState::new(profile_client, shutdown.clone(), &config);
    let app = create_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Manage-account listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    info!("Manage-account stopped");
    Ok(())
}
