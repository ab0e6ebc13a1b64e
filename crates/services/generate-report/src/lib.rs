//! Report generation composite.
//!
//! Every generation request is published to Kafka and then forwarded to the
//! report service, whose reply goes back to the caller unchanged.

pub mod clients;
pub mod config;
pub mod handlers;
pub mod kafka;
pub mod openapi;
pub mod orchestrator;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use common::shutdown_signal;

use crate::clients::HttpReportClient;
use crate::config::ReportConfig;
use crate::kafka::{ensure_topic, KafkaPublisher};
use crate::routes::create_router;
use crate::state::AppState;

/// Boxed error returned by the server entry points.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Run the service as an embedded component (for combined binary).
pub async fn run_embedded(host: &str, port: u16, shutdown: CancellationToken) -> Result<(), BoxError> {
    let config = ReportConfig::from_env();
    run_server_with_config(host, port, config, shutdown).await
}

/// Run the HTTP server with the given configuration until `shutdown` fires.
pub async fn run_server_with_config(
    host: &str,
    port: u16,
    config: ReportConfig,
    shutdown: CancellationToken,
) -> Result<(), BoxError> {
    // Topic setup never blocks startup
    ensure_topic(&config.kafka).await;

    let publisher = Arc::new(KafkaPublisher::new(&config.kafka, config.publish_timeout())?);
    let report_client = Arc::new(HttpReportClient::new(&config.report)?);
    info!(
        brokers = %config.kafka.bootstrap_servers(),
        topic = %config.kafka.topic,
        report = %config.report.base_url,
        "Report pipeline ready"
    );

    let state = AppState::new(publisher, report_client, &config);
    let app = create_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Generate-report listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    info!("Generate-report stopped");
    Ok(())
}
