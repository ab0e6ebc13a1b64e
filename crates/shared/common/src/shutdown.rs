//! Graceful shutdown.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Resolve on Ctrl-C, SIGTERM (unix) or when `token` is cancelled elsewhere.
///
/// The token is cancelled in every case so in-flight work holding a child
/// token (aggregations, downstream calls) is abandoned with the server.
pub async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl-C received, shutting down"),
            Err(e) => {
                warn!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("SIGTERM received, shutting down");
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
        _ = token.cancelled() => {}
    }
    token.cancel();
}
