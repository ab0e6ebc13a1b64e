//! Combined binary for development - runs both composites in one process.

use std::future::Future;

use clap::{Parser, Subcommand};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use common::shutdown_signal;

#[derive(Parser)]
#[command(name = "composites")]
#[command(about = "Combined composite services binary for development")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run both services in a single process (development mode)
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        #[arg(long, default_value = "8080")]
        account_port: u16,
        #[arg(long, default_value = "8093")]
        report_port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            account_port,
            report_port,
        } => {
            info!("Starting combined services in development mode");
            info!("  Manage-account:  http://{}:{}", host, account_port);
            info!("  Generate-report: http://{}:{}", host, report_port);

            // One token stops both servers
            let shutdown = CancellationToken::new();

            let account_host = host.clone();
            let account_token = shutdown.clone();
            let account_handle = tokio::spawn(async move {
                if let Err(e) =
                    manage_account_lib::run_embedded(&account_host, account_port, account_token).await
                {
                    error!("Manage-account failed: {}", e);
                }
            });

            let report_host = host.clone();
            let report_token = shutdown.clone();
            let report_handle = tokio::spawn(async move {
                if let Err(e) =
                    generate_report_lib::run_embedded(&report_host, report_port, report_token).await
                {
                    error!("Generate-report failed: {}", e);
                }
            });

            supervise(shutdown_signal(shutdown.clone()), shutdown, account_handle, report_handle).await;
            info!("Combined services stopped");
        }
    }

    Ok(())
}

/// Wait for `signal` or for either service to exit, then cancel `shutdown` and
/// let both servers drain in-flight requests.
async fn supervise<S>(
    signal: S,
    shutdown: CancellationToken,
    mut account: JoinHandle<()>,
    mut report: JoinHandle<()>,
) where
    S: Future<Output = ()>,
{
    let mut account_done = false;
    let mut report_done = false;
    tokio::select! {
        _ = signal => {}
        _ = &mut account => {
            account_done = true;
            error!("Manage-account exited unexpectedly");
        }
        _ = &mut report => {
            report_done = true;
            error!("Generate-report exited unexpectedly");
        }
    }
    shutdown.cancel();

    if !account_done {
        if let Err(e) = account.await {
            error!("Manage-account task failed: {}", e);
        }
    }
    if !report_done {
        if let Err(e) = report.await {
            error!("Generate-report task failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Task that takes a while to finish once the token is cancelled.
    fn draining_server(token: CancellationToken, drained: Arc<AtomicBool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            token.cancelled().await;
            tokio::time::sleep(Duration::from_millis(50)).await;
            drained.store(true, Ordering::SeqCst);
        })
    }

    #[tokio::test]
    async fn test_signal_waits_for_both_servers_to_drain() {
        let shutdown = CancellationToken::new();
        let account_drained = Arc::new(AtomicBool::new(false));
        let report_drained = Arc::new(AtomicBool::new(false));

        let account = draining_server(shutdown.clone(), account_drained.clone());
        let report = draining_server(shutdown.clone(), report_drained.clone());

        supervise(async {}, shutdown.clone(), account, report).await;

        assert!(shutdown.is_cancelled());
        assert!(account_drained.load(Ordering::SeqCst));
        assert!(report_drained.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_one_server_exiting_stops_the_other() {
        let shutdown = CancellationToken::new();
        let report_drained = Arc::new(AtomicBool::new(false));

        let account = tokio::spawn(async {});
        let report = draining_server(shutdown.clone(), report_drained.clone());

        supervise(std::future::pending(), shutdown.clone(), account, report).await;

        assert!(shutdown.is_cancelled());
        assert!(report_drained.load(Ordering::SeqCst));
    }
}
