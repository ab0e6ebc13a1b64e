//! Application state for dependency injection.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::aggregator::DetailAggregator;
use crate::clients::ProfileClient;
use crate::config::AccountConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub profile_client: Arc<dyn ProfileClient>,
    pub aggregator: Arc<DetailAggregator>,
    /// Cancelled on shutdown; requests derive child tokens from it
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Create new app state. The aggregator shares `profile_client` and is
    /// sized from `config`.
    pub fn new(
        profile_client: Arc<dyn ProfileClient>,
        shutdown: CancellationToken,
        config: &AccountConfig,
    ) -> Self {
        let aggregator = Arc::new(DetailAggregator::new(
            Arc::clone(&profile_client),
            config.max_concurrency,
        ));
        Self {
            profile_client,
            aggregator,
            shutdown,
        }
    }
}
