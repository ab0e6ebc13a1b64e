//! Application state for dependency injection.

use std::sync::Arc;

use crate::clients::ReportClient;
use crate::config::ReportConfig;
use crate::kafka::EventPublisher;
use crate::orchestrator::ReportOrchestrator;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ReportOrchestrator>,
    /// Used directly for list and delete, which publish nothing
    pub report_client: Arc<dyn ReportClient>,
}

impl AppState {
    /// Create new app state. Deadlines come from `config`.
    pub fn new(
        publisher: Arc<dyn EventPublisher>,
        report_client: Arc<dyn ReportClient>,
        config: &ReportConfig,
    ) -> Self {
        let orchestrator = Arc::new(ReportOrchestrator::new(
            publisher,
            Arc::clone(&report_client),
            config.publish_timeout(),
            config.generate_timeout(),
        ));
        Self {
            orchestrator,
            report_client,
        }
    }
}
