//! Dual-write report orchestration.
//!
//! Each generation request is announced on the broker first and only then sent
//! to the report service. A failed publish stops the request before the report
//! service is called; whatever the report service answers is returned as is.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use common::{AppError, AppResult};
use domain::{DateWindow, GenerationEnvelope, ReportScope};

use crate::clients::{DownstreamReply, ReportClient};
use crate::kafka::EventPublisher;

/// One report generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub scope: ReportScope,
    pub window: DateWindow,
    /// Request id, carried in the event and the downstream call
    pub correlation_id: String,
    /// Who asked for an organisation report, when known
    pub requested_by: Option<String>,
}

/// Publishes the report event, then calls the report service.
pub struct ReportOrchestrator {
    publisher: Arc<dyn EventPublisher>,
    reports: Arc<dyn ReportClient>,
    publish_timeout: Duration,
    generate_timeout: Duration,
}

impl ReportOrchestrator {
    pub fn new(
        publisher: Arc<dyn EventPublisher>,
        reports: Arc<dyn ReportClient>,
        publish_timeout: Duration,
        generate_timeout: Duration,
    ) -> Self {
        Self {
            publisher,
            reports,
            publish_timeout,
            generate_timeout,
        }
    }

    /// Run one generation.
    ///
    /// Fails with a broker error if the event is not acknowledged within the
    /// publish deadline, and with a report service error if the report service
    /// cannot be reached within the generation deadline. Every reply the report
    /// service does send, error statuses included, is returned unchanged.
    pub async fn generate(&self, request: GenerationRequest) -> AppResult<DownstreamReply> {
        let GenerationRequest {
            scope,
            window,
            correlation_id,
            requested_by,
        } = request;

        let envelope = GenerationEnvelope::new(&scope, &window, correlation_id.as_str(), requested_by);
        let key = scope.partition_key();

        match tokio::time::timeout(self.publish_timeout, self.publisher.publish(key, &envelope)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(request_id = %correlation_id, scope = scope.name(), key, "Report event not published: {}", e);
                return Err(e);
            }
            Err(_) => {
                warn!(request_id = %correlation_id, scope = scope.name(), key, "Report event publish timed out");
                return Err(AppError::broker(format!(
                    "publish timed out after {}s",
                    self.publish_timeout.as_secs_f32()
                )));
            }
        }

        let reply = tokio::time::timeout(
            self.generate_timeout,
            self.reports.generate(&scope, &window, &correlation_id),
        )
        .await
        .map_err(|_| {
            AppError::report_service(format!(
                "report service timed out after {}s",
                self.generate_timeout.as_secs_f32()
            ))
        })??;

        info!(
            request_id = %correlation_id,
            scope = scope.name(),
            key,
            status = reply.status,
            "Report generation forwarded"
        );
        Ok(reply)
    }
}
