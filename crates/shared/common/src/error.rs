//! Unified error handling for the composite services.
//!
//! Every request-level failure becomes an [`AppError`], rendered as
//! `{"success": false, "error": {"code", "message"}}` with a status that lets
//! clients tell validation, broker and downstream failures apart.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::DomainError;
use serde::Serialize;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Validation
    #[error("{0}")]
    Validation(String),

    // Broker
    #[error("{0}")]
    BrokerPublish(String),

    #[cfg(feature = "kafka")]
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    // Downstream services
    #[error("{0}")]
    ReportService(String),

    #[error("{service} unreachable: {message}")]
    Upstream { service: String, message: String },

    #[error("{service} responded with status {status}")]
    UpstreamStatus { service: String, status: u16 },

    #[error("Service unavailable")]
    ServiceUnavailable(String),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body for HTTP
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "INVALID_BODY",
            AppError::BrokerPublish(_) => "KAFKA_PUBLISH_FAILED",
            #[cfg(feature = "kafka")]
            AppError::Kafka(_) => "KAFKA_PUBLISH_FAILED",
            AppError::ReportService(_) => "REPORT_SERVICE_ERROR",
            AppError::Upstream { .. } => "UPSTREAM_ERROR",
            AppError::UpstreamStatus { .. } => "UPSTREAM_STATUS",
            AppError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::BrokerPublish(_) | AppError::ReportService(_) | AppError::Upstream { .. } => {
                StatusCode::BAD_GATEWAY
            }
            #[cfg(feature = "kafka")]
            AppError::Kafka(_) => StatusCode::BAD_GATEWAY,
            AppError::UpstreamStatus { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            // Show full message for client and broker/report errors
            AppError::Validation(msg) => msg.clone(),
            AppError::BrokerPublish(msg) => {
                tracing::error!("Broker publish failed: {}", msg);
                msg.clone()
            }
            #[cfg(feature = "kafka")]
            AppError::Kafka(e) => {
                tracing::error!("Kafka error: {:?}", e);
                e.to_string()
            }
            AppError::ReportService(msg) => {
                tracing::error!("Report service error: {}", msg);
                msg.clone()
            }

            // Hide transport details for other upstreams
            AppError::Upstream { service, message } => {
                tracing::error!(service = %service, "Upstream error: {}", message);
                format!("failed to reach {} service", service)
            }
            AppError::UpstreamStatus { service, status } => {
                tracing::warn!(service = %service, status, "Upstream returned error status");
                format!("failed to fetch from {} service", service)
            }
            AppError::ServiceUnavailable(service) => {
                tracing::error!("Service unavailable: {}", service);
                format!("Service {} is unavailable", service)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
        }
    }
}

// =============================================================================
// HTTP Response (Axum)
// =============================================================================

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            success: false,
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.user_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::Validation(msg),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    pub fn broker(msg: impl Into<String>) -> Self {
        AppError::BrokerPublish(msg.into())
    }

    pub fn report_service(msg: impl Into<String>) -> Self {
        AppError::ReportService(msg.into())
    }

    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Upstream {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn upstream_status(service: impl Into<String>, status: u16) -> Self {
        AppError::UpstreamStatus {
            service: service.into(),
            status,
        }
    }

    pub fn service_unavailable(service: impl Into<String>) -> Self {
        AppError::ServiceUnavailable(service.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broker_error_renders_distinct_code() {
        let response = AppError::broker("broker down").into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "KAFKA_PUBLISH_FAILED");
        assert_eq!(json["error"]["message"], "broker down");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::report_service("x").status(), StatusCode::BAD_GATEWAY);
        assert_eq!(AppError::upstream("profile", "x").status(), StatusCode::BAD_GATEWAY);
        assert_eq!(AppError::upstream_status("profile", 404).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::upstream_status("profile", 42).status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_report_and_broker_codes_differ() {
        assert_ne!(AppError::broker("x").code(), AppError::report_service("x").code());
    }

    #[test]
    fn test_internal_message_is_hidden() {
        let err = AppError::internal("secret connection string");
        assert_eq!(err.user_message(), "An internal error occurred");
    }

    #[test]
    fn test_domain_validation_maps_to_invalid_body() {
        let err: AppError = DomainError::validation("identifier must not be empty").into();
        assert_eq!(err.code(), "INVALID_BODY");
    }
}
