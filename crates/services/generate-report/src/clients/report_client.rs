//! HTTP client for the report service.
//!
//! Replies are passed back to callers untouched: any HTTP status the report
//! service answers with is a successful call here. Only transport failures and
//! unreadable bodies are errors.

use std::time::Duration;

use async_trait::async_trait;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use reqwest::{Method, Url};
use serde_json::{json, Value};
use tracing::debug;

use common::{AppError, AppResult, DownstreamConfig};
use domain::{normalize_id, DateWindow, ReportScope, ReportServiceResponse, HEADER_REQUEST_ID};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Status and JSON body as returned by the report service.
#[derive(Debug, Clone, PartialEq)]
pub struct DownstreamReply {
    pub status: u16,
    pub body: Value,
}

impl DownstreamReply {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }
}

impl IntoResponse for DownstreamReply {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::BAD_GATEWAY);
        (status, Json(self.body)).into_response()
    }
}

/// Report service operations.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ReportClient: Send + Sync {
    /// Ask the report service to build a report for `scope` over `window`.
    ///
    /// Unbounded; callers apply their own deadline.
    async fn generate(
        &self,
        scope: &ReportScope,
        window: &DateWindow,
        correlation_id: &str,
    ) -> AppResult<DownstreamReply>;

    /// List reports generated for a user
    async fn list_for_user(&self, user_id: &str, correlation_id: &str) -> AppResult<DownstreamReply>;

    /// Delete one report
    async fn delete(&self, report_id: &str, correlation_id: &str) -> AppResult<DownstreamReply>;
}

/// reqwest-backed [`ReportClient`].
#[derive(Debug, Clone)]
pub struct HttpReportClient {
    client: reqwest::Client,
    base_url: String,
    /// Per-request timeout for list and delete
    timeout: Duration,
}

impl HttpReportClient {
    /// Create a client for the report service at `config.base_url`.
    pub fn new(config: &DownstreamConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Base URL with `segments` appended, each percent-encoded as one segment.
    fn url(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| AppError::internal(format!("invalid report service url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::internal(format!("report service url has no path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request and capture status and body.
    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        correlation_id: &str,
        body: Option<Value>,
        timeout: Option<Duration>,
    ) -> AppResult<DownstreamReply> {
        let url = self.url(segments)?;
        let mut request = self.client.request(method.clone(), url.clone());
        if !correlation_id.is_empty() {
            request = request.header(HEADER_REQUEST_ID, correlation_id);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::report_service(format!("report service request failed: {}", e)))?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::report_service(format!("report service response unreadable: {}", e)))?;

        debug!(%method, url = %url, status, "Report service replied");
        Ok(DownstreamReply::new(status, decode_body(&bytes)?))
    }
}

/// An empty body stands for the default response; anything else must be JSON.
fn decode_body(bytes: &[u8]) -> AppResult<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return serde_json::to_value(ReportServiceResponse::default())
            .map_err(|e| AppError::internal(e.to_string()));
    }
    serde_json::from_slice(bytes).map_err(|e| {
        AppError::report_service(format!(
            "report service returned invalid JSON: {}, raw={}",
            e,
            String::from_utf8_lossy(bytes)
        ))
    })
}

#[async_trait]
impl ReportClient for HttpReportClient {
    async fn generate(
        &self,
        scope: &ReportScope,
        window: &DateWindow,
        correlation_id: &str,
    ) -> AppResult<DownstreamReply> {
        let body = json!({
            "startDate": window.start_date,
            "endDate": window.end_date,
        });
        self.send(Method::POST, &scope.downstream_segments(), correlation_id, Some(body), None)
            .await
    }

    async fn list_for_user(&self, user_id: &str, correlation_id: &str) -> AppResult<DownstreamReply> {
        let user_id = normalize_id(user_id)?;
        self.send(Method::GET, &["report", "user", user_id], correlation_id, None, Some(self.timeout))
            .await
    }

    async fn delete(&self, report_id: &str, correlation_id: &str) -> AppResult<DownstreamReply> {
        let report_id = normalize_id(report_id)?;
        self.send(Method::DELETE, &["report", report_id], correlation_id, None, Some(self.timeout))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::Path,
        http::HeaderMap,
        routing::{get, post},
        Router,
    };
    use tokio_test::{assert_err, assert_ok};

    async fn generate_personal(
        Path(user_id): Path<String>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Response {
        match user_id.as_str() {
            "missing" => (
                StatusCode::NOT_FOUND,
                Json(json!({"success": false, "error": "user not found"})),
            )
                .into_response(),
            "silent" => StatusCode::OK.into_response(),
            "garbled" => (StatusCode::OK, "<html>").into_response(),
            _ => Json(json!({
                "success": true,
                "data": {
                    "reportUrl": format!("https://reports/{}.pdf", user_id),
                    "reportTitle": body["startDate"],
                    "taskCount": 3
                },
                "requestId": headers.get("x-request-id").and_then(|v| v.to_str().ok()),
            }))
            .into_response(),
        }
    }

    async fn spawn_report_stub() -> String {
        let app = Router::new()
            .route("/report/organisation", post(|| async { Json(json!({"success": true, "scope": "org"})) }))
            .route(
                "/report/team/:id",
                post(|Path(id): Path<String>| async move { Json(json!({"success": true, "team": id})) }),
            )
            .route(
                "/report/user/:id",
                get(|Path(id): Path<String>| async move { Json(json!({"success": true, "data": [{"userId": id}]})) }),
            )
            .route(
                "/report/:id",
                post(generate_personal).delete(|Path(id): Path<String>| async move {
                    match id.as_str() {
                        "rep-1" => StatusCode::NO_CONTENT.into_response(),
                        _ => Json(json!({"success": true, "deleted": id})).into_response(),
                    }
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base_url: &str) -> HttpReportClient {
        HttpReportClient::new(&DownstreamConfig::new(base_url, 5)).unwrap()
    }

    fn window() -> DateWindow {
        DateWindow::new("2024-01-01", "2024-01-31")
    }

    #[tokio::test]
    async fn test_generate_forwards_window_and_request_id() {
        let client = client(&spawn_report_stub().await);
        let scope = ReportScope::personal("u1").unwrap();

        let reply = assert_ok!(client.generate(&scope, &window(), "req-7").await);
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body["data"]["reportUrl"], "https://reports/u1.pdf");
        assert_eq!(reply.body["data"]["reportTitle"], "2024-01-01");
        assert_eq!(reply.body["requestId"], "req-7");
    }

    #[tokio::test]
    async fn test_generate_error_status_is_passed_through() {
        let client = client(&spawn_report_stub().await);
        let scope = ReportScope::personal("missing").unwrap();

        let reply = assert_ok!(client.generate(&scope, &window(), "r").await);
        assert_eq!(reply.status, 404);
        assert_eq!(reply.body, json!({"success": false, "error": "user not found"}));
    }

    #[tokio::test]
    async fn test_generate_scope_paths() {
        let client = client(&spawn_report_stub().await);

        let reply = assert_ok!(client.generate(&ReportScope::team("t1").unwrap(), &window(), "r").await);
        assert_eq!(reply.body["team"], "t1");

        let reply = assert_ok!(client.generate(&ReportScope::Organisation, &window(), "r").await);
        assert_eq!(reply.body["scope"], "org");
    }

    #[tokio::test]
    async fn test_empty_body_becomes_default_response() {
        let client = client(&spawn_report_stub().await);
        let scope = ReportScope::personal("silent").unwrap();

        let reply = assert_ok!(client.generate(&scope, &window(), "r").await);
        assert_eq!(reply.body["success"], false);
        assert_eq!(reply.body["data"]["taskCount"], 0);
    }

    #[tokio::test]
    async fn test_invalid_json_is_report_service_error() {
        let client = client(&spawn_report_stub().await);
        let scope = ReportScope::personal("garbled").unwrap();

        let err = assert_err!(client.generate(&scope, &window(), "r").await);
        assert_eq!(err.code(), "REPORT_SERVICE_ERROR");
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let client = client(&spawn_report_stub().await);

        let reply = assert_ok!(client.list_for_user("u5", "r").await);
        assert_eq!(reply.body["data"][0]["userId"], "u5");

        let reply = assert_ok!(client.delete("rep-1", "r").await);
        assert_eq!(reply.status, 204);
        assert_eq!(reply.body["success"], false);
    }

    #[tokio::test]
    async fn test_identifier_stays_one_path_segment() {
        let client = client(&spawn_report_stub().await);

        let scope = ReportScope::personal("u1/team?x=1").unwrap();
        let reply = assert_ok!(client.generate(&scope, &window(), "r").await);
        assert_eq!(reply.body["data"]["reportUrl"], "https://reports/u1/team?x=1.pdf");

        let reply = assert_ok!(client.delete("../team/x", "r").await);
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body["deleted"], "../team/x");
    }

    #[tokio::test]
    async fn test_blank_or_dot_identifier_rejected() {
        // Nothing listens here; a request would fail as REPORT_SERVICE_ERROR
        let client = client("http://127.0.0.1:1");

        let err = assert_err!(client.delete("  ", "r").await);
        assert_eq!(err.code(), "INVALID_BODY");
        let err = assert_err!(client.list_for_user("..", "r").await);
        assert_eq!(err.code(), "INVALID_BODY");
    }

    #[test]
    fn test_base_path_is_kept() {
        let client = client("http://reports.local/api/");
        let url = client.url(&["report", "a b"]).unwrap();
        assert_eq!(url.as_str(), "http://reports.local/api/report/a%20b");
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client(&format!("http://{}", addr));
        let err = assert_err!(client.list_for_user("u1", "r").await);
        assert_eq!(err.code(), "REPORT_SERVICE_ERROR");
    }

    #[tokio::test]
    async fn test_reply_into_response_keeps_status() {
        let response = DownstreamReply::new(404, json!({"success": false})).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
