//! HTTP client for the profile service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use common::{AppError, DownstreamConfig};
use domain::{normalize_id, Department, Team, UserDetail, HEADER_REQUEST_ID};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Name used when reporting profile failures to clients.
const SERVICE_NAME: &str = "profile";

/// Failure of a single profile call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("invalid identifier: {0:?}")]
    InvalidId(String),

    #[error("profile service unreachable: {0}")]
    Transport(String),

    #[error("profile service responded with status {0}")]
    Status(u16),

    #[error("unexpected profile payload: {0}")]
    Decode(String),

    #[error("lookup cancelled")]
    Cancelled,
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::InvalidId(_) => AppError::validation(err.to_string()),
            FetchError::Status(status) => AppError::upstream_status(SERVICE_NAME, status),
            FetchError::Transport(msg) | FetchError::Decode(msg) => {
                AppError::upstream(SERVICE_NAME, msg)
            }
            FetchError::Cancelled => AppError::service_unavailable(SERVICE_NAME),
        }
    }
}

/// Optional filters for assignee lookups. Empty filters are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AssigneeFilter {
    pub role: Option<String>,
    pub team_id: Option<String>,
    pub department_id: Option<String>,
}

impl AssigneeFilter {
    fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("role", self.role.as_deref()),
            ("team_id", self.team_id.as_deref()),
            ("department_id", self.department_id.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (key, v))
        })
        .collect()
    }
}

/// Profile service operations used by the account composite.
///
/// `correlation_id` is sent as `X-Request-ID` when non-empty.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProfileClient: Send + Sync {
    /// Fetch one user by id
    async fn fetch_one(&self, id: &str, correlation_id: &str) -> Result<UserDetail, FetchError>;

    /// Fetch every user
    async fn fetch_all(&self, correlation_id: &str) -> Result<Vec<UserDetail>, FetchError>;

    /// Fetch users eligible for assignment
    async fn fetch_assignees(
        &self,
        filter: &AssigneeFilter,
        correlation_id: &str,
    ) -> Result<Vec<UserDetail>, FetchError>;

    /// Fetch all teams
    async fn fetch_teams(&self, correlation_id: &str) -> Result<Vec<Team>, FetchError>;

    /// Fetch all departments
    async fn fetch_departments(&self, correlation_id: &str) -> Result<Vec<Department>, FetchError>;

    /// Fetch users reporting to a manager
    async fn fetch_subordinates(
        &self,
        manager_id: &str,
        correlation_id: &str,
    ) -> Result<Vec<UserDetail>, FetchError>;
}

/// Single-user payload. Older profile deployments wrap the record in an array.
#[derive(Deserialize)]
#[serde(untagged)]
enum UserPayload {
    Many(Vec<UserDetail>),
    One(UserDetail),
}

impl UserPayload {
    fn into_user(self) -> UserDetail {
        match self {
            UserPayload::Many(users) => users.into_iter().next().unwrap_or_default(),
            UserPayload::One(user) => user,
        }
    }
}

/// reqwest-backed [`ProfileClient`].
///
/// The inner `reqwest::Client` pools connections and is shared by every
/// request; the struct holds no other state.
#[derive(Debug, Clone)]
pub struct HttpProfileClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProfileClient {
    /// Create a client for the profile service at `config.base_url`.
    pub fn new(config: &DownstreamConfig) -> Result<Self, reqwest::Error> {
        debug!("Profile service at {}", config.base_url);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `{base}/user/...` with each of `segments` percent-encoded as one segment.
    fn url(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| FetchError::Transport(format!("invalid profile service url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::Transport(format!("profile service url has no path: {}", self.base_url)))?
            .pop_if_empty()
            .push("user")
            .extend(segments);
        Ok(url)
    }

    /// GET `url`, require a 200 and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
        correlation_id: &str,
    ) -> Result<T, FetchError> {
        let mut request = self.client.get(url.clone());
        if !correlation_id.is_empty() {
            request = request.header(HEADER_REQUEST_ID, correlation_id);
        }
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            debug!(url = %url, status = status.as_u16(), "Profile service returned non-200");
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ProfileClient for HttpProfileClient {
    async fn fetch_one(&self, id: &str, correlation_id: &str) -> Result<UserDetail, FetchError> {
        let id = normalize_id(id).map_err(|_| FetchError::InvalidId(id.to_string()))?;
        let payload: UserPayload = self.get_json(self.url(&[id])?, &[], correlation_id).await?;
        Ok(payload.into_user())
    }

    async fn fetch_all(&self, correlation_id: &str) -> Result<Vec<UserDetail>, FetchError> {
        self.get_json(self.url(&["all"])?, &[], correlation_id).await
    }

    async fn fetch_assignees(
        &self,
        filter: &AssigneeFilter,
        correlation_id: &str,
    ) -> Result<Vec<UserDetail>, FetchError> {
        self.get_json(self.url(&["assignees"])?, &filter.query_pairs(), correlation_id)
            .await
    }

    async fn fetch_teams(&self, correlation_id: &str) -> Result<Vec<Team>, FetchError> {
        self.get_json(self.url(&["teams"])?, &[], correlation_id).await
    }

    async fn fetch_departments(&self, correlation_id: &str) -> Result<Vec<Department>, FetchError> {
        self.get_json(self.url(&["departments"])?, &[], correlation_id).await
    }

    async fn fetch_subordinates(
        &self,
        manager_id: &str,
        correlation_id: &str,
    ) -> Result<Vec<UserDetail>, FetchError> {
        let id = normalize_id(manager_id)
            .map_err(|_| FetchError::InvalidId(manager_id.to_string()))?;
        self.get_json(self.url(&[id, "subordinates"])?, &[], correlation_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use axum::{
        extract::{Path, Query},
        http::{HeaderMap, StatusCode as HttpStatus},
        response::{IntoResponse, Response},
        routing::get,
        Json, Router,
    };
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    async fn user_by_id(Path(id): Path<String>, headers: HeaderMap) -> Response {
        match id.as_str() {
            "traced" => Json(json!({
                "id": "traced",
                "display_name": headers.get("x-request-id").and_then(|v| v.to_str().ok()),
            }))
            .into_response(),
            "u1" => Json(json!({"id": "u1", "display_name": "Ann", "role": "Staff"})).into_response(),
            "empty" => Json(json!({})).into_response(),
            "legacy" => Json(json!([{"id": "legacy", "role": "Manager"}])).into_response(),
            "broken" => (HttpStatus::OK, "not json").into_response(),
            "boom" => (HttpStatus::INTERNAL_SERVER_ERROR, Json(json!({"error": "db"}))).into_response(),
            _ => HttpStatus::NOT_FOUND.into_response(),
        }
    }

    async fn assignees(Query(params): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
        Json(json!([{
            "id": "echo",
            "role": params.get("role"),
            "team_id": params.get("team_id"),
            "department_id": params.get("department_id"),
        }]))
    }

    async fn spawn_profile_stub() -> String {
        let app = Router::new()
            .route("/user/assignees", get(assignees))
            .route("/user/teams", get(|| async { Json(json!([{"id": "t1", "name": "Ops"}])) }))
            .route("/user/:id", get(user_by_id))
            .route(
                "/user/:id/subordinates",
                get(|Path(id): Path<String>| async move { Json(json!([{"id": "sub-9", "team_name": id}])) }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base_url: &str) -> HttpProfileClient {
        HttpProfileClient::new(&DownstreamConfig::new(base_url, 5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_one_decodes_record() {
        let client = client(&spawn_profile_stub().await);
        let user = assert_ok!(client.fetch_one(" u1 ", "r").await);
        assert_eq!(user.id, "u1");
        assert_eq!(user.display_name.as_deref(), Some("Ann"));
        assert_eq!(user.team_id, None);
    }

    #[tokio::test]
    async fn test_fetch_one_empty_object_is_zero_value() {
        let client = client(&spawn_profile_stub().await);
        let user = assert_ok!(client.fetch_one("empty", "r").await);
        assert!(user.is_zero());
    }

    #[tokio::test]
    async fn test_fetch_one_accepts_legacy_array() {
        let client = client(&spawn_profile_stub().await);
        let user = assert_ok!(client.fetch_one("legacy", "r").await);
        assert_eq!(user.id, "legacy");
        assert_eq!(user.role.as_deref(), Some("Manager"));
    }

    #[tokio::test]
    async fn test_fetch_one_non_200_is_error() {
        let client = client(&spawn_profile_stub().await);
        assert_eq!(client.fetch_one("boom", "r").await, Err(FetchError::Status(500)));
        assert_eq!(client.fetch_one("nobody", "r").await, Err(FetchError::Status(404)));
    }

    #[tokio::test]
    async fn test_fetch_one_bad_body_is_decode_error() {
        let client = client(&spawn_profile_stub().await);
        let err = assert_err!(client.fetch_one("broken", "r").await);
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn test_fetch_one_blank_id_never_hits_network() {
        // Nothing listens on this address; a network call would be a transport error
        let client = client("http://127.0.0.1:1");
        let err = assert_err!(client.fetch_one("   ", "r").await);
        assert!(matches!(err, FetchError::InvalidId(_)));
    }

    #[tokio::test]
    async fn test_request_id_forwarded() {
        let client = client(&spawn_profile_stub().await);
        let user = assert_ok!(client.fetch_one("traced", "req-42").await);
        assert_eq!(user.display_name.as_deref(), Some("req-42"));
    }

    #[tokio::test]
    async fn test_identifier_with_slash_stays_one_segment() {
        let client = client(&spawn_profile_stub().await);

        // Must hit /user/:id, not the subordinates route
        assert_eq!(
            client.fetch_one("u1/subordinates", "r").await,
            Err(FetchError::Status(404))
        );
        assert_eq!(client.fetch_one("u1?x=1", "r").await, Err(FetchError::Status(404)));
        assert!(matches!(
            client.fetch_one("..", "r").await,
            Err(FetchError::InvalidId(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_subordinates() {
        let client = client(&spawn_profile_stub().await);
        let users = assert_ok!(client.fetch_subordinates(" m/1 ", "r").await);
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, "sub-9");
        assert_eq!(users[0].team_name.as_deref(), Some("m/1"));
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client(&format!("http://{}", addr));
        let err = assert_err!(client.fetch_all("r").await);
        assert!(matches!(err, FetchError::Transport(_)));
    }

    #[tokio::test]
    async fn test_assignee_filters_forwarded_and_blank_omitted() {
        let client = client(&spawn_profile_stub().await);
        let filter = AssigneeFilter {
            role: Some("Staff".to_string()),
            team_id: Some("t1".to_string()),
            department_id: Some("  ".to_string()),
        };

        let users = assert_ok!(client.fetch_assignees(&filter, "r").await);
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].role.as_deref(), Some("Staff"));
        assert_eq!(users[0].team_id.as_deref(), Some("t1"));
        assert_eq!(users[0].department_id, None);
    }

    #[tokio::test]
    async fn test_fetch_teams() {
        let client = client(&spawn_profile_stub().await);
        let teams = assert_ok!(client.fetch_teams("r").await);
        assert_eq!(teams, vec![Team { id: "t1".into(), name: Some("Ops".into()), department_id: None }]);
    }

    #[test]
    fn test_fetch_error_mapping() {
        assert_eq!(AppError::from(FetchError::Status(404)).code(), "UPSTREAM_STATUS");
        assert_eq!(AppError::from(FetchError::Transport("x".into())).code(), "UPSTREAM_ERROR");
        assert_eq!(AppError::from(FetchError::InvalidId(" ".into())).code(), "INVALID_BODY");
    }
}
