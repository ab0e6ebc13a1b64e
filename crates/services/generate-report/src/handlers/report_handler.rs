//! Report handlers.
//!
//! Generation endpoints go through the orchestrator (publish, then call the
//! report service). Listing and deletion are plain proxies.

use axum::{
    extract::{Extension, Path, State},
    routing::post,
    Router,
};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

use common::{AppResult, OptionalJson, RequestId, ValidatedJson};
use domain::{DateWindow, ReportScope, ReportServiceResponse};

use crate::clients::DownstreamReply;
use crate::orchestrator::GenerationRequest;
use crate::state::AppState;

/// Report window for personal, team and department reports
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// First day, `YYYY-MM-DD`
    #[serde(default)]
    #[validate(length(min = 1, message = "startDate is required"))]
    #[schema(example = "2024-01-01")]
    pub start_date: String,
    /// Last day, `YYYY-MM-DD`
    #[serde(default)]
    #[validate(length(min = 1, message = "endDate is required"))]
    #[schema(example = "2024-01-31")]
    pub end_date: String,
}

impl GenerateRequest {
    fn into_window(self) -> DateWindow {
        DateWindow::new(self.start_date, self.end_date)
    }
}

/// Optional organisation report body.
///
/// The window falls back to the trailing year unless both dates are given.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganisationRequest {
    #[validate(length(min = 1, message = "startDate must not be empty"))]
    #[schema(example = "2024-01-01")]
    pub start_date: Option<String>,
    #[validate(length(min = 1, message = "endDate must not be empty"))]
    #[schema(example = "2024-12-31")]
    pub end_date: Option<String>,
    /// Requesting user, recorded in the event
    #[schema(example = "admin-1")]
    pub user_id: Option<String>,
}

impl OrganisationRequest {
    fn window(&self) -> DateWindow {
        match (&self.start_date, &self.end_date) {
            (Some(start), Some(end)) => DateWindow::new(start.as_str(), end.as_str()),
            _ => DateWindow::trailing_year_from_today(),
        }
    }
}

/// Create report routes
pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/organisation", post(generate_organisation))
        .route("/team/:id", post(generate_team))
        .route("/department/:id", post(generate_department))
        .route("/project/:id", post(generate_project))
        .route(
            "/:id",
            post(generate_personal)
                .get(list_reports)
                .delete(delete_report),
        )
}

fn request(scope: ReportScope, window: DateWindow, request_id: &RequestId) -> GenerationRequest {
    GenerationRequest {
        scope,
        window,
        correlation_id: request_id.as_str().to_string(),
        requested_by: None,
    }
}

/// Generate a personal report
#[utoipa::path(
    post,
    path = "/{userId}",
    tag = "Reports",
    params(
        ("userId" = String, Path, description = "User ID")
    ),
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Report service reply, passed through", body = ReportServiceResponse),
        (status = 400, description = "Missing dates"),
        (status = 502, description = "Event not published or report service unreachable")
    )
)]
pub async fn generate_personal(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<String>,
    ValidatedJson(payload): ValidatedJson<GenerateRequest>,
) -> AppResult<DownstreamReply> {
    let scope = ReportScope::personal(&user_id)?;
    state
        .orchestrator
        .generate(request(scope, payload.into_window(), &request_id))
        .await
}

/// Generate a team report
#[utoipa::path(
    post,
    path = "/team/{teamId}",
    tag = "Reports",
    params(
        ("teamId" = String, Path, description = "Team ID")
    ),
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Report service reply, passed through", body = ReportServiceResponse),
        (status = 400, description = "Missing dates"),
        (status = 502, description = "Event not published or report service unreachable")
    )
)]
pub async fn generate_team(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(team_id): Path<String>,
    ValidatedJson(payload): ValidatedJson<GenerateRequest>,
) -> AppResult<DownstreamReply> {
    let scope = ReportScope::team(&team_id)?;
    state
        .orchestrator
        .generate(request(scope, payload.into_window(), &request_id))
        .await
}

/// Generate a department report
#[utoipa::path(
    post,
    path = "/department/{departmentId}",
    tag = "Reports",
    params(
        ("departmentId" = String, Path, description = "Department ID")
    ),
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Report service reply, passed through", body = ReportServiceResponse),
        (status = 400, description = "Missing dates"),
        (status = 502, description = "Event not published or report service unreachable")
    )
)]
pub async fn generate_department(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(department_id): Path<String>,
    ValidatedJson(payload): ValidatedJson<GenerateRequest>,
) -> AppResult<DownstreamReply> {
    let scope = ReportScope::department(&department_id)?;
    state
        .orchestrator
        .generate(request(scope, payload.into_window(), &request_id))
        .await
}

/// Generate a project report over the trailing year
///
/// Takes no body; the window always ends today.
#[utoipa::path(
    post,
    path = "/project/{projectId}",
    tag = "Reports",
    params(
        ("projectId" = String, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Report service reply, passed through", body = ReportServiceResponse),
        (status = 502, description = "Event not published or report service unreachable")
    )
)]
pub async fn generate_project(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(project_id): Path<String>,
) -> AppResult<DownstreamReply> {
    let scope = ReportScope::project(&project_id)?;
    let window = DateWindow::trailing_year_from_today();
    state
        .orchestrator
        .generate(request(scope, window, &request_id))
        .await
}

/// Generate an organisation-wide report
#[utoipa::path(
    post,
    path = "/organisation",
    tag = "Reports",
    request_body(content = OrganisationRequest, description = "Optional window and requester"),
    responses(
        (status = 200, description = "Report service reply, passed through", body = ReportServiceResponse),
        (status = 400, description = "Malformed body"),
        (status = 502, description = "Event not published or report service unreachable")
    )
)]
pub async fn generate_organisation(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    OptionalJson(payload): OptionalJson<OrganisationRequest>,
) -> AppResult<DownstreamReply> {
    let payload = payload.unwrap_or_default();
    let mut generation = request(ReportScope::Organisation, payload.window(), &request_id);
    generation.requested_by = payload
        .user_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());

    state.orchestrator.generate(generation).await
}

/// List a user's reports
#[utoipa::path(
    get,
    path = "/{userId}",
    tag = "Reports",
    params(
        ("userId" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Report service reply, passed through"),
        (status = 502, description = "Report service unreachable")
    )
)]
pub async fn list_reports(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<String>,
) -> AppResult<DownstreamReply> {
    state
        .report_client
        .list_for_user(&user_id, request_id.as_str())
        .await
}

/// Delete a report
#[utoipa::path(
    delete,
    path = "/{reportId}",
    tag = "Reports",
    params(
        ("reportId" = String, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report service reply, passed through"),
        (status = 502, description = "Report service unreachable")
    )
)]
pub async fn delete_report(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(report_id): Path<String>,
) -> AppResult<DownstreamReply> {
    info!(request_id = %request_id.as_str(), report_id = %report_id, "Deleting report");
    state
        .report_client
        .delete(&report_id, request_id.as_str())
        .await
}
