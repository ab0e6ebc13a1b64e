//! User handlers.
//!
//! Thin proxies over the profile service plus the batched details lookup.

use axum::{
    extract::{Extension, Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use common::{AppResult, RequestId, ValidatedJson};
use domain::{Department, Team, UserDetail};

use crate::aggregator::FetchFailure;
use crate::clients::AssigneeFilter;
use crate::state::AppState;

/// Batched details request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DetailsRequest {
    /// User identifiers; duplicates are looked up once per occurrence
    #[validate(length(max = 1000, message = "At most 1000 ids per request"))]
    #[schema(example = json!(["u1", "u2"]))]
    pub ids: Vec<String>,
}

/// Assignee filters. Blank values are ignored.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AssigneeQuery {
    /// Role name, e.g. "Staff"
    pub role: Option<String>,
    pub team_id: Option<String>,
    pub department_id: Option<String>,
}

impl From<AssigneeQuery> for AssigneeFilter {
    fn from(query: AssigneeQuery) -> Self {
        Self {
            role: query.role,
            team_id: query.team_id,
            department_id: query.department_id,
        }
    }
}

/// Single user response
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub success: bool,
    pub data: UserDetail,
}

/// User list response
#[derive(Debug, Serialize, ToSchema)]
pub struct UsersResponse {
    pub success: bool,
    pub data: Vec<UserDetail>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeamsResponse {
    pub success: bool,
    pub data: Vec<Team>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DepartmentsResponse {
    pub success: bool,
    pub data: Vec<Department>,
}

/// Batched details response.
///
/// `data` has one entry per requested id in completion order; ids whose lookup
/// failed appear as zero-valued records and are listed in `errors`.
#[derive(Debug, Serialize, ToSchema)]
pub struct DetailsResponse {
    pub success: bool,
    pub data: Vec<UserDetail>,
    /// Number of failed lookups
    pub failed: usize,
    pub errors: Vec<FetchFailure>,
}

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/assignees", get(list_assignees))
        .route("/teams", get(list_teams))
        .route("/departments", get(list_departments))
        .route("/details", post(get_user_details))
        .route("/:id", get(get_user))
        .route("/:id/subordinates", get(list_subordinates))
}

/// List all users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses(
        (status = 200, description = "All users", body = UsersResponse),
        (status = 502, description = "Profile service unreachable")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<UsersResponse>> {
    let users = state.profile_client.fetch_all(request_id.as_str()).await?;
    Ok(Json(UsersResponse {
        success: true,
        data: users,
    }))
}

/// Get user by ID
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 400, description = "Blank identifier"),
        (status = 404, description = "Unknown user, as reported by the profile service"),
        (status = 502, description = "Profile service unreachable")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let user = state.profile_client.fetch_one(&id, request_id.as_str()).await?;
    Ok(Json(UserResponse {
        success: true,
        data: user,
    }))
}

/// List users reporting to a manager
#[utoipa::path(
    get,
    path = "/api/users/{id}/subordinates",
    tag = "Users",
    params(
        ("id" = String, Path, description = "Manager ID")
    ),
    responses(
        (status = 200, description = "Direct reports", body = UsersResponse),
        (status = 502, description = "Profile service unreachable")
    )
)]
pub async fn list_subordinates(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> AppResult<Json<UsersResponse>> {
    let users = state
        .profile_client
        .fetch_subordinates(&id, request_id.as_str())
        .await?;
    Ok(Json(UsersResponse {
        success: true,
        data: users,
    }))
}

/// List users eligible for task assignment
#[utoipa::path(
    get,
    path = "/api/users/assignees",
    tag = "Users",
    params(AssigneeQuery),
    responses(
        (status = 200, description = "Matching users", body = UsersResponse),
        (status = 502, description = "Profile service unreachable")
    )
)]
pub async fn list_assignees(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<AssigneeQuery>,
) -> AppResult<Json<UsersResponse>> {
    let filter = AssigneeFilter::from(query);
    let users = state
        .profile_client
        .fetch_assignees(&filter, request_id.as_str())
        .await?;
    Ok(Json(UsersResponse {
        success: true,
        data: users,
    }))
}

/// List all teams
#[utoipa::path(
    get,
    path = "/api/users/teams",
    tag = "Organisation",
    responses(
        (status = 200, description = "All teams", body = TeamsResponse),
        (status = 502, description = "Profile service unreachable")
    )
)]
pub async fn list_teams(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<TeamsResponse>> {
    let teams = state.profile_client.fetch_teams(request_id.as_str()).await?;
    Ok(Json(TeamsResponse {
        success: true,
        data: teams,
    }))
}

/// List all departments
#[utoipa::path(
    get,
    path = "/api/users/departments",
    tag = "Organisation",
    responses(
        (status = 200, description = "All departments", body = DepartmentsResponse),
        (status = 502, description = "Profile service unreachable")
    )
)]
pub async fn list_departments(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<DepartmentsResponse>> {
    let departments = state
        .profile_client
        .fetch_departments(request_id.as_str())
        .await?;
    Ok(Json(DepartmentsResponse {
        success: true,
        data: departments,
    }))
}

/// Resolve many users concurrently
///
/// Individual lookup failures never fail the request.
#[utoipa::path(
    post,
    path = "/api/users/details",
    tag = "Users",
    request_body = DetailsRequest,
    responses(
        (status = 200, description = "One record per requested id", body = DetailsResponse),
        (status = 400, description = "Malformed body")
    )
)]
pub async fn get_user_details(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    ValidatedJson(payload): ValidatedJson<DetailsRequest>,
) -> AppResult<Json<DetailsResponse>> {
    let cancel = state.shutdown.child_token();
    let result = state
        .aggregator
        .aggregate(&payload.ids, request_id.as_str(), &cancel)
        .await;

    let failed = result.failure_count();
    info!(
        request_id = %request_id.as_str(),
        requested = payload.ids.len(),
        failed,
        "User details aggregated"
    );

    let errors = result.failures();
    Ok(Json(DetailsResponse {
        success: true,
        data: result.into_records(),
        failed,
        errors,
    }))
}
