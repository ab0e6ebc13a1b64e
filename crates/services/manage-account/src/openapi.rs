//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::aggregator::FetchFailure;
use crate::handlers::health_handler::HealthResponse;
use crate::handlers::user_handler::{
    DepartmentsResponse, DetailsRequest, DetailsResponse, TeamsResponse, UserResponse,
    UsersResponse,
};
use domain::{Department, Team, UserDetail};

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health_handler::health_check,
        crate::handlers::user_handler::list_users,
        crate::handlers::user_handler::get_user,
        crate::handlers::user_handler::list_subordinates,
        crate::handlers::user_handler::list_assignees,
        crate::handlers::user_handler::list_teams,
        crate::handlers::user_handler::list_departments,
        crate::handlers::user_handler::get_user_details,
    ),
    components(
        schemas(
            HealthResponse,
            UserDetail,
            Team,
            Department,
            UserResponse,
            UsersResponse,
            TeamsResponse,
            DepartmentsResponse,
            DetailsRequest,
            DetailsResponse,
            FetchFailure,
        )
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Users", description = "User profile lookups"),
        (name = "Organisation", description = "Teams and departments"),
    )
)]
pub struct ApiDoc;
