//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::handlers::health_handler::HealthResponse;
use crate::handlers::report_handler::{GenerateRequest, OrganisationRequest};
use domain::{ReportData, ReportServiceResponse};

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health_handler::health_check,
        crate::handlers::report_handler::generate_personal,
        crate::handlers::report_handler::generate_team,
        crate::handlers::report_handler::generate_department,
        crate::handlers::report_handler::generate_project,
        crate::handlers::report_handler::generate_organisation,
        crate::handlers::report_handler::list_reports,
        crate::handlers::report_handler::delete_report,
    ),
    components(
        schemas(
            HealthResponse,
            GenerateRequest,
            OrganisationRequest,
            ReportServiceResponse,
            ReportData,
        )
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Reports", description = "Report generation, listing and deletion"),
    )
)]
pub struct ApiDoc;
