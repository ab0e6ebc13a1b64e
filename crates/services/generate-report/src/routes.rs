//! Route configuration.

use axum::{middleware, Router};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::request_id_middleware;

use crate::handlers::{health_routes, report_routes};
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Create the main router with all routes.
///
/// Report routes sit at the root, so the fixed paths registered here take
/// precedence over `/:id`.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(report_routes())
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}
