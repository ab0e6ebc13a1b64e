//! HTTP request handlers.

pub mod health_handler;
pub mod report_handler;

pub use health_handler::health_routes;
pub use report_handler::report_routes;
