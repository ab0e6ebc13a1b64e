//! Common utilities shared across the composite services.
//!
//! This crate provides:
//! - Unified error handling and the JSON error body
//! - Configuration structures
//! - Request-ID middleware and validated JSON extractors
//! - Graceful shutdown wiring

pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod shutdown;

pub use config::*;
pub use error::{AppError, AppResult};
pub use extractors::{OptionalJson, ValidatedJson};
pub use middleware::{request_id_middleware, RequestId, X_REQUEST_ID};
pub use shutdown::shutdown_signal;
