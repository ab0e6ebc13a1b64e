//! Domain layer - entities and value objects shared by the composite services.
//!
//! Nothing here talks to the network. Profile records, report scopes and the
//! broker envelope are plain data that both services serialize.

pub mod constants;
pub mod error;
pub mod identifier;
pub mod report;
pub mod user;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use identifier::normalize_id;
pub use report::{DateWindow, EventPayload, GenerationEnvelope, ReportData, ReportScope, ReportServiceResponse};
pub use user::{Department, Team, UserDetail};
