//! HTTP clients for calling downstream services.

mod profile_client;

pub use profile_client::{AssigneeFilter, FetchError, HttpProfileClient, ProfileClient};

#[cfg(any(test, feature = "test-utils"))]
pub use profile_client::MockProfileClient;
