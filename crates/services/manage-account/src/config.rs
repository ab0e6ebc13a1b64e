//! Account service configuration.

use std::env;

use common::DownstreamConfig;

/// Account service configuration.
#[derive(Debug, Clone)]
pub struct AccountConfig {
    /// Profile service endpoint and timeout
    pub profile: DownstreamConfig,
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Upper bound on concurrent profile lookups per aggregation
    pub max_concurrency: usize,
}

impl AccountConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let profile_url = env::var("PROFILE_BASE_URL")
            .unwrap_or_else(|_| "http://profile:3030".to_string());
        let timeout_secs = env::var("DOWNSTREAM_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(30);

        Self {
            profile: DownstreamConfig::new(profile_url, timeout_secs),
            host: env::var("ACCOUNT_HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("ACCOUNT_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            max_concurrency: env::var("AGGREGATE_MAX_CONCURRENCY")
                .ok()
                .and_then(|c| c.parse().ok())
                .filter(|c: &usize| *c > 0)
                .unwrap_or(16),
        }
    }
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            profile: DownstreamConfig::new("http://profile:3030", 30),
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_concurrency: 16,
        }
    }
}
