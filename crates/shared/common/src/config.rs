//! Shared configuration structures.

use serde::{Deserialize, Serialize};

/// Downstream HTTP service connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownstreamConfig {
    /// Base URL (e.g., "http://profile:3030"), without trailing slash
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl DownstreamConfig {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
        }
    }
}

impl Default for DownstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3030".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Message broker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KafkaConfig {
    /// Bootstrap brokers
    pub brokers: Vec<String>,
    /// Topic events are published to
    pub topic: String,
}

impl KafkaConfig {
    /// Build from a comma-separated broker list.
    pub fn from_csv(brokers_csv: &str, topic: impl Into<String>) -> Self {
        Self {
            brokers: split_brokers(brokers_csv),
            topic: topic.into(),
        }
    }

    /// Brokers joined for `bootstrap.servers`.
    pub fn bootstrap_servers(&self) -> String {
        self.brokers.join(",")
    }
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: vec!["kafka:9092".to_string()],
            topic: "report-requests".to_string(),
        }
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
pub fn split_brokers(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_brokers() {
        assert_eq!(
            split_brokers(" kafka-1:9092, ,kafka-2:9092 ,"),
            vec!["kafka-1:9092".to_string(), "kafka-2:9092".to_string()]
        );
        assert!(split_brokers("").is_empty());
    }

    #[test]
    fn test_downstream_base_url_trailing_slash() {
        let config = DownstreamConfig::new("http://report:3042/", 60);
        assert_eq!(config.base_url, "http://report:3042");
    }

    #[test]
    fn test_bootstrap_servers() {
        let config = KafkaConfig::from_csv("a:1,b:2", "topic");
        assert_eq!(config.bootstrap_servers(), "a:1,b:2");
    }
}
