//! Report generation service configuration.

use std::env;
use std::time::Duration;

use common::{DownstreamConfig, KafkaConfig};

/// Report generation service configuration.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Broker and topic report events go to
    pub kafka: KafkaConfig,
    /// Report service endpoint; `timeout_secs` bounds list and delete calls
    pub report: DownstreamConfig,
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Deadline for a single publish, acknowledgement included
    pub publish_timeout_secs: u64,
    /// Deadline for a report generation call
    pub generate_timeout_secs: u64,
}

impl ReportConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let brokers = env::var("KAFKA_BROKERS").unwrap_or_else(|_| "kafka:9092".to_string());
        let topic = env::var("KAFKA_TOPIC").unwrap_or_else(|_| "report-requests".to_string());
        let report_url = env::var("REPORT_BASE_URL")
            .unwrap_or_else(|_| "http://report:3042".to_string());

        Self {
            kafka: KafkaConfig::from_csv(&brokers, topic),
            report: DownstreamConfig::new(report_url, env_u64("DOWNSTREAM_TIMEOUT_SECS", 30)),
            host: env::var("REPORT_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("REPORT_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8093),
            publish_timeout_secs: env_u64("PUBLISH_TIMEOUT_SECS", 3),
            generate_timeout_secs: env_u64("REPORT_TIMEOUT_SECS", 60),
        }
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_secs(self.publish_timeout_secs)
    }

    pub fn generate_timeout(&self) -> Duration {
        Duration::from_secs(self.generate_timeout_secs)
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            kafka: KafkaConfig::from_csv("kafka:9092", "report-requests"),
            report: DownstreamConfig::new("http://report:3042", 30),
            host: "0.0.0.0".to_string(),
            port: 8093,
            publish_timeout_secs: 3,
            generate_timeout_secs: 60,
        }
    }
}

/// Positive integer from the environment, or `default`.
fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReportConfig::default();
        assert_eq!(config.kafka.topic, "report-requests");
        assert_eq!(config.publish_timeout(), Duration::from_secs(3));
        assert!(config.publish_timeout() < config.generate_timeout());
    }
}
