//! Report event publishing over Kafka.

use std::time::Duration;

use async_trait::async_trait;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::config::ClientConfig;
use rdkafka::error::KafkaError;
use rdkafka::message::{Header, OwnedHeaders};
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::types::RDKafkaErrorCode;
use tracing::{debug, info, warn};

use common::{AppError, AppResult, KafkaConfig};
use domain::{GenerationEnvelope, CONTENT_TYPE_JSON};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// How long startup waits for the admin API before giving up on topic creation
const TOPIC_SETUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Publishes report events to the broker.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish one event under `key` and wait for the broker acknowledgement.
    async fn publish(&self, key: &str, envelope: &GenerationEnvelope) -> AppResult<()>;
}

/// Serialize an envelope into the message value.
pub fn encode_event(envelope: &GenerationEnvelope) -> AppResult<Vec<u8>> {
    serde_json::to_vec(envelope)
        .map_err(|e| AppError::broker(format!("failed to encode {} event: {}", envelope.event(), e)))
}

/// [`EventPublisher`] backed by an rdkafka `FutureProducer`.
///
/// Messages are produced with `acks=all`, so `publish` returns only once every
/// in-sync replica has the event.
pub struct KafkaPublisher {
    producer: FutureProducer,
    topic: String,
    delivery_timeout: Duration,
}

impl KafkaPublisher {
    /// Create a producer. Does not contact the brokers.
    pub fn new(config: &KafkaConfig, delivery_timeout: Duration) -> Result<Self, KafkaError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", config.bootstrap_servers())
            .set("acks", "all")
            .set("message.timeout.ms", delivery_timeout.as_millis().to_string())
            .create()?;

        debug!(brokers = %config.bootstrap_servers(), topic = %config.topic, "Kafka producer created");

        Ok(Self {
            producer,
            topic: config.topic.clone(),
            delivery_timeout,
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

#[async_trait]
impl EventPublisher for KafkaPublisher {
    async fn publish(&self, key: &str, envelope: &GenerationEnvelope) -> AppResult<()> {
        let payload = encode_event(envelope)?;
        let headers = OwnedHeaders::new().insert(Header {
            key: "content-type",
            value: Some(CONTENT_TYPE_JSON.as_bytes()),
        });

        let record = FutureRecord::to(&self.topic)
            .key(key)
            .payload(&payload)
            .headers(headers);

        let (partition, offset) = self
            .producer
            .send(record, self.delivery_timeout)
            .await
            .map_err(|(e, _)| AppError::from(e))?;

        debug!(
            topic = %self.topic,
            key,
            event = envelope.event(),
            partition,
            offset,
            "Event published"
        );
        Ok(())
    }
}

/// Create the topic with one partition and replication factor one.
///
/// Best effort: every failure is logged and swallowed so the service can start
/// against a broker that forbids topic creation or already has the topic.
pub async fn ensure_topic(config: &KafkaConfig) {
    let admin: AdminClient<DefaultClientContext> = match ClientConfig::new()
        .set("bootstrap.servers", config.bootstrap_servers())
        .create()
    {
        Ok(admin) => admin,
        Err(e) => {
            warn!("Kafka admin client unavailable, skipping topic setup: {}", e);
            return;
        }
    };

    let topic = NewTopic::new(&config.topic, 1, TopicReplication::Fixed(1));
    let created = tokio::time::timeout(
        TOPIC_SETUP_TIMEOUT,
        admin.create_topics(&[topic], &AdminOptions::new()),
    )
    .await;

    match created {
        Ok(Ok(results)) => {
            for result in results {
                match result {
                    Ok(name) => info!(topic = %name, "Kafka topic created"),
                    Err((name, RDKafkaErrorCode::TopicAlreadyExists)) => {
                        debug!(topic = %name, "Kafka topic already exists")
                    }
                    Err((name, code)) => warn!(topic = %name, "Kafka topic setup failed: {}", code),
                }
            }
        }
        Ok(Err(e)) => warn!(topic = %config.topic, "Kafka topic setup failed: {}", e),
        Err(_) => warn!(topic = %config.topic, "Kafka topic setup timed out"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{DateWindow, ReportScope};
    use tokio_test::assert_err;

    fn envelope() -> GenerationEnvelope {
        let scope = ReportScope::team("t1").unwrap();
        GenerationEnvelope::new(&scope, &DateWindow::new("2024-01-01", "2024-01-31"), "req-9", None)
    }

    #[test]
    fn test_encode_event() {
        let bytes = encode_event(&envelope()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["event"], "TEAM_REPORT_REQUESTED");
        assert_eq!(value["correlationId"], "req-9");
        assert_eq!(value["payload"]["teamId"], "t1");
    }

    #[tokio::test]
    async fn test_topic_setup_without_broker_does_not_block() {
        let config = KafkaConfig::from_csv("127.0.0.1:1", "report-requests");
        let finished = tokio::time::timeout(
            TOPIC_SETUP_TIMEOUT + Duration::from_secs(5),
            ensure_topic(&config),
        )
        .await;
        assert!(finished.is_ok(), "topic setup should give up on its own");
    }

    #[tokio::test]
    async fn test_publish_without_broker_fails() {
        let config = KafkaConfig::from_csv("127.0.0.1:1", "report-requests");
        let publisher = KafkaPublisher::new(&config, Duration::from_millis(300)).unwrap();
        assert_eq!(publisher.topic(), "report-requests");

        let err = assert_err!(publisher.publish("t1", &envelope()).await);
        assert_eq!(err.code(), "KAFKA_PUBLISH_FAILED");
    }
}
