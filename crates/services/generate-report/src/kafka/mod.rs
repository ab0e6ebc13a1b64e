//! Kafka producer for report events.

mod producer;

pub use producer::{encode_event, ensure_topic, EventPublisher, KafkaPublisher};

#[cfg(any(test, feature = "test-utils"))]
pub use producer::MockEventPublisher;
