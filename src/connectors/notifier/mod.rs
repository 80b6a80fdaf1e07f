//! Delivery of ingestion events to the downstream workers.

use crate::helpers::MqError;
use crate::models::{EventChannel, IngestionEvent};
use async_trait::async_trait;

mod amqp;

pub use amqp::AmqpPublisher;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("serializing event payload: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Broker(#[from] MqError),
}

impl From<lapin::Error> for PublishError {
    fn from(err: lapin::Error) -> Self {
        PublishError::Broker(MqError::Amqp(err))
    }
}

#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Declares the durable route behind `channel`. Safe to call repeatedly.
    async fn ensure_channel(&self, channel: EventChannel) -> Result<(), PublishError>;

    /// Returns once the event is handed to the transport. Delivery confirmation is
    /// observed in the background and only logged.
    async fn publish(&self, event: IngestionEvent) -> Result<(), PublishError>;
}
