use super::{EventPublisher, PublishError};
use crate::helpers::MqManager;
use crate::models::{EventChannel, IngestionEvent};
use async_trait::async_trait;
use lapin::{
    options::BasicPublishOptions, publisher_confirm::Confirmation, BasicProperties, Channel,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::Instrument;

const PERSISTENT: u8 = 2;

/// What became of a publication once the broker answered.
#[derive(Debug, PartialEq, Eq)]
enum Delivery {
    Acked,
    Rejected,
    Unconfirmed,
    Failed,
}

pub struct AmqpPublisher {
    mq_manager: Arc<MqManager>,
    // one confirm-mode channel per logical channel; the lock serializes writes on it
    channels: HashMap<EventChannel, Mutex<Option<Channel>>>,
}

impl AmqpPublisher {
    pub fn new(mq_manager: Arc<MqManager>) -> Self {
        let channels = EventChannel::ALL
            .into_iter()
            .map(|channel| (channel, Mutex::new(None)))
            .collect();

        Self {
            mq_manager,
            channels,
        }
    }

    fn slot(&self, channel: EventChannel) -> &Mutex<Option<Channel>> {
        // every EventChannel is inserted in `new`
        &self.channels[&channel]
    }

    /// Cached handle, reopened when the previous one is no longer connected.
    async fn open(&self, slot: &mut Option<Channel>) -> Result<Channel, PublishError> {
        if let Some(channel) = slot.as_ref() {
            if channel.status().connected() {
                return Ok(channel.clone());
            }
            tracing::warn!("AMQP channel {} closed, reopening", channel.id());
        }

        let channel = self.mq_manager.create_confirm_channel().await?;
        *slot = Some(channel.clone());
        Ok(channel)
    }
}

#[async_trait]
impl EventPublisher for AmqpPublisher {
    #[tracing::instrument(name = "Declare event channel", skip(self))]
    async fn ensure_channel(&self, channel: EventChannel) -> Result<(), PublishError> {
        let mut slot = self.slot(channel).lock().await;
        let amqp_channel = self.open(&mut slot).await?;
        self.mq_manager
            .declare_durable_route(&amqp_channel, channel.exchange(), channel.queue())
            .await?;

        tracing::info!(
            "exchange {} bound to queue {}",
            channel.exchange(),
            channel.queue()
        );
        Ok(())
    }

    #[tracing::instrument(name = "Publish ingestion event", skip(self, event), fields(channel = ?event.channel()))]
    async fn publish(&self, event: IngestionEvent) -> Result<(), PublishError> {
        let channel = event.channel();
        let payload = event.to_payload()?;
        let properties = BasicProperties::default()
            .with_content_type("application/json".into())
            .with_delivery_mode(PERSISTENT);

        let confirm = {
            let mut slot = self.slot(channel).lock().await;
            let amqp_channel = self.open(&mut slot).await?;
            amqp_channel
                .basic_publish(
                    channel.exchange(),
                    "",
                    BasicPublishOptions::default(),
                    &payload,
                    properties,
                )
                .await
                .map_err(|err| {
                    tracing::error!("publishing message {:?}", err);
                    // drop the handle so the next publish starts on a fresh channel
                    *slot = None;
                    PublishError::from(err)
                })?
        };

        let exchange = channel.exchange();
        tokio::spawn(
            async move {
                record_confirmation(exchange, confirm.await);
            }
            .instrument(tracing::info_span!("Awaiting broker confirmation")),
        );

        Ok(())
    }
}

/// The confirmation is awaited off the request path, so its outcome is only logged.
fn record_confirmation(exchange: &str, outcome: Result<Confirmation, lapin::Error>) -> Delivery {
    match outcome {
        Ok(Confirmation::Ack(_)) => {
            tracing::debug!("broker acknowledged message on {}", exchange);
            Delivery::Acked
        }
        Ok(Confirmation::Nack(_)) => {
            tracing::error!("broker rejected message on {}", exchange);
            Delivery::Rejected
        }
        Ok(Confirmation::NotRequested) => {
            tracing::warn!("no confirmation requested on {}", exchange);
            Delivery::Unconfirmed
        }
        Err(err) => {
            tracing::error!("confirming the publication on {}: {:?}", exchange, err);
            Delivery::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broker_answers_map_to_delivery_outcomes() {
        let exchange = EventChannel::DocumentIndexing.exchange();

        assert_eq!(
            Delivery::Acked,
            record_confirmation(exchange, Ok(Confirmation::Ack(None)))
        );
        assert_eq!(
            Delivery::Rejected,
            record_confirmation(exchange, Ok(Confirmation::Nack(None)))
        );
        assert_eq!(
            Delivery::Unconfirmed,
            record_confirmation(exchange, Ok(Confirmation::NotRequested))
        );
    }

    #[test]
    fn lost_channel_is_a_failed_delivery() {
        let outcome = Err(lapin::Error::InvalidChannel(7));
        assert_eq!(
            Delivery::Failed,
            record_confirmation(EventChannel::ChatAssistant.exchange(), outcome)
        );
    }
}
