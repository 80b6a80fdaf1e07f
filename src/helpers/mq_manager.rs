use deadpool_lapin::{Config, CreatePoolError, Object, Pool, PoolError, Runtime};
use lapin::{options::*, types::FieldTable, Channel, ExchangeKind};

#[derive(Debug, thiserror::Error)]
pub enum MqError {
    #[error("getting connection from pool: {0}")]
    Pool(#[from] PoolError),
    #[error("amqp: {0}")]
    Amqp(#[from] lapin::Error),
}

/// Owns the broker connection pool. Connections are opened lazily on first use and
/// replaced by the pool when found closed.
#[derive(Debug)]
pub struct MqManager {
    pool: Pool,
}

impl MqManager {
    pub fn try_new(url: String) -> Result<Self, std::io::Error> {
        let mut cfg = Config::default();
        cfg.url = Some(url);
        let pool = cfg.create_pool(Some(Runtime::Tokio1)).map_err(|err| {
            tracing::error!("{:?}", err);

            match err {
                CreatePoolError::Config(_) => {
                    std::io::Error::new(std::io::ErrorKind::Other, "config error")
                }
                CreatePoolError::Build(_) => {
                    std::io::Error::new(std::io::ErrorKind::Other, "build error")
                }
            }
        })?;

        Ok(Self { pool })
    }

    async fn get_connection(&self) -> Result<Object, MqError> {
        self.pool.get().await.map_err(|err| {
            tracing::error!("getting connection from pool {:?}", err);
            MqError::from(err)
        })
    }

    pub async fn create_channel(&self) -> Result<Channel, MqError> {
        self.get_connection()
            .await?
            .create_channel()
            .await
            .map_err(|err| {
                tracing::error!("creating RabbitMQ channel {:?}", err);
                MqError::from(err)
            })
    }

    /// Channel in publisher-confirm mode: every publish yields a broker ack or nack.
    pub async fn create_confirm_channel(&self) -> Result<Channel, MqError> {
        let channel = self.create_channel().await?;
        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await?;
        Ok(channel)
    }

    /// Durable direct exchange with one durable queue bound under the empty routing key.
    /// Redeclaring with the same arguments is a no-op on the broker.
    pub async fn declare_durable_route(
        &self,
        channel: &Channel,
        exchange_name: &str,
        queue_name: &str,
    ) -> Result<(), MqError> {
        channel
            .exchange_declare(
                exchange_name,
                ExchangeKind::Direct,
                ExchangeDeclareOptions {
                    passive: false,
                    durable: true,
                    auto_delete: false,
                    internal: false,
                    nowait: false,
                },
                FieldTable::default(),
            )
            .await?;

        channel
            .queue_declare(
                queue_name,
                QueueDeclareOptions {
                    passive: false,
                    durable: true,
                    exclusive: false,
                    auto_delete: false,
                    nowait: false,
                },
                FieldTable::default(),
            )
            .await?;

        channel
            .queue_bind(
                queue_name,
                exchange_name,
                "",
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await?;

        Ok(())
    }
}
