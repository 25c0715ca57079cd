use anyhow::{anyhow, Result};
use lapin::{
    options::{BasicConsumeOptions, QueueDeclareOptions},
    types::FieldTable,
    Channel, Connection, ConnectionProperties, Consumer,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Clone)]
pub struct RabbitMqService {
    _conn: Arc<Connection>,
    channel: Arc<Mutex<Channel>>,
}

impl RabbitMqService {
    pub async fn new(url: &str) -> Result<Self> {
        info!("Connecting to RabbitMQ");
        let conn = Connection::connect(url, ConnectionProperties::default())
            .await
            .map_err(|e| anyhow!("Failed to connect to RabbitMQ: {}", e))?;

        let channel = conn
            .create_channel()
            .await
            .map_err(|e| anyhow!("Failed to create channel: {}", e))?;

        info!("✅ Connected to RabbitMQ");
        Ok(Self {
            _conn: Arc::new(conn),
            channel: Arc::new(Mutex::new(channel)),
        })
    }

    /// Declare `queue` as durable and start consuming it under `consumer_tag`.
    pub async fn consume(&self, queue: &str, consumer_tag: &str) -> Result<Consumer> {
        let channel = self.channel.lock().await;

        channel
            .queue_declare(
                queue,
                QueueDeclareOptions {
                    durable: true,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| anyhow!("Failed to declare queue: {}", e))?;

        channel
            .basic_consume(
                queue,
                consumer_tag,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| anyhow!("Failed to create consumer: {}", e))
    }
}
