use broccoli_queue::queue::BroccoliQueue;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::MqConfig;
use crate::error::MqError;

pub type MqQueue = BroccoliQueue;

/// Connect to the broker described by `config`.
pub async fn init_mq(config: MqConfig) -> Result<MqQueue, MqError> {
    BroccoliQueue::builder(&config.url)
        .pool_connections(config.pool_size)
        .build()
        .await
        .map_err(MqError::from)
}

/// Publish a single JSON message to `topic`.
pub async fn publish_json<T>(queue: &MqQueue, topic: &str, message: &T) -> Result<(), MqError>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    queue
        .publish(topic, None, message, None)
        .await
        .map_err(|e| MqError::Publish {
            topic: topic.to_string(),
            message: e.to_string(),
        })?;

    debug!(topic, "Message published");
    Ok(())
}
