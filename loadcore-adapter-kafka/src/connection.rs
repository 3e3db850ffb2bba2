//! The pooled connection type for the Kafka adapter.
//!
//! Each pooled "connection" bundles a producer handle and a dedicated
//! consumer, since a single `Operation` may be either a `kafka_produce` or a
//! `kafka_consume`. `FutureProducer` is safe to share internally, but giving
//! each pool slot its own keeps the `Pool<C>` acquire/release contract
//! uniform with the other adapters (one borrowed value, one protocol).

use async_trait::async_trait;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::producer::FutureProducer;
use rdkafka::ClientConfig;
use serde::{Deserialize, Serialize};

use loadcore::{PoolError, PooledConnection};

/// Configuration needed to build one [`KafkaConnection`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KafkaConnectionConfig {
    /// Comma-separated `host:port` broker list.
    pub bootstrap_servers: String,
    /// Consumer group ID for `kafka_consume` operations.
    pub group_id: String,
    /// Topics the consumer half subscribes to at creation time. Empty if
    /// this run only produces.
    #[serde(default)]
    pub consume_topics: Vec<String>,
}

/// One producer handle plus one dedicated consumer.
pub struct KafkaConnection {
    pub(crate) producer: FutureProducer,
    pub(crate) consumer: StreamConsumer,
}

#[async_trait]
impl PooledConnection for KafkaConnection {
    type Config = KafkaConnectionConfig;

    async fn create(cfg: &KafkaConnectionConfig) -> Result<Self, PoolError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &cfg.bootstrap_servers)
            .create()
            .map_err(|e| PoolError::CreateFailed(e.to_string()))?;

        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &cfg.bootstrap_servers)
            .set("group.id", &cfg.group_id)
            .set("enable.auto.commit", "true")
            .set("session.timeout.ms", "6000")
            .create()
            .map_err(|e| PoolError::CreateFailed(e.to_string()))?;

        if !cfg.consume_topics.is_empty() {
            let topics: Vec<&str> = cfg.consume_topics.iter().map(String::as_str).collect();
            consumer
                .subscribe(&topics)
                .map_err(|e| PoolError::CreateFailed(e.to_string()))?;
        }

        Ok(Self { producer, consumer })
    }

    async fn check_health(&mut self) -> bool {
        // The producer and consumer each manage their own broker
        // reconnection; there is no cheap liveness probe that doesn't
        // itself risk blocking on a down cluster, so this mirrors the HTTP
        // adapter's symbolic health check.
        true
    }
}
