#![deny(missing_docs)]
//! # loadcore-adapter-kafka — Kafka protocol adapter
//!
//! Implements [`ProtocolAdapter`] over `rdkafka`'s async producer/consumer.
//! An empty poll within `config.poll_timeout` is this adapter's "not-found"
//! sentinel and follows the same successful-empty-read rule as the Redis
//! and HTTP adapters' own absence signals.
//!
//! `ProtocolAdapter::execute` receives no per-operation timeout of its own
//! (the scheduler applies one around the whole call as a safety net) — the
//! deadline `kafka_consume` polls against is `config.poll_timeout` instead.

mod connection;
mod error;
mod factory;

pub use connection::{KafkaConnection, KafkaConnectionConfig};
pub use factory::{KafkaConsumeFactory, KafkaProduceFactory};

use async_trait::async_trait;
use rdkafka::consumer::Consumer;
use rdkafka::message::Message;
use rdkafka::producer::FutureRecord;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use loadcore::{AdapterError, Operation, OperationKind, OperationResult, PoolConfig, ProtocolAdapter};
use loadcore_pool::Pool;

/// Typed configuration for the Kafka adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KafkaConfig {
    /// Comma-separated `host:port` broker list.
    pub bootstrap_servers: String,
    /// Consumer group ID for `kafka_consume` operations.
    pub group_id: String,
    /// Topics the consumer half subscribes to.
    #[serde(default)]
    pub consume_topics: Vec<String>,
    /// How long `kafka_produce` waits for broker acknowledgement.
    #[serde(default = "default_produce_timeout")]
    pub produce_timeout: Duration,
    /// How long `kafka_consume` polls before treating the absence of a
    /// message as a successful empty read.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout: Duration,
    /// Pool sizing/timeout configuration.
    #[serde(default)]
    pub pool: PoolConfig,
}

fn default_produce_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_poll_timeout() -> Duration {
    Duration::from_secs(1)
}

fn dispatch_table() -> HashMap<&'static str, OperationKind> {
    HashMap::from([
        ("kafka_produce", OperationKind::Write),
        ("kafka_consume", OperationKind::Read),
    ])
}

/// Kafka protocol adapter.
pub struct KafkaAdapter {
    config: KafkaConfig,
    pool: Pool<KafkaConnection>,
    dispatch: HashMap<&'static str, OperationKind>,
    connected: AtomicBool,
}

impl KafkaAdapter {
    /// Construct an adapter. The underlying pool starts filling toward
    /// `config.pool.min_idle` immediately; `connect` only marks the adapter
    /// ready for `execute`.
    pub fn new(config: KafkaConfig) -> Self {
        let conn_cfg = KafkaConnectionConfig {
            bootstrap_servers: config.bootstrap_servers.clone(),
            group_id: config.group_id.clone(),
            consume_topics: config.consume_topics.clone(),
        };
        let pool = Pool::new(config.pool.clone(), conn_cfg);
        Self {
            config,
            pool,
            dispatch: dispatch_table(),
            connected: AtomicBool::new(false),
        }
    }

    async fn do_execute(&self, op: &Operation) -> Result<OperationResult, AdapterError> {
        let conn = self.pool.acquire().await?;
        let started = Instant::now();

        let result = match op.op_type.as_str() {
            "kafka_produce" => {
                let value = op.value.clone().unwrap_or_default();
                let partition_key = op
                    .param_str("partition_key")
                    .map(str::to_string)
                    .unwrap_or_default();
                let record = FutureRecord::to(&op.key)
                    .key(&partition_key)
                    .payload(value.as_ref());
                conn.producer
                    .send(record, rdkafka::util::Timeout::After(self.config.produce_timeout))
                    .await
                    .map(|_| OperationResult::success(false, started.elapsed(), None))
                    .map_err(|(err, _msg)| error::map_kafka_error(err))
            }
            "kafka_consume" => {
                match tokio::time::timeout(self.config.poll_timeout, conn.consumer.recv()).await {
                    Ok(Ok(message)) => {
                        let value = message.payload().map(|p| bytes::Bytes::copy_from_slice(p));
                        Ok(OperationResult::success(true, started.elapsed(), value))
                    }
                    Ok(Err(err)) => Err(error::map_kafka_error(err)),
                    Err(_elapsed) => Ok(OperationResult::successful_empty_read(started.elapsed())),
                }
            }
            other => Err(AdapterError::BadOperation {
                field: "op_type".into(),
                reason: format!("unsupported Kafka operation type `{other}`"),
            }),
        };

        if let Err(err) = self.pool.release(conn).await {
            tracing::warn!(error = %err, "pool rejected release of its own connection");
        }
        result
    }
}

#[async_trait]
impl ProtocolAdapter for KafkaAdapter {
    async fn connect(&self) -> Result<(), AdapterError> {
        if self.connected.swap(true, Ordering::AcqRel) {
            return Err(AdapterError::AlreadyConnected);
        }
        self.health_check().await
    }

    async fn execute(&self, op: &Operation) -> Result<OperationResult, AdapterError> {
        if !self.dispatch.contains_key(op.op_type.as_str()) {
            return Err(AdapterError::BadOperation {
                field: "op_type".into(),
                reason: format!("unsupported Kafka operation type `{}`", op.op_type),
            });
        }
        self.do_execute(op).await
    }

    fn kind_of(&self, op_type: &str) -> Option<OperationKind> {
        self.dispatch.get(op_type).copied()
    }

    async fn close(&self) {
        self.pool.close().await;
    }

    async fn health_check(&self) -> Result<(), AdapterError> {
        let conn = self.pool.acquire().await?;
        if let Err(err) = self.pool.release(conn).await {
            tracing::warn!(error = %err, "pool rejected release of its own connection");
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "kafka"
    }
}
