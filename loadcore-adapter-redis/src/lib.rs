#![deny(missing_docs)]
//! # loadcore-adapter-redis — Redis protocol adapter
//!
//! Implements [`ProtocolAdapter`] over `redis`'s multiplexed async client.
//! A missing key on `get`/`hget` is this adapter's "not-found" sentinel and
//! follows the same successful-empty-read rule as the HTTP adapter's 404.
//!
//! `subscribe` is simulated: rather than maintaining a live subscription per
//! operation (which would turn one `Operation` into an open-ended stream,
//! foreign to this engine's request/response model), it reports a
//! synthesized success without ever issuing a Pub/Sub `SUBSCRIBE` command.

mod connection;
mod error;
mod factory;

pub use connection::{RedisConnection, RedisConnectionConfig, RedisTopology};
pub use factory::{
    ExpireFactory, GetFactory, HGetFactory, HSetFactory, IncrFactory, PublishFactory, SetFactory,
    SetGetRandomFactory, SubscribeFactory, ZAddFactory,
};

use async_trait::async_trait;
use redis::AsyncCommands;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use loadcore::{AdapterError, Operation, OperationKind, OperationResult, PoolConfig, ProtocolAdapter};
use loadcore_pool::Pool;

/// Typed configuration for the Redis adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Deployment topology and address(es).
    pub topology: RedisTopology,
    /// Pool sizing/timeout configuration.
    #[serde(default)]
    pub pool: PoolConfig,
}

fn dispatch_table() -> HashMap<&'static str, OperationKind> {
    HashMap::from([
        ("get", OperationKind::Read),
        ("set", OperationKind::Write),
        ("hget", OperationKind::Read),
        ("hset", OperationKind::Write),
        ("incr", OperationKind::Write),
        ("expire", OperationKind::Write),
        ("zadd", OperationKind::Write),
        ("publish", OperationKind::Write),
        ("subscribe", OperationKind::Read),
    ])
}

/// Redis protocol adapter.
pub struct RedisAdapter {
    pool: Pool<RedisConnection>,
    dispatch: HashMap<&'static str, OperationKind>,
    connected: AtomicBool,
}

impl RedisAdapter {
    /// Construct an adapter. The underlying pool starts filling toward
    /// `config.pool.min_idle` immediately; `connect` only runs a liveness
    /// probe (`PING`) and marks the adapter ready for `execute`.
    pub fn new(config: RedisConfig) -> Self {
        let conn_cfg = RedisConnectionConfig {
            topology: config.topology,
        };
        let pool = Pool::new(config.pool, conn_cfg);
        Self {
            pool,
            dispatch: dispatch_table(),
            connected: AtomicBool::new(false),
        }
    }

    async fn do_execute(&self, op: &Operation) -> Result<OperationResult, AdapterError> {
        let mut conn = self.pool.acquire().await?;
        let started = Instant::now();

        let result = self.dispatch_one(op, &mut conn.conn, started).await;

        if let Err(err) = self.pool.release(conn).await {
            tracing::warn!(error = %err, "pool rejected release of its own connection");
        }
        result
    }

    async fn dispatch_one(
        &self,
        op: &Operation,
        conn: &mut redis::aio::MultiplexedConnection,
        started: Instant,
    ) -> Result<OperationResult, AdapterError> {
        match op.op_type.as_str() {
            "get" => {
                let value: Option<Vec<u8>> =
                    conn.get(&op.key).await.map_err(error::map_redis_error)?;
                Ok(match value {
                    Some(bytes) => {
                        OperationResult::success(true, started.elapsed(), Some(bytes.into()))
                    }
                    None => OperationResult::successful_empty_read(started.elapsed()),
                })
            }
            "set" => {
                let value = op.value.clone().unwrap_or_default();
                match op.ttl {
                    Some(ttl) => {
                        let _: () = conn
                            .set_ex(&op.key, value.to_vec(), ttl.as_secs().max(1))
                            .await
                            .map_err(error::map_redis_error)?;
                    }
                    None => {
                        let _: () = conn
                            .set(&op.key, value.to_vec())
                            .await
                            .map_err(error::map_redis_error)?;
                    }
                }
                Ok(OperationResult::success(false, started.elapsed(), None))
            }
            "hget" => {
                let field = op.param_str("field").unwrap_or("f1");
                let value: Option<Vec<u8>> = conn
                    .hget(&op.key, field)
                    .await
                    .map_err(error::map_redis_error)?;
                Ok(match value {
                    Some(bytes) => {
                        OperationResult::success(true, started.elapsed(), Some(bytes.into()))
                    }
                    None => OperationResult::successful_empty_read(started.elapsed()),
                })
            }
            "hset" => {
                let field = op.param_str("field").unwrap_or("f1").to_string();
                let value = op.value.clone().unwrap_or_default();
                let _: () = conn
                    .hset(&op.key, field, value.to_vec())
                    .await
                    .map_err(error::map_redis_error)?;
                Ok(OperationResult::success(false, started.elapsed(), None))
            }
            "incr" => {
                let new_value: i64 = conn
                    .incr(&op.key, 1)
                    .await
                    .map_err(error::map_redis_error)?;
                Ok(OperationResult::success(
                    false,
                    started.elapsed(),
                    Some(new_value.to_string().into_bytes().into()),
                ))
            }
            "expire" => {
                let ttl = op.ttl.map(|d| d.as_secs().max(1) as i64).unwrap_or(60);
                let _: bool = conn
                    .expire(&op.key, ttl)
                    .await
                    .map_err(error::map_redis_error)?;
                Ok(OperationResult::success(false, started.elapsed(), None))
            }
            "zadd" => {
                let score = op
                    .params
                    .get("score")
                    .and_then(serde_json::Value::as_f64)
                    .unwrap_or(0.0);
                let _: i64 = conn
                    .zadd(&op.key, &op.key, score)
                    .await
                    .map_err(error::map_redis_error)?;
                Ok(OperationResult::success(false, started.elapsed(), None))
            }
            "publish" => {
                let value = op.value.clone().unwrap_or_default();
                let _: i64 = conn
                    .publish(&op.key, value.to_vec())
                    .await
                    .map_err(error::map_redis_error)?;
                Ok(OperationResult::success(false, started.elapsed(), None))
            }
            "subscribe" => Ok(OperationResult::successful_empty_read(started.elapsed())
                .with_metadata("channel", op.key.clone())),
            other => Err(AdapterError::BadOperation {
                field: "op_type".into(),
                reason: format!("unsupported Redis operation type `{other}`"),
            }),
        }
    }
}

#[async_trait]
impl ProtocolAdapter for RedisAdapter {
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
                reason: format!("unsupported Redis operation type `{}`", op.op_type),
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
        let mut conn = self.pool.acquire().await?;
        let result: Result<(), AdapterError> = redis::cmd("PING")
            .query_async::<String>(&mut conn.conn)
            .await
            .map(|_| ())
            .map_err(error::map_redis_error);
        if let Err(err) = self.pool.release(conn).await {
            tracing::warn!(error = %err, "pool rejected release of its own connection");
        }
        result
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
