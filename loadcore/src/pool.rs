//! Shared connection-pool contracts and configuration.
//!
//! The pool's actual acquire/release/replenish algorithm lives in
//! `loadcore-pool`, generic over [`PooledConnection`]. This module only
//! holds the trait and the typed config/stats shapes every adapter shares,
//! so `loadcore-pool` and the adapter crates can agree on them without a
//! circular crate dependency.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::PoolError;

/// A connection type a [`loadcore-pool`](https://docs.rs/loadcore-pool) pool
/// can create, health-check, and hand out.
///
/// Protocol is operation-defined, not mechanism-defined: the pool's
/// acquire/release/replenish algorithm is written exactly once against this
/// trait, and each adapter's concrete connection type (a
/// `redis::aio::MultiplexedConnection`, a `reqwest::Client` handle, an
/// `rdkafka` producer) implements it.
#[async_trait]
pub trait PooledConnection: Send + Sized + 'static {
    /// Per-connection configuration needed to create one (address,
    /// credentials, timeouts).
    type Config: Send + Sync;

    /// Establish a new connection. Failure here surfaces as
    /// [`PoolError::CreateFailed`].
    async fn create(cfg: &Self::Config) -> Result<Self, PoolError>;

    /// Cheap liveness check the pool runs before handing a connection out
    /// and during background replenishment, without necessarily
    /// round-tripping to the remote end.
    async fn check_health(&mut self) -> bool;
}

/// Configuration for a generic connection pool, shared across every
/// protocol adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum number of connections the pool will hold open at once.
    pub max_size: u32,

    /// Connections the pool tries to keep idle and ready, created eagerly
    /// by the replenishment task rather than lazily on first acquire.
    pub min_idle: u32,

    /// How long `acquire` waits for a connection before returning
    /// [`PoolError::Timeout`].
    pub acquire_timeout: Duration,

    /// How long an idle connection may sit before the replenishment task
    /// health-checks and potentially recycles it.
    pub idle_check_interval: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_size: 16,
            min_idle: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_check_interval: Duration::from_secs(30),
        }
    }
}

/// Point-in-time pool statistics, exposed for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PoolStats {
    /// Acquires satisfied by an already-idle connection.
    pub hits: u64,
    /// Acquires that had to create a new connection.
    pub misses: u64,
    /// Acquires that gave up after `acquire_timeout`.
    pub timeouts: u64,
    /// Connections currently checked out.
    pub active: u32,
    /// Connections currently idle and available.
    pub idle: u32,
}
