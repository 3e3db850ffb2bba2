//! The pooled connection type for the Redis adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use loadcore::{PoolError, PooledConnection};

/// How the Redis deployment behind this adapter is arranged.
///
/// The dispatch table (§3.1) is identical across every topology; this only
/// changes how [`RedisConnection::create`] builds its client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RedisTopology {
    /// A single Redis node at `url`.
    Standalone {
        /// `redis://host:port/db`-style connection string.
        url: String,
    },
    /// A Sentinel-monitored deployment. Connects directly to the master
    /// address rather than performing Sentinel discovery, which this
    /// adapter does not implement.
    Sentinel {
        /// Address of the current master, resolved by an external
        /// collaborator ahead of time.
        master_url: String,
    },
    /// A cluster deployment. Connects to one seed node rather than the
    /// full cluster topology, which this adapter does not implement
    /// (no cluster-aware redirection).
    Cluster {
        /// Address of one cluster node used as the entry point.
        seed_url: String,
    },
}

impl RedisTopology {
    fn connection_url(&self) -> &str {
        match self {
            RedisTopology::Standalone { url } => url,
            RedisTopology::Sentinel { master_url } => master_url,
            RedisTopology::Cluster { seed_url } => seed_url,
        }
    }
}

/// Configuration needed to build one [`RedisConnection`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConnectionConfig {
    /// Deployment topology and address(es).
    pub topology: RedisTopology,
}

/// A live multiplexed Redis connection.
pub struct RedisConnection {
    pub(crate) conn: redis::aio::MultiplexedConnection,
}

#[async_trait]
impl PooledConnection for RedisConnection {
    type Config = RedisConnectionConfig;

    async fn create(cfg: &RedisConnectionConfig) -> Result<Self, PoolError> {
        let client = redis::Client::open(cfg.topology.connection_url())
            .map_err(|e| PoolError::CreateFailed(e.to_string()))?;
        let conn = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|e| PoolError::CreateFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    async fn check_health(&mut self) -> bool {
        redis::cmd("PING")
            .query_async::<String>(&mut self.conn)
            .await
            .is_ok()
    }
}
