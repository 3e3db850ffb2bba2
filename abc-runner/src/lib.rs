#![deny(missing_docs)]
//! # abc-runner — umbrella crate
//!
//! Single import surface for the load-generation engine. Re-exports the
//! core data model, scheduler, metrics, and pool unconditionally, and the
//! protocol adapters behind feature flags, plus a `prelude` and a
//! `run_job` convenience function for the happy path.

pub use loadcore;
pub use loadcore_metrics;
pub use loadcore_pool;
pub use loadcore_scheduler;

#[cfg(feature = "adapter-http")]
pub use loadcore_adapter_http;
#[cfg(feature = "adapter-kafka")]
pub use loadcore_adapter_kafka;
#[cfg(feature = "adapter-redis")]
pub use loadcore_adapter_redis;

use std::sync::Arc;

use loadcore::{JobSpec, OperationRegistry, ProtocolAdapter, SchedulerError, Snapshot};
use loadcore_scheduler::Scheduler;
use tokio_util::sync::CancellationToken;

/// Run one [`JobSpec`] to completion against `adapter`, using `registry` to
/// look up operation factories, and return the resulting [`Snapshot`].
///
/// Thin wrapper around [`Scheduler::run`] — the entry point most callers
/// reach for instead of constructing a `Scheduler` directly.
pub async fn run_job(
    job: JobSpec,
    adapter: Arc<dyn ProtocolAdapter>,
    registry: Arc<OperationRegistry>,
    cancellation: CancellationToken,
) -> Result<Snapshot, SchedulerError> {
    Scheduler::default()
        .run(job, adapter, registry, cancellation)
        .await
}

/// Happy-path imports for composing a load-generation run.
pub mod prelude {
    pub use loadcore::{
        AdapterError, ErrorClass, Impact, JobSpec, KeyGenerator, KeyMode, Operation,
        OperationFactory, OperationKind, OperationRegistry, OperationResult, PoolConfig,
        PooledConnection, ProtocolAdapter, SchedulerError, Snapshot, Termination,
    };
    pub use loadcore_metrics::Collector;
    pub use loadcore_pool::Pool;
    pub use loadcore_scheduler::Scheduler;
    pub use tokio_util::sync::CancellationToken;

    pub use crate::run_job;

    #[cfg(feature = "adapter-http")]
    pub use loadcore_adapter_http::{HttpAdapter, HttpConfig};
    #[cfg(feature = "adapter-kafka")]
    pub use loadcore_adapter_kafka::{KafkaAdapter, KafkaConfig};
    #[cfg(feature = "adapter-redis")]
    pub use loadcore_adapter_redis::{RedisAdapter, RedisConfig, RedisTopology};
}
