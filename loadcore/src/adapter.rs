//! The protocol boundary adapters implement.

use async_trait::async_trait;

use crate::error::AdapterError;
use crate::operation::{Operation, OperationResult};

/// Whether an operation type reads or writes, for read/write metrics split.
///
/// Determined by the adapter's dispatch table, not by the outcome of any
/// particular call — a failed write is still a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// The operation only observes state (`get`, `http_get`, `kafka_consume`, ...).
    Read,
    /// The operation mutates remote state (`set`, `http_post`, `kafka_produce`, ...).
    Write,
}

/// The protocol boundary the scheduler drives and the metrics collector
/// observes. One implementation per wire protocol (Redis, HTTP, Kafka, ...);
/// the scheduler and collector are written against this trait alone and
/// never see a protocol-specific type.
///
/// Implementations own a [`crate::Pool`] internally — the pool is a
/// generic, concretely-typed field on the adapter struct, not a trait
/// object the scheduler threads through, since only the adapter's `execute`
/// needs to touch it.
#[async_trait]
pub trait ProtocolAdapter: Send + Sync {
    /// Validate configuration and establish whatever the adapter needs to
    /// start serving `execute` calls (a connection pool, a topic handle, a
    /// liveness probe). Calling `connect` twice on an already-open adapter
    /// is [`AdapterError::AlreadyConnected`].
    async fn connect(&self) -> Result<(), AdapterError>;

    /// Run one operation to completion. Never panics on a malformed
    /// `Operation` — unknown `op_type` values and missing required fields
    /// are [`AdapterError::BadOperation`].
    ///
    /// A missing-key read is success with an empty value, built via
    /// [`OperationResult::successful_empty_read`] — it is never surfaced as
    /// an `Err`.
    async fn execute(&self, op: &Operation) -> Result<OperationResult, AdapterError>;

    /// Classify an operation type as a read or a write, without executing
    /// it. The scheduler calls this up front to size read/write rate
    /// counters in the collector.
    fn kind_of(&self, op_type: &str) -> Option<OperationKind>;

    /// Release any held resources (pool connections, producer handles).
    /// Idempotent — calling `close` on an adapter that was never connected,
    /// or twice, is not an error.
    async fn close(&self);

    /// Cheap liveness probe independent of any particular operation.
    async fn health_check(&self) -> Result<(), AdapterError>;

    /// Protocol name used in logs and snapshot metadata, e.g. `"redis"`.
    fn name(&self) -> &'static str;
}
