//! Error types for each protocol boundary.

use thiserror::Error;

/// Connection pool errors.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PoolError {
    /// `Acquire` did not get a connection before the caller's deadline.
    #[error("acquire timed out")]
    Timeout,

    /// The pool has been closed; no further acquisitions are possible.
    #[error("pool is closed")]
    Closed,

    /// Creating a new connection failed.
    #[error("connection creation failed: {0}")]
    CreateFailed(String),

    /// `Release` was called with a connection the pool does not recognize
    /// as one of its own active handles.
    #[error("released connection not recognized by this pool")]
    UnrecognizedConnection,

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Protocol adapter errors.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Config validation or the initial liveness probe failed at `Connect`.
    #[error("connect failed: {0}")]
    Connect(String),

    /// `Connect` was called a second time on an already-open adapter.
    #[error("already connected")]
    AlreadyConnected,

    /// The operation carried input the adapter cannot act on.
    #[error("bad operation field `{field}`: {reason}")]
    BadOperation {
        /// Name of the offending field.
        field: String,
        /// Why it was rejected.
        reason: String,
    },

    /// No pooled connection was available within the acquire timeout.
    #[error("pool timeout acquiring a connection")]
    PoolTimeout,

    /// The remote protocol rejected the request (bad command, auth failure).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The connection broke mid-call; it has been discarded from the pool.
    #[error("transport error: {0}")]
    Transport(String),

    /// The per-operation deadline elapsed before a response arrived.
    #[error("operation timed out")]
    Timeout,

    /// The operation was cancelled via the run's cancellation token.
    #[error("operation cancelled")]
    Cancelled,

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl From<PoolError> for AdapterError {
    fn from(err: PoolError) -> Self {
        match err {
            PoolError::Timeout => AdapterError::PoolTimeout,
            PoolError::Closed => AdapterError::Transport("pool closed".into()),
            other => AdapterError::Transport(other.to_string()),
        }
    }
}

/// Workload scheduler errors. These abort `Run` entirely — per-operation
/// failures never surface here, they are recorded into the snapshot instead.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// `job.operation_type` has no registered factory.
    #[error("no operation factory registered for type `{0}`")]
    UnknownOperationType(String),

    /// The job spec violated a structural invariant (e.g. both `total` and
    /// `duration` set, or neither).
    #[error("invalid job spec: {0}")]
    InvalidJobSpec(String),

    /// The adapter could not be connected before the run could start.
    #[error("adapter connect failed: {0}")]
    ConnectFailed(#[from] AdapterError),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
