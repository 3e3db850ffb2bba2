//! The immutable point-in-time view a [`crate::MetricsCollector`] publishes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::id::RunId;
use crate::latency::LatencyMs;

/// Error classification bucket, assigned by first-substring-match over a
/// static ordered table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Connection refused, reset, or broken pipe.
    Connection,
    /// Per-operation or acquire deadline elapsed.
    Timeout,
    /// Credentials rejected.
    Authentication,
    /// Authenticated but not authorized.
    Permission,
    /// The remote protocol rejected the request shape.
    Protocol,
    /// Out-of-memory or resource-exhaustion signal from the remote end.
    Memory,
    /// Did not match any known substring.
    Unknown,
}

/// Severity tag attached to an [`ErrorClass`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Impact {
    /// Likely to invalidate the whole run (connection, authentication).
    High,
    /// Degrades results but the run can continue (timeout, protocol).
    Medium,
    /// Informational (unknown, memory pressure reported by the remote end).
    Low,
}

/// Aggregated counters and stats for one operation type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeSnapshot {
    /// Total operations of this type recorded.
    pub total: u64,
    /// Operations of this type that succeeded.
    pub success: u64,
    /// Operations of this type that failed.
    pub failed: u64,
    /// Minimum observed latency, if any operations were recorded.
    pub min: Option<LatencyMs>,
    /// Maximum observed latency, if any operations were recorded.
    pub max: Option<LatencyMs>,
    /// Mean observed latency, if any operations were recorded.
    pub avg: Option<LatencyMs>,
    /// 50th percentile latency over the retained reservoir sample.
    pub p50: Option<LatencyMs>,
    /// 90th percentile latency over the retained reservoir sample.
    pub p90: Option<LatencyMs>,
    /// 95th percentile latency over the retained reservoir sample.
    pub p95: Option<LatencyMs>,
    /// 99th percentile latency over the retained reservoir sample.
    pub p99: Option<LatencyMs>,
}

/// One error class's aggregated count and severity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// Occurrences tagged with this class since the last reset.
    pub count: u64,
    /// Severity assigned to the class.
    pub impact: Impact,
    /// Seconds since the run started when this class was last observed.
    pub last_seen: Duration,
}

/// A consistent, immutable point-in-time view of everything the collector
/// has recorded.
///
/// Built once inside `Collector::snapshot()` by cloning the reservoir under
/// its lock and releasing the lock before computing quantiles — readers
/// never see a value mutate after construction.
#[non_exhaustive]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Identifier of the run this snapshot was taken from, if the caller
    /// that drove it assigned one.
    pub run_id: Option<RunId>,

    /// Total operations recorded across all types.
    pub total: u64,
    /// Operations recorded as successful, including successful empty reads.
    pub success: u64,
    /// Operations recorded as failed.
    pub failed: u64,
    /// Operations classified as reads.
    pub read: u64,
    /// Operations classified as writes.
    pub write: u64,

    /// `success / total` as a percentage, `0.0` when `total == 0`.
    pub success_rate: f64,
    /// Operations per second over the run's elapsed duration.
    pub rps: f64,

    /// Minimum latency across all recorded operations.
    pub min: Option<LatencyMs>,
    /// Maximum latency across all recorded operations.
    pub max: Option<LatencyMs>,
    /// Mean latency across all recorded operations.
    pub avg: Option<LatencyMs>,
    /// 50th percentile latency over the retained reservoir sample.
    pub p50: Option<LatencyMs>,
    /// 90th percentile latency over the retained reservoir sample.
    pub p90: Option<LatencyMs>,
    /// 95th percentile latency over the retained reservoir sample.
    pub p95: Option<LatencyMs>,
    /// 99th percentile latency over the retained reservoir sample.
    pub p99: Option<LatencyMs>,

    /// Per-operation-type breakdown.
    pub by_type: HashMap<String, TypeSnapshot>,

    /// Error classification counts since the last reset.
    pub errors: HashMap<ErrorClass, ErrorEntry>,

    /// Rolling per-second operation counts, oldest first, fixed length.
    pub throughput_window: Vec<u64>,

    /// Time elapsed since the first recorded operation.
    pub duration: Duration,

    /// Operations the scheduler could not even issue (factory failures).
    /// Excluded from `total`/`success`/`failed` per the "does not count
    /// toward the success/failure totals" rule.
    pub scheduler_errors: u64,
}
