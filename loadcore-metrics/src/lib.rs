//! # loadcore-metrics — lock-minimised outcome collector
//!
//! [`Collector`] records every [`OperationResult`] into per-type and
//! global atomics plus a bounded latency reservoir, and publishes
//! consistent [`Snapshot`]s on demand.
//!
//! ## Concurrency design
//!
//! Counters are plain atomics, incremented on the hot `record` path with no
//! lock at all. The two pieces of state that cannot be atomics — the
//! bounded reservoir and the per-type map — are each behind their own
//! `std::sync::Mutex`, held only long enough to push a sample or look up an
//! entry. Quantiles are never computed under that lock: `snapshot` clones
//! the reservoir's contents, releases the lock, then sorts the clone.

#![deny(missing_docs)]

mod classify;
mod reservoir;
mod throughput;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use loadcore::{ErrorClass, ErrorEntry, Impact, OperationResult, Snapshot, TypeSnapshot};

use reservoir::ReservoirState;
use throughput::ThroughputWindow;

pub use classify::classify;
pub use reservoir::{quantiles, Quantiles};

/// Default number of latency samples retained per reservoir.
pub const DEFAULT_RESERVOIR_CAPACITY: usize = 10_000;

struct TypeStats {
    total: AtomicU64,
    success: AtomicU64,
    failed: AtomicU64,
    reservoir: Mutex<ReservoirState>,
}

impl TypeStats {
    fn new(capacity: usize) -> Self {
        Self {
            total: AtomicU64::new(0),
            success: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            reservoir: Mutex::new(ReservoirState::new(capacity)),
        }
    }
}

struct ErrorState {
    count: u64,
    impact: Impact,
    last_seen: Duration,
}

/// Records operation outcomes and publishes point-in-time [`Snapshot`]s.
///
/// One instance per run, shared behind an `Arc` across every worker task —
/// `record` takes `&self`, not `&mut self`, so it never needs its own lock
/// at the call site.
pub struct Collector {
    total: AtomicU64,
    success: AtomicU64,
    failed: AtomicU64,
    read: AtomicU64,
    write: AtomicU64,
    bytes: AtomicU64,
    scheduler_errors: AtomicU64,

    reservoir: Mutex<ReservoirState>,
    by_type: Mutex<HashMap<String, TypeStats>>,
    errors: Mutex<HashMap<ErrorClass, ErrorState>>,
    throughput: ThroughputWindow,

    reservoir_capacity: usize,
    start: Mutex<Option<Instant>>,
}

impl Collector {
    /// Create a collector with the default reservoir capacity.
    pub fn new() -> Self {
        Self::with_reservoir_capacity(DEFAULT_RESERVOIR_CAPACITY)
    }

    /// Create a collector with an explicit reservoir capacity.
    pub fn with_reservoir_capacity(reservoir_capacity: usize) -> Self {
        Self {
            total: AtomicU64::new(0),
            success: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            read: AtomicU64::new(0),
            write: AtomicU64::new(0),
            bytes: AtomicU64::new(0),
            scheduler_errors: AtomicU64::new(0),
            reservoir: Mutex::new(ReservoirState::new(reservoir_capacity)),
            by_type: Mutex::new(HashMap::new()),
            errors: Mutex::new(HashMap::new()),
            throughput: ThroughputWindow::new(),
            reservoir_capacity,
            start: Mutex::new(None),
        }
    }

    fn mark_started(&self) -> Instant {
        let mut start = self.start.lock().unwrap_or_else(|e| e.into_inner());
        *start.get_or_insert_with(Instant::now)
    }

    /// Record the outcome of one operation of type `op_type`.
    ///
    /// Infallible: there is no I/O on this path, so there is nothing to
    /// propagate as an error.
    pub fn record(&self, op_type: &str, result: &OperationResult) {
        let start = self.mark_started();
        let elapsed_secs = start.elapsed().as_secs();

        self.total.fetch_add(1, Ordering::Relaxed);
        if result.is_read {
            self.read.fetch_add(1, Ordering::Relaxed);
        } else {
            self.write.fetch_add(1, Ordering::Relaxed);
        }
        if let Some(value) = &result.value {
            self.bytes.fetch_add(value.len() as u64, Ordering::Relaxed);
        }

        if result.success {
            self.success.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
            if let Some(message) = &result.error {
                let (class, impact) = classify::classify(message);
                let mut errors = self.errors.lock().unwrap_or_else(|e| e.into_inner());
                let entry = errors.entry(class).or_insert(ErrorState {
                    count: 0,
                    impact,
                    last_seen: Duration::ZERO,
                });
                entry.count += 1;
                entry.impact = impact;
                entry.last_seen = start.elapsed();
            }
        }

        self.reservoir
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(result.duration);
        self.throughput.record(elapsed_secs);

        let mut by_type = self.by_type.lock().unwrap_or_else(|e| e.into_inner());
        let stats = by_type
            .entry(op_type.to_string())
            .or_insert_with(|| TypeStats::new(self.reservoir_capacity));
        stats.total.fetch_add(1, Ordering::Relaxed);
        if result.success {
            stats.success.fetch_add(1, Ordering::Relaxed);
        } else {
            stats.failed.fetch_add(1, Ordering::Relaxed);
        }
        stats
            .reservoir
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(result.duration);
    }

    /// Record an operation the scheduler could not even issue (a factory
    /// failure). Does not affect `total`/`success`/`failed`.
    pub fn record_scheduler_error(&self) {
        self.scheduler_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Produce a consistent, immutable read of everything recorded so far.
    pub fn snapshot(&self) -> Snapshot {
        let total = self.total.load(Ordering::Relaxed);
        let success = self.success.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);
        let read = self.read.load(Ordering::Relaxed);
        let write = self.write.load(Ordering::Relaxed);

        let start = self.start.lock().unwrap_or_else(|e| e.into_inner());
        let duration = start.map(|s| s.elapsed()).unwrap_or_default();
        let elapsed_secs = duration.as_secs();
        drop(start);

        let samples = self
            .reservoir
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .snapshot_samples();
        let q = quantiles(samples);

        let by_type = {
            let guard = self.by_type.lock().unwrap_or_else(|e| e.into_inner());
            guard
                .iter()
                .map(|(name, stats)| {
                    let samples = stats
                        .reservoir
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .snapshot_samples();
                    let tq = quantiles(samples);
                    (
                        name.clone(),
                        TypeSnapshot {
                            total: stats.total.load(Ordering::Relaxed),
                            success: stats.success.load(Ordering::Relaxed),
                            failed: stats.failed.load(Ordering::Relaxed),
                            min: tq.min,
                            max: tq.max,
                            avg: tq.avg,
                            p50: tq.p50,
                            p90: tq.p90,
                            p95: tq.p95,
                            p99: tq.p99,
                        },
                    )
                })
                .collect()
        };

        let errors = {
            let guard = self.errors.lock().unwrap_or_else(|e| e.into_inner());
            guard
                .iter()
                .map(|(class, state)| {
                    (
                        *class,
                        ErrorEntry {
                            count: state.count,
                            impact: state.impact,
                            last_seen: state.last_seen,
                        },
                    )
                })
                .collect()
        };

        let success_rate = if total > 0 {
            (success as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        let rps = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Snapshot {
            run_id: None,
            total,
            success,
            failed,
            read,
            write,
            success_rate,
            rps,
            min: q.min,
            max: q.max,
            avg: q.avg,
            p50: q.p50,
            p90: q.p90,
            p95: q.p95,
            p99: q.p99,
            by_type,
            errors,
            throughput_window: self.throughput.snapshot(elapsed_secs),
            duration,
            scheduler_errors: self.scheduler_errors.load(Ordering::Relaxed),
        }
    }

    /// Halt any background sampling this collector runs.
    ///
    /// A no-op today: every counter here is updated synchronously from
    /// `record`, so there is no background task to stop. Kept as part of
    /// the public interface (alongside `record`/`snapshot`/`reset`) so a
    /// caller written against that four-method contract doesn't need to
    /// special-case this collector, and so a future background sampler
    /// (a periodic throughput push, say) has a defined place to shut down
    /// from.
    pub fn stop(&self) {}

    /// Discard all recorded state, as if the collector had just been
    /// created with the same reservoir capacity.
    pub fn reset(&self) {
        self.total.store(0, Ordering::Relaxed);
        self.success.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        self.read.store(0, Ordering::Relaxed);
        self.write.store(0, Ordering::Relaxed);
        self.bytes.store(0, Ordering::Relaxed);
        self.scheduler_errors.store(0, Ordering::Relaxed);
        self.reservoir
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        self.by_type.lock().unwrap_or_else(|e| e.into_inner()).clear();
        self.errors.lock().unwrap_or_else(|e| e.into_inner()).clear();
        *self.start.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    fn success_result(is_read: bool, ms: u64) -> OperationResult {
        OperationResult::success(is_read, StdDuration::from_millis(ms), None)
    }

    #[test]
    fn empty_collector_has_zeroed_snapshot() {
        let c = Collector::new();
        let snap = c.snapshot();
        assert_eq!(snap.total, 0);
        assert_eq!(snap.success_rate, 0.0);
    }

    #[test]
    fn records_roll_up_into_totals_and_rw_split() {
        let c = Collector::new();
        c.record("get", &success_result(true, 5));
        c.record("set", &success_result(false, 7));
        let snap = c.snapshot();
        assert_eq!(snap.total, 2);
        assert_eq!(snap.read, 1);
        assert_eq!(snap.write, 1);
        assert_eq!(snap.success, 2);
    }

    #[test]
    fn failures_are_classified() {
        let c = Collector::new();
        let mut result = success_result(true, 3);
        result.success = false;
        result.error = Some("connection refused".to_string());
        c.record("get", &result);

        let snap = c.snapshot();
        assert_eq!(snap.failed, 1);
        assert!(snap.errors.contains_key(&loadcore::ErrorClass::Connection));
    }

    #[test]
    fn scheduler_errors_are_excluded_from_totals() {
        let c = Collector::new();
        c.record_scheduler_error();
        c.record_scheduler_error();
        let snap = c.snapshot();
        assert_eq!(snap.total, 0);
        assert_eq!(snap.scheduler_errors, 2);
    }

    #[test]
    fn by_type_breakdown_is_populated() {
        let c = Collector::new();
        c.record("get", &success_result(true, 1));
        c.record("get", &success_result(true, 2));
        c.record("set", &success_result(false, 3));
        let snap = c.snapshot();
        assert_eq!(snap.by_type.get("get").unwrap().total, 2);
        assert_eq!(snap.by_type.get("set").unwrap().total, 1);
    }

    #[test]
    fn stop_does_not_affect_recorded_state() {
        let c = Collector::new();
        c.record("get", &success_result(true, 1));
        c.stop();
        let snap = c.snapshot();
        assert_eq!(snap.total, 1);
    }

    #[test]
    fn reset_clears_all_state() {
        let c = Collector::new();
        c.record("get", &success_result(true, 1));
        c.reset();
        let snap = c.snapshot();
        assert_eq!(snap.total, 0);
        assert!(snap.by_type.is_empty());
    }

    #[test]
    fn latency_ordering_invariant_holds_for_every_snapshot() {
        let c = Collector::new();
        for ms in [1, 50, 10, 99, 5, 200, 2] {
            c.record("get", &success_result(true, ms));
        }
        let snap = c.snapshot();
        assert!(snap.min.unwrap() <= snap.avg.unwrap());
        assert!(snap.avg.unwrap() <= snap.max.unwrap());
        assert!(snap.p50.unwrap() <= snap.p90.unwrap());
        assert!(snap.p90.unwrap() <= snap.p95.unwrap());
        assert!(snap.p95.unwrap() <= snap.p99.unwrap());
    }
}
