#![deny(missing_docs)]
//! The workload scheduler: a worker-pool runtime that drives operations
//! against a [`ProtocolAdapter`] to completion against a fixed count, a
//! fixed duration, optional ramp-up, and per-operation timeouts.
//!
//! Each worker is a long-running `tokio::spawn`ed task, fanned out the same
//! way a fan-out dispatcher spawns one task per unit of concurrent work —
//! except here each task loops until termination rather than completing a
//! single unit, and is joined at the end of `Scheduler::run`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::time::Instant as TokioInstant;
use tokio_util::sync::CancellationToken;

use loadcore::{
    AdapterError, FactoryParams, JobSpec, KeyGenerator, KeyMode, OperationKind, OperationRegistry,
    OperationResult, ProtocolAdapter, RunId, SchedulerError, Termination, WorkerId,
};
use loadcore_metrics::Collector;

/// Drives one [`JobSpec`] to completion against a [`ProtocolAdapter`].
///
/// Stateless — `run` takes every dependency it needs as an argument, so one
/// `Scheduler` value (there is nothing to hold, it is a unit struct) can
/// drive any number of runs sequentially or concurrently.
#[derive(Debug, Default, Clone, Copy)]
pub struct Scheduler;

/// Shared, read-only state every worker of one run needs.
struct RunContext {
    adapter: Arc<dyn ProtocolAdapter>,
    factory: Arc<dyn loadcore::OperationFactory>,
    factory_params: FactoryParams,
    collector: Arc<Collector>,
    timeout: std::time::Duration,
    cancellation: CancellationToken,
    issued: AtomicU64,
    termination: Termination,
    deadline: Option<TokioInstant>,
}

impl RunContext {
    /// Claim the next unit of work, or `None` if the run has terminated.
    fn claim(&self) -> bool {
        if self.cancellation.is_cancelled() {
            return false;
        }
        match self.termination {
            Termination::Count(total) => {
                let claimed = self.issued.fetch_add(1, Ordering::Relaxed);
                claimed < total
            }
            Termination::Duration(_) => {
                let deadline = self.deadline.expect("duration run always sets a deadline");
                TokioInstant::now() < deadline
            }
        }
    }
}

impl Scheduler {
    /// Run `job` to completion against `adapter`, fabricating operations
    /// from `registry`, and return the final metrics snapshot.
    ///
    /// `cancellation` is the run's root context: cancelling it stops every
    /// worker cooperatively between operations (no in-flight operation is
    /// interrupted except by its own per-operation timeout). A caller with
    /// no external cancellation need simply passes `CancellationToken::new()`.
    pub async fn run(
        &self,
        job: JobSpec,
        adapter: Arc<dyn ProtocolAdapter>,
        registry: Arc<OperationRegistry>,
        cancellation: CancellationToken,
    ) -> Result<loadcore::Snapshot, SchedulerError> {
        job.validate()?;

        let run_id = RunId::generate();

        if matches!(job.termination, Termination::Count(0)) {
            let mut snapshot = loadcore::Snapshot::default();
            snapshot.run_id = Some(run_id);
            return Ok(snapshot);
        }

        let factory = registry
            .get(&job.operation_type)
            .ok_or_else(|| SchedulerError::UnknownOperationType(job.operation_type.clone()))?;

        match adapter.connect().await {
            Ok(()) | Err(AdapterError::AlreadyConnected) => {}
            Err(err) => return Err(SchedulerError::ConnectFailed(err)),
        }

        let span = tracing::info_span!(
            "run",
            run_id = %run_id,
            job_type = %job.operation_type,
            parallels = job.parallels,
        );
        let _entered = span.enter();

        let key_generator = Arc::new(KeyGenerator::new(KeyMode::from_random_keys(
            job.random_keys,
        )));
        let factory_params = FactoryParams {
            key_generator,
            data_size: job.data_size,
            read_percent: job.read_percent,
            ttl: job.ttl,
            extra: job.extra.clone(),
        };

        factory
            .validate_params(&factory_params)
            .map_err(|err| SchedulerError::InvalidJobSpec(err.to_string()))?;

        let deadline = match job.termination {
            Termination::Duration(d) => Some(TokioInstant::now() + d),
            Termination::Count(_) => None,
        };

        let ctx = Arc::new(RunContext {
            adapter: Arc::clone(&adapter),
            factory,
            factory_params,
            collector: Arc::new(Collector::new()),
            timeout: job.timeout,
            cancellation: cancellation.clone(),
            issued: AtomicU64::new(0),
            termination: job.termination,
            deadline,
        });

        let run_start = Instant::now();
        let mut handles = Vec::with_capacity(job.parallels as usize);
        for worker_idx in 0..job.parallels {
            let ctx = Arc::clone(&ctx);
            let start_delay = if job.ramp_up.is_zero() {
                std::time::Duration::ZERO
            } else {
                (job.ramp_up * worker_idx) / job.parallels.max(1)
            };
            handles.push(tokio::spawn(run_worker(ctx, worker_idx, start_delay)));
        }

        for handle in handles {
            if let Err(join_err) = handle.await {
                tracing::warn!(error = %join_err, "worker task panicked");
            }
        }

        tracing::debug!(elapsed = ?run_start.elapsed(), "run complete");
        adapter.close().await;

        let mut snapshot = ctx.collector.snapshot();
        snapshot.run_id = Some(run_id);
        Ok(snapshot)
    }
}

async fn run_worker(ctx: Arc<RunContext>, worker_idx: u32, start_delay: std::time::Duration) {
    let worker_id = WorkerId::for_index(worker_idx);
    if !start_delay.is_zero() {
        tokio::select! {
            _ = tokio::time::sleep(start_delay) => {}
            _ = ctx.cancellation.cancelled() => return,
        }
    }

    while ctx.claim() {
        let op = match ctx.factory.create(&ctx.factory_params) {
            Ok(op) => op,
            Err(err) => {
                tracing::debug!(worker = %worker_id, error = %err, "issuance failed");
                ctx.collector.record_scheduler_error();
                continue;
            }
        };

        let is_read = ctx
            .adapter
            .kind_of(&op.op_type)
            .map(|k| matches!(k, OperationKind::Read))
            .unwrap_or(false);

        let started = Instant::now();
        // `biased` so a cancellation that becomes ready in the same poll as
        // the operation's own completion still wins — an interrupted
        // in-flight operation is tagged `Cancelled`, not recorded as if it
        // had run to completion.
        let result = tokio::select! {
            biased;
            _ = ctx.cancellation.cancelled() => {
                tracing::debug!(worker = %worker_id, op_type = %op.op_type, "operation cancelled mid-flight");
                OperationResult::failure(is_read, started.elapsed(), &AdapterError::Cancelled)
            }
            outcome = tokio::time::timeout(ctx.timeout, ctx.adapter.execute(&op)) => match outcome {
                Ok(Ok(result)) => result,
                Ok(Err(err)) => {
                    tracing::warn!(worker = %worker_id, op_type = %op.op_type, error = %err, "operation failed");
                    OperationResult::failure(is_read, started.elapsed(), &err)
                }
                Err(_elapsed) => {
                    tracing::warn!(worker = %worker_id, op_type = %op.op_type, "operation timed out");
                    OperationResult::failure(is_read, ctx.timeout, &AdapterError::Timeout)
                }
            },
        };

        ctx.collector.record(&op.op_type, &result);

        if ctx.cancellation.is_cancelled() {
            break;
        }
    }
}
