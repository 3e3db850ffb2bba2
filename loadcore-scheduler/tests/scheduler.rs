use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use loadcore::{
    AdapterError, ErrorClass, FactoryError, FactoryParams, JobSpec, Operation, OperationFactory,
    OperationKind, OperationRegistry, OperationResult, ProtocolAdapter, Termination,
};
use loadcore_scheduler::Scheduler;
use tokio_util::sync::CancellationToken;

/// Pure in-memory adapter: "get" always hits, "set" always succeeds.
/// Used as a deterministic double for scheduler behavior tests — no
/// network, no pool, fixed zero-latency response.
struct MemoryAdapter {
    calls: AtomicU64,
}

impl MemoryAdapter {
    fn new() -> Self {
        Self {
            calls: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl ProtocolAdapter for MemoryAdapter {
    async fn connect(&self) -> Result<(), AdapterError> {
        Ok(())
    }

    async fn execute(&self, op: &Operation) -> Result<OperationResult, AdapterError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        match op.op_type.as_str() {
            "get" => Ok(OperationResult::success(
                true,
                Duration::from_micros(100),
                Some(bytes::Bytes::from_static(b"value")),
            )),
            "set" => Ok(OperationResult::success(false, Duration::from_micros(100), None)),
            other => Err(AdapterError::BadOperation {
                field: "op_type".into(),
                reason: format!("unknown type {other}"),
            }),
        }
    }

    fn kind_of(&self, op_type: &str) -> Option<OperationKind> {
        match op_type {
            "get" => Some(OperationKind::Read),
            "set" => Some(OperationKind::Write),
            _ => None,
        }
    }

    async fn close(&self) {}

    async fn health_check(&self) -> Result<(), AdapterError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

struct GetFactory;

impl OperationFactory for GetFactory {
    fn create(&self, params: &FactoryParams) -> Result<Operation, FactoryError> {
        let key = params
            .key_generator
            .sample_read_key()
            .unwrap_or_else(|| "i:0".to_string());
        Ok(Operation::new("get", key))
    }

    fn validate_params(&self, _params: &FactoryParams) -> Result<(), FactoryError> {
        Ok(())
    }

    fn op_type(&self) -> &'static str {
        "get"
    }
}

/// A factory whose params are never valid — used to prove `validate_params`
/// is actually consulted before any worker is spawned.
struct AlwaysInvalidFactory;

impl OperationFactory for AlwaysInvalidFactory {
    fn create(&self, params: &FactoryParams) -> Result<Operation, FactoryError> {
        let key = params
            .key_generator
            .sample_read_key()
            .unwrap_or_else(|| "i:0".to_string());
        Ok(Operation::new("get", key))
    }

    fn validate_params(&self, _params: &FactoryParams) -> Result<(), FactoryError> {
        Err(FactoryError::MissingParam("mandatory_field".into()))
    }

    fn op_type(&self) -> &'static str {
        "get"
    }
}

/// Adapter whose `execute` sleeps well past a run's cancellation point, so a
/// mid-flight cancel can be proven to interrupt it rather than waiting for
/// completion.
struct SlowAdapter {
    delay: Duration,
    calls: AtomicU64,
}

impl SlowAdapter {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            calls: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl ProtocolAdapter for SlowAdapter {
    async fn connect(&self) -> Result<(), AdapterError> {
        Ok(())
    }

    async fn execute(&self, _op: &Operation) -> Result<OperationResult, AdapterError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        tokio::time::sleep(self.delay).await;
        Ok(OperationResult::success(
            true,
            Duration::from_micros(100),
            Some(bytes::Bytes::from_static(b"value")),
        ))
    }

    fn kind_of(&self, _op_type: &str) -> Option<OperationKind> {
        Some(OperationKind::Read)
    }

    async fn close(&self) {}

    async fn health_check(&self) -> Result<(), AdapterError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "slow"
    }
}

fn base_job(total: u64, parallels: u32) -> JobSpec {
    JobSpec {
        operation_type: "get".into(),
        termination: Termination::Count(total),
        parallels,
        timeout: Duration::from_secs(1),
        ramp_up: Duration::ZERO,
        data_size: 0,
        read_percent: 100,
        random_keys: 0,
        ttl: None,
        extra: Default::default(),
    }
}

#[tokio::test]
async fn single_worker_single_operation() {
    let adapter: Arc<dyn ProtocolAdapter> = Arc::new(MemoryAdapter::new());
    let mut registry = OperationRegistry::new();
    registry.register(Arc::new(GetFactory));

    let snapshot = Scheduler
        .run(
            base_job(1, 1),
            adapter,
            Arc::new(registry),
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(snapshot.total, 1);
    assert_eq!(snapshot.read, 1);
    assert_eq!(snapshot.success + snapshot.failed, 1);
}

#[tokio::test]
async fn count_based_run_issues_exactly_total_operations() {
    let adapter: Arc<dyn ProtocolAdapter> = Arc::new(MemoryAdapter::new());
    let mut registry = OperationRegistry::new();
    registry.register(Arc::new(GetFactory));

    let snapshot = Scheduler
        .run(
            base_job(1000, 10),
            adapter,
            Arc::new(registry),
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(snapshot.total, 1000);
    assert_eq!(snapshot.read, 1000);
    assert_eq!(snapshot.write, 0);
    assert_eq!(snapshot.success + snapshot.failed, 1000);
}

#[tokio::test]
async fn unknown_operation_type_is_rejected_before_any_work() {
    let adapter: Arc<dyn ProtocolAdapter> = Arc::new(MemoryAdapter::new());
    let registry = OperationRegistry::new();

    let mut job = base_job(10, 1);
    job.operation_type = "nonexistent".into();

    let result = Scheduler
        .run(job, adapter, Arc::new(registry), CancellationToken::new())
        .await;

    assert!(matches!(
        result,
        Err(loadcore::SchedulerError::UnknownOperationType(_))
    ));
}

#[tokio::test]
async fn cancellation_stops_the_run_promptly() {
    let adapter: Arc<dyn ProtocolAdapter> = Arc::new(MemoryAdapter::new());
    let mut registry = OperationRegistry::new();
    registry.register(Arc::new(GetFactory));

    let token = CancellationToken::new();
    let mut job = base_job(1, 20);
    job.termination = Termination::Duration(Duration::from_secs(60));

    let token_clone = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token_clone.cancel();
    });

    let started = std::time::Instant::now();
    let snapshot = Scheduler
        .run(job, adapter, Arc::new(registry), token)
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(snapshot.total > 0);
}

#[tokio::test]
async fn zero_count_short_circuits_without_issuing_any_work() {
    let adapter = Arc::new(MemoryAdapter::new());
    let mut registry = OperationRegistry::new();
    registry.register(Arc::new(GetFactory));

    let snapshot = Scheduler
        .run(
            base_job(0, 4),
            adapter.clone(),
            Arc::new(registry),
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(snapshot.total, 0);
    assert_eq!(snapshot.success, 0);
    assert_eq!(snapshot.failed, 0);
    assert_eq!(
        adapter.calls.load(Ordering::Relaxed),
        0,
        "a zero-count run must never dispatch to the adapter"
    );
}

#[tokio::test]
async fn invalid_params_are_rejected_before_any_work() {
    let adapter = Arc::new(MemoryAdapter::new());
    let mut registry = OperationRegistry::new();
    registry.register(Arc::new(AlwaysInvalidFactory));

    let result = Scheduler
        .run(
            base_job(10, 2),
            adapter.clone(),
            Arc::new(registry),
            CancellationToken::new(),
        )
        .await;

    assert!(matches!(
        result,
        Err(loadcore::SchedulerError::InvalidJobSpec(_))
    ));
    assert_eq!(
        adapter.calls.load(Ordering::Relaxed),
        0,
        "a rejected job spec must never reach the adapter"
    );
}

#[tokio::test]
async fn mid_flight_cancellation_tags_the_interrupted_operation() {
    let adapter: Arc<dyn ProtocolAdapter> = Arc::new(SlowAdapter::new(Duration::from_millis(500)));
    let mut registry = OperationRegistry::new();
    registry.register(Arc::new(GetFactory));

    let token = CancellationToken::new();
    let mut job = base_job(1, 1);
    job.termination = Termination::Duration(Duration::from_secs(60));
    job.timeout = Duration::from_secs(2);

    let token_clone = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token_clone.cancel();
    });

    let started = std::time::Instant::now();
    let snapshot = Scheduler
        .run(job, adapter, Arc::new(registry), token)
        .await
        .unwrap();

    assert!(
        started.elapsed() < Duration::from_millis(500),
        "a cancelled in-flight operation must not wait for its own completion"
    );
    assert!(snapshot.failed >= 1);
    assert!(snapshot.errors.contains_key(&ErrorClass::Unknown));
}
