//! Operation factories and the registry that looks them up by type.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::keygen::KeyGenerator;
use crate::operation::Operation;

/// Parameter bundle passed to a factory's [`OperationFactory::create`].
///
/// Holds the job-level parameters (§6 configuration surface: `dataSize`,
/// `readPercent`, `ttl`, ...) plus a handle to the run's shared
/// [`KeyGenerator`]. Factories are stateless with respect to everything
/// except the key generator — passing it in per call (rather than a
/// factory owning one) keeps one generator per run, as the design notes
/// require.
#[non_exhaustive]
#[derive(Clone)]
pub struct FactoryParams {
    /// Shared key generator for this run.
    pub key_generator: Arc<KeyGenerator>,

    /// Payload byte length for write operations.
    pub data_size: usize,

    /// Read-ratio for mixed workloads, 0-100.
    pub read_percent: u8,

    /// Write expiry, if configured.
    pub ttl: Option<Duration>,

    /// Adapter- or type-specific extra parameters (hash field name,
    /// pub/sub channel, topic, ...), passed through from the job spec.
    pub extra: HashMap<String, serde_json::Value>,
}

impl FactoryParams {
    /// Read a string extra parameter.
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(serde_json::Value::as_str)
    }
}

/// Errors a factory can raise before an operation is even issued. These do
/// not count as scheduler operation successes/failures — they surface as
/// scheduler-level errors instead (§4.1).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum FactoryError {
    /// A mandatory parameter was not supplied.
    #[error("missing required parameter `{0}`")]
    MissingParam(String),

    /// A supplied parameter failed validation.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParam {
        /// The offending parameter's name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Produces [`Operation`]s from a [`FactoryParams`] bundle.
///
/// `create` is deterministic except for randomness it explicitly uses (key
/// selection, mixed-ratio coin flips) — it performs no I/O.
pub trait OperationFactory: Send + Sync {
    /// Fabricate one operation. Rejects missing/invalid parameters via
    /// [`FactoryError`], never panics on bad input.
    fn create(&self, params: &FactoryParams) -> Result<Operation, FactoryError>;

    /// Reject missing mandatory parameters before any work begins.
    fn validate_params(&self, params: &FactoryParams) -> Result<(), FactoryError>;

    /// The operation type tag this factory registers under.
    fn op_type(&self) -> &'static str;
}

/// A mapping from operation type to the factory that produces it.
///
/// Registration is a one-time setup action performed before the scheduler
/// starts; lookup is read-mostly and lock-free thereafter (an
/// `Arc<HashMap<..>>` snapshot, not a `RwLock` — the registry never
/// mutates once a run begins).
#[derive(Default)]
pub struct OperationRegistry {
    factories: HashMap<String, Arc<dyn OperationFactory>>,
}

impl OperationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a factory under its own [`OperationFactory::op_type`].
    pub fn register(&mut self, factory: Arc<dyn OperationFactory>) -> &mut Self {
        self.factories.insert(factory.op_type().to_string(), factory);
        self
    }

    /// Look up the factory registered for `op_type`.
    pub fn get(&self, op_type: &str) -> Option<Arc<dyn OperationFactory>> {
        self.factories.get(op_type).cloned()
    }

    /// List the operation types currently registered.
    pub fn types(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}
