//! The unit of work the scheduler drives through an adapter, and its outcome.

use bytes::Bytes;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::AdapterError;

/// A unit of work issued by the scheduler to a [`crate::ProtocolAdapter`].
///
/// `op_type` is a string tag rather than a closed enum because operation
/// types are adapter-specific (`get`/`hset` for Redis, `http_get` for HTTP,
/// `kafka_produce` for Kafka) — the scheduler and collector are generic over
/// it, only the adapter's dispatch table needs to be exhaustive.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct Operation {
    /// Tag identifying the operation, e.g. `"get"`, `"hset"`, `"http_get"`.
    pub op_type: String,

    /// Logical key or endpoint the operation targets.
    pub key: String,

    /// Payload for write operations. Opaque to the scheduler; the adapter
    /// interprets it.
    pub value: Option<Bytes>,

    /// Expiration for write operations, if the adapter supports one.
    pub ttl: Option<Duration>,

    /// Per-type parameters (hash field name, pub/sub channel, sorted-set
    /// score, read percent for mixed workloads, ...).
    pub params: HashMap<String, Value>,

    /// Annotations that flow through unchanged to the result's metadata.
    pub metadata: HashMap<String, Value>,
}

impl Operation {
    /// Construct an operation with no value, TTL, params, or metadata.
    pub fn new(op_type: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            op_type: op_type.into(),
            key: key.into(),
            value: None,
            ttl: None,
            params: HashMap::new(),
            metadata: HashMap::new(),
        }
    }

    /// Attach a payload.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<Bytes>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Attach a TTL.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Set a single parameter.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Read a string parameter, if present and of the right shape.
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }
}

/// Outcome of one [`Operation`] against an adapter.
///
/// Always fully populated, even on failure — `error` carries the message
/// when `success == false`, it never replaces the rest of the struct with
/// `None`/`Err`.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct OperationResult {
    /// Whether the operation completed successfully.
    ///
    /// A missing-key read is `success == true` with an empty `value` — see
    /// [`OperationResult::successful_empty_read`]. Absence is a legitimate
    /// outcome, not a failure.
    pub success: bool,

    /// Classifies the operation for read/write metrics. Determined by
    /// operation type, not by outcome.
    pub is_read: bool,

    /// Wall-clock time between adapter-invocation start and completion.
    pub duration: Duration,

    /// Response payload, when the adapter produced one.
    pub value: Option<Bytes>,

    /// Error message when `success == false`.
    pub error: Option<String>,

    /// Operation type, key, and any adapter-specific tags (e.g. the
    /// `pool-timeout` / `timeout` / `cancelled` classification).
    pub metadata: HashMap<String, Value>,
}

impl OperationResult {
    /// Build a successful result.
    pub fn success(is_read: bool, duration: Duration, value: Option<Bytes>) -> Self {
        Self {
            success: true,
            is_read,
            duration,
            value,
            error: None,
            metadata: HashMap::new(),
        }
    }

    /// Build the "not-found sentinel" result: a successful read with an
    /// empty value. Every read handler that hits an absence sentinel
    /// (missing Redis key, HTTP 404, empty Kafka poll) must go through this
    /// constructor so the contract cannot silently diverge between adapters.
    pub fn successful_empty_read(duration: Duration) -> Self {
        Self::success(true, duration, None)
    }

    /// Build a failed result from an adapter error, tagging metadata with
    /// the error's classification so the collector doesn't need to
    /// re-derive it from the message alone.
    pub fn failure(is_read: bool, duration: Duration, err: &AdapterError) -> Self {
        let tag = match err {
            AdapterError::PoolTimeout => "pool-timeout",
            AdapterError::Timeout => "timeout",
            AdapterError::Cancelled => "cancelled",
            AdapterError::Transport(_) => "transport",
            AdapterError::Protocol(_) => "protocol",
            AdapterError::BadOperation { .. } => "bad-operation",
            AdapterError::Connect(_) | AdapterError::AlreadyConnected => "connect",
            AdapterError::Other(_) => "unknown",
        };
        let mut metadata = HashMap::new();
        metadata.insert("tag".to_string(), Value::String(tag.to_string()));
        Self {
            success: false,
            is_read,
            duration,
            value: None,
            error: Some(err.to_string()),
            metadata,
        }
    }

    /// Attach or overwrite metadata entries (operation type, key, ...).
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successful_empty_read_is_success_with_no_value() {
        let result = OperationResult::successful_empty_read(Duration::from_millis(5));
        assert!(result.success);
        assert!(result.is_read);
        assert!(result.value.is_none());
        assert!(result.error.is_none());
    }

    #[test]
    fn failure_tags_pool_timeout() {
        let err = AdapterError::PoolTimeout;
        let result = OperationResult::failure(true, Duration::from_millis(50), &err);
        assert!(!result.success);
        assert_eq!(
            result.metadata.get("tag"),
            Some(&Value::String("pool-timeout".to_string()))
        );
    }

    #[test]
    fn operation_builder_round_trips_fields() {
        let op = Operation::new("set", "i:0")
            .with_value(Bytes::from_static(b"payload"))
            .with_param("field", "f1");
        assert_eq!(op.op_type, "set");
        assert_eq!(op.key, "i:0");
        assert_eq!(op.param_str("field"), Some("f1"));
    }
}
