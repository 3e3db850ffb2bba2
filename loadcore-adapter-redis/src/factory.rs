//! Operation factories for the Redis adapter's operation types (§3.1).

use rand::Rng;
use std::time::Duration;

use loadcore::{FactoryError, FactoryParams, Operation, OperationFactory};

fn payload(data_size: usize) -> bytes::Bytes {
    bytes::Bytes::from(vec![b'x'; data_size])
}

/// `get`: reads a previously-written key, or `"i:0"` before anything has
/// been written.
pub struct GetFactory;

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

/// `set`: writes a freshly generated key with a `data_size`-byte value,
/// honoring `FactoryParams::ttl` via `SETEX` when present.
pub struct SetFactory;

impl OperationFactory for SetFactory {
    fn create(&self, params: &FactoryParams) -> Result<Operation, FactoryError> {
        let key = params.key_generator.next_write_key();
        let mut op = Operation::new("set", key).with_value(payload(params.data_size));
        if let Some(ttl) = params.ttl {
            op = op.with_ttl(ttl);
        }
        Ok(op)
    }

    fn validate_params(&self, _params: &FactoryParams) -> Result<(), FactoryError> {
        Ok(())
    }

    fn op_type(&self) -> &'static str {
        "set"
    }
}

/// `hget`: reads field `params.field` of a previously-written hash key.
pub struct HGetFactory;

impl OperationFactory for HGetFactory {
    fn create(&self, params: &FactoryParams) -> Result<Operation, FactoryError> {
        let key = params
            .key_generator
            .sample_read_key()
            .unwrap_or_else(|| "i:0".to_string());
        let field = params.extra_str("field").unwrap_or("f1").to_string();
        Ok(Operation::new("hget", key).with_param("field", field))
    }

    fn validate_params(&self, _params: &FactoryParams) -> Result<(), FactoryError> {
        Ok(())
    }

    fn op_type(&self) -> &'static str {
        "hget"
    }
}

/// `hset`: writes field `params.field` of a freshly generated hash key.
pub struct HSetFactory;

impl OperationFactory for HSetFactory {
    fn create(&self, params: &FactoryParams) -> Result<Operation, FactoryError> {
        let key = params.key_generator.next_write_key();
        let field = params.extra_str("field").unwrap_or("f1").to_string();
        Ok(Operation::new("hset", key)
            .with_value(payload(params.data_size))
            .with_param("field", field))
    }

    fn validate_params(&self, _params: &FactoryParams) -> Result<(), FactoryError> {
        Ok(())
    }

    fn op_type(&self) -> &'static str {
        "hset"
    }
}

/// `incr`: increments a freshly generated counter key.
pub struct IncrFactory;

impl OperationFactory for IncrFactory {
    fn create(&self, params: &FactoryParams) -> Result<Operation, FactoryError> {
        Ok(Operation::new("incr", params.key_generator.next_write_key()))
    }

    fn validate_params(&self, _params: &FactoryParams) -> Result<(), FactoryError> {
        Ok(())
    }

    fn op_type(&self) -> &'static str {
        "incr"
    }
}

/// `expire`: sets a TTL on a previously-written key.
pub struct ExpireFactory;

impl OperationFactory for ExpireFactory {
    fn create(&self, params: &FactoryParams) -> Result<Operation, FactoryError> {
        let key = params
            .key_generator
            .sample_read_key()
            .unwrap_or_else(|| "i:0".to_string());
        let ttl = params.ttl.unwrap_or(Duration::from_secs(60));
        Ok(Operation::new("expire", key).with_ttl(ttl))
    }

    fn validate_params(&self, _params: &FactoryParams) -> Result<(), FactoryError> {
        Ok(())
    }

    fn op_type(&self) -> &'static str {
        "expire"
    }
}

/// `zadd`: adds a freshly generated member to a sorted set, scored from
/// `params.score` (random if absent).
pub struct ZAddFactory;

impl OperationFactory for ZAddFactory {
    fn create(&self, params: &FactoryParams) -> Result<Operation, FactoryError> {
        let key = params.key_generator.next_write_key();
        let score = params
            .extra
            .get("score")
            .and_then(serde_json::Value::as_f64)
            .unwrap_or_else(|| rand::rng().random_range(0.0..1_000_000.0));
        Ok(Operation::new("zadd", key).with_param("score", score))
    }

    fn validate_params(&self, _params: &FactoryParams) -> Result<(), FactoryError> {
        Ok(())
    }

    fn op_type(&self) -> &'static str {
        "zadd"
    }
}

/// `publish`: fire-and-forget publish on `params.channel`.
pub struct PublishFactory;

impl OperationFactory for PublishFactory {
    fn create(&self, params: &FactoryParams) -> Result<Operation, FactoryError> {
        let channel = params.extra_str("channel").unwrap_or("load-test").to_string();
        Ok(Operation::new("publish", channel).with_value(payload(params.data_size)))
    }

    fn validate_params(&self, _params: &FactoryParams) -> Result<(), FactoryError> {
        Ok(())
    }

    fn op_type(&self) -> &'static str {
        "publish"
    }
}

/// `subscribe`: the simulated read type (§9 Open Question) — the adapter
/// never actually subscribes, so this factory only needs a channel name.
pub struct SubscribeFactory;

impl OperationFactory for SubscribeFactory {
    fn create(&self, params: &FactoryParams) -> Result<Operation, FactoryError> {
        let channel = params.extra_str("channel").unwrap_or("load-test").to_string();
        Ok(Operation::new("subscribe", channel))
    }

    fn validate_params(&self, _params: &FactoryParams) -> Result<(), FactoryError> {
        Ok(())
    }

    fn op_type(&self) -> &'static str {
        "subscribe"
    }
}

/// `set_get_random`: mixed workload. Flips a weighted coin on
/// `params.read_percent` each call and emits either a `get` against a
/// previously-written key or a `set` against a freshly generated one.
pub struct SetGetRandomFactory;

impl OperationFactory for SetGetRandomFactory {
    fn create(&self, params: &FactoryParams) -> Result<Operation, FactoryError> {
        let roll: u8 = rand::rng().random_range(0..100);
        if roll < params.read_percent {
            let key = params
                .key_generator
                .sample_read_key()
                .unwrap_or_else(|| "i:0".to_string());
            Ok(Operation::new("get", key))
        } else {
            let key = params.key_generator.next_write_key();
            let mut op = Operation::new("set", key).with_value(payload(params.data_size));
            if let Some(ttl) = params.ttl {
                op = op.with_ttl(ttl);
            }
            Ok(op)
        }
    }

    fn validate_params(&self, params: &FactoryParams) -> Result<(), FactoryError> {
        if params.read_percent > 100 {
            return Err(FactoryError::InvalidParam {
                name: "read_percent".into(),
                reason: "must be between 0 and 100".into(),
            });
        }
        Ok(())
    }

    fn op_type(&self) -> &'static str {
        "set_get_random"
    }
}
