//! Integration tests against a live Redis instance.
//!
//! These are `#[ignore]` by default. Run them with:
//!
//!     cargo test -p loadcore-adapter-redis -- --ignored
//!
//! They require a Redis server reachable at `redis://127.0.0.1:6379` (or at
//! the URL in `LOADCORE_TEST_REDIS_URL`, if set).

use std::time::Duration;

use loadcore::{Operation, PoolConfig, ProtocolAdapter};
use loadcore_adapter_redis::{RedisAdapter, RedisConfig, RedisTopology};

fn test_config() -> RedisConfig {
    let url = std::env::var("LOADCORE_TEST_REDIS_URL")
        .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    RedisConfig {
        topology: RedisTopology::Standalone { url },
        pool: PoolConfig {
            max_size: 4,
            min_idle: 0,
            acquire_timeout: Duration::from_secs(1),
            idle_check_interval: Duration::from_millis(50),
        },
    }
}

#[tokio::test]
#[ignore = "requires a local Redis server"]
async fn set_then_get_round_trips_the_value() {
    let adapter = RedisAdapter::new(test_config());
    adapter.connect().await.unwrap();

    let set_op = Operation::new("set", "loadcore:test:roundtrip")
        .with_value(bytes::Bytes::from_static(b"hello"));
    let set_result = adapter.execute(&set_op).await.unwrap();
    assert!(set_result.success);

    let get_op = Operation::new("get", "loadcore:test:roundtrip");
    let get_result = adapter.execute(&get_op).await.unwrap();
    assert!(get_result.success);
    assert_eq!(get_result.value.as_deref(), Some(&b"hello"[..]));

    adapter.close().await;
}

#[tokio::test]
#[ignore = "requires a local Redis server"]
async fn get_of_missing_key_is_a_successful_empty_read() {
    let adapter = RedisAdapter::new(test_config());
    adapter.connect().await.unwrap();

    let result = adapter
        .execute(&Operation::new("get", "loadcore:test:definitely-missing"))
        .await
        .unwrap();
    assert!(result.success);
    assert!(result.value.is_none());

    adapter.close().await;
}

#[tokio::test]
#[ignore = "requires a local Redis server"]
async fn incr_increments_a_counter() {
    let adapter = RedisAdapter::new(test_config());
    adapter.connect().await.unwrap();

    let op = Operation::new("incr", "loadcore:test:counter");
    let first = adapter.execute(&op).await.unwrap();
    let second = adapter.execute(&op).await.unwrap();
    assert!(first.success && second.success);

    adapter.close().await;
}

#[tokio::test]
#[ignore = "requires a local Redis server"]
async fn subscribe_is_simulated_and_never_blocks() {
    let adapter = RedisAdapter::new(test_config());
    adapter.connect().await.unwrap();

    let result = adapter
        .execute(&Operation::new("subscribe", "loadcore-test-channel"))
        .await
        .unwrap();
    assert!(result.success);
    assert!(result.value.is_none());

    adapter.close().await;
}

#[tokio::test]
#[ignore = "requires a local Redis server"]
async fn unsupported_operation_type_is_bad_operation() {
    let adapter = RedisAdapter::new(test_config());
    adapter.connect().await.unwrap();

    let result = adapter.execute(&Operation::new("lpush", "loadcore:test")).await;
    assert!(matches!(
        result,
        Err(loadcore::AdapterError::BadOperation { .. })
    ));
}
