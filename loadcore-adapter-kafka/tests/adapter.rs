//! Integration tests against a live Kafka broker.
//!
//! These are `#[ignore]` by default. Run them with:
//!
//!     cargo test -p loadcore-adapter-kafka -- --ignored
//!
//! They require a broker reachable at `localhost:9092` (or the address in
//! `LOADCORE_TEST_KAFKA_BROKERS`, if set).

use std::time::Duration;

use loadcore::{Operation, PoolConfig, ProtocolAdapter};
use loadcore_adapter_kafka::{KafkaAdapter, KafkaConfig};

fn test_config() -> KafkaConfig {
    let bootstrap_servers = std::env::var("LOADCORE_TEST_KAFKA_BROKERS")
        .unwrap_or_else(|_| "localhost:9092".to_string());
    KafkaConfig {
        bootstrap_servers,
        group_id: "loadcore-adapter-test".to_string(),
        consume_topics: vec!["loadcore-test-topic".to_string()],
        produce_timeout: Duration::from_secs(5),
        poll_timeout: Duration::from_millis(500),
        pool: PoolConfig {
            max_size: 2,
            min_idle: 0,
            acquire_timeout: Duration::from_secs(2),
            idle_check_interval: Duration::from_millis(50),
        },
    }
}

#[tokio::test]
#[ignore = "requires a local Kafka broker"]
async fn produce_to_a_topic_succeeds() {
    let adapter = KafkaAdapter::new(test_config());
    adapter.connect().await.unwrap();

    let op = Operation::new("kafka_produce", "loadcore-test-topic")
        .with_value(bytes::Bytes::from_static(b"hello"))
        .with_param("partition_key", "k1");
    let result = adapter.execute(&op).await.unwrap();
    assert!(result.success);
    assert!(!result.is_read);

    adapter.close().await;
}

#[tokio::test]
#[ignore = "requires a local Kafka broker"]
async fn consume_of_an_empty_topic_is_a_successful_empty_read() {
    let adapter = KafkaAdapter::new(test_config());
    adapter.connect().await.unwrap();

    let result = adapter
        .execute(&Operation::new("kafka_consume", "loadcore-empty-topic"))
        .await
        .unwrap();
    assert!(result.success);
    assert!(result.value.is_none());

    adapter.close().await;
}

#[tokio::test]
#[ignore = "requires a local Kafka broker"]
async fn unsupported_operation_type_is_bad_operation() {
    let adapter = KafkaAdapter::new(test_config());
    adapter.connect().await.unwrap();

    let result = adapter
        .execute(&Operation::new("kafka_delete_topic", "loadcore-test-topic"))
        .await;
    assert!(matches!(
        result,
        Err(loadcore::AdapterError::BadOperation { .. })
    ));
}
