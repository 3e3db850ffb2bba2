//! Operation factories for the Kafka adapter's two operation types.

use loadcore::{FactoryError, FactoryParams, Operation, OperationFactory};

fn payload(data_size: usize) -> bytes::Bytes {
    bytes::Bytes::from(vec![b'x'; data_size])
}

fn topic_of(params: &FactoryParams) -> String {
    params
        .extra_str("topic")
        .unwrap_or("loadcore-load-test")
        .to_string()
}

/// `kafka_produce`: writes a `data_size`-byte message to `params.topic` (or
/// `Key` if `topic` is absent), keyed by a freshly generated partition key.
pub struct KafkaProduceFactory;

impl OperationFactory for KafkaProduceFactory {
    fn create(&self, params: &FactoryParams) -> Result<Operation, FactoryError> {
        let topic = topic_of(params);
        let partition_key = params.key_generator.next_write_key();
        Ok(Operation::new("kafka_produce", topic)
            .with_value(payload(params.data_size))
            .with_param("partition_key", partition_key))
    }

    fn validate_params(&self, _params: &FactoryParams) -> Result<(), FactoryError> {
        Ok(())
    }

    fn op_type(&self) -> &'static str {
        "kafka_produce"
    }
}

/// `kafka_consume`: polls the configured consumer group against
/// `params.topic`, bounded by the operation's own timeout.
pub struct KafkaConsumeFactory;

impl OperationFactory for KafkaConsumeFactory {
    fn create(&self, params: &FactoryParams) -> Result<Operation, FactoryError> {
        Ok(Operation::new("kafka_consume", topic_of(params)))
    }

    fn validate_params(&self, _params: &FactoryParams) -> Result<(), FactoryError> {
        Ok(())
    }

    fn op_type(&self) -> &'static str {
        "kafka_consume"
    }
}
