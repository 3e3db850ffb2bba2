//! Mapping from `rdkafka`'s error types to [`AdapterError`].

use loadcore::AdapterError;

pub(crate) fn map_kafka_error(err: rdkafka::error::KafkaError) -> AdapterError {
    use rdkafka::error::RDKafkaErrorCode;

    match err.rdkafka_error_code() {
        Some(RDKafkaErrorCode::OperationTimedOut) => AdapterError::Timeout,
        Some(
            RDKafkaErrorCode::BrokerTransportFailure
            | RDKafkaErrorCode::AllBrokersDown
            | RDKafkaErrorCode::NetworkException,
        ) => AdapterError::Transport(err.to_string()),
        Some(RDKafkaErrorCode::Authentication) => AdapterError::Protocol(err.to_string()),
        _ => AdapterError::Protocol(err.to_string()),
    }
}
