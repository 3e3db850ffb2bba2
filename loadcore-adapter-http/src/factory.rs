//! Operation factories for the HTTP adapter's four operation types.

use loadcore::{FactoryError, FactoryParams, Operation, OperationFactory};

/// `http_get`: reads a previously-written key, falling back to `"i:0"`
/// before anything has been written yet.
pub struct HttpGetFactory;

impl OperationFactory for HttpGetFactory {
    fn create(&self, params: &FactoryParams) -> Result<Operation, FactoryError> {
        let key = params
            .key_generator
            .sample_read_key()
            .unwrap_or_else(|| "i:0".to_string());
        Ok(Operation::new("http_get", key))
    }

    fn validate_params(&self, _params: &FactoryParams) -> Result<(), FactoryError> {
        Ok(())
    }

    fn op_type(&self) -> &'static str {
        "http_get"
    }
}

fn payload(data_size: usize) -> bytes::Bytes {
    bytes::Bytes::from(vec![b'x'; data_size])
}

/// `http_post`: writes a freshly generated key with a `data_size`-byte body.
pub struct HttpPostFactory;

impl OperationFactory for HttpPostFactory {
    fn create(&self, params: &FactoryParams) -> Result<Operation, FactoryError> {
        let key = params.key_generator.next_write_key();
        Ok(Operation::new("http_post", key).with_value(payload(params.data_size)))
    }

    fn validate_params(&self, _params: &FactoryParams) -> Result<(), FactoryError> {
        Ok(())
    }

    fn op_type(&self) -> &'static str {
        "http_post"
    }
}

/// `http_put`: overwrites a previously-written key, or a fresh one if none
/// exist yet.
pub struct HttpPutFactory;

impl OperationFactory for HttpPutFactory {
    fn create(&self, params: &FactoryParams) -> Result<Operation, FactoryError> {
        let key = params
            .key_generator
            .sample_read_key()
            .unwrap_or_else(|| params.key_generator.next_write_key());
        Ok(Operation::new("http_put", key).with_value(payload(params.data_size)))
    }

    fn validate_params(&self, _params: &FactoryParams) -> Result<(), FactoryError> {
        Ok(())
    }

    fn op_type(&self) -> &'static str {
        "http_put"
    }
}

/// `http_delete`: deletes a previously-written key, or a fresh one if none
/// exist yet.
pub struct HttpDeleteFactory;

impl OperationFactory for HttpDeleteFactory {
    fn create(&self, params: &FactoryParams) -> Result<Operation, FactoryError> {
        let key = params
            .key_generator
            .sample_read_key()
            .unwrap_or_else(|| params.key_generator.next_write_key());
        Ok(Operation::new("http_delete", key))
    }

    fn validate_params(&self, _params: &FactoryParams) -> Result<(), FactoryError> {
        Ok(())
    }

    fn op_type(&self) -> &'static str {
        "http_delete"
    }
}
