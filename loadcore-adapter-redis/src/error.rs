//! Mapping from `redis::RedisError` to [`AdapterError`].

use loadcore::AdapterError;

/// Map a [`redis::RedisError`] to an [`AdapterError`].
///
/// Uses `RedisError`'s own classification helpers rather than matching on
/// `ErrorKind` variants directly, since the exact variant set has grown
/// across `redis` crate releases.
pub(crate) fn map_redis_error(err: redis::RedisError) -> AdapterError {
    if err.is_timeout() {
        AdapterError::Timeout
    } else if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() {
        AdapterError::Transport(err.to_string())
    } else {
        AdapterError::Protocol(err.to_string())
    }
}
