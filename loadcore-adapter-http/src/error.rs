//! Mapping from `reqwest`/HTTP-status errors to [`AdapterError`].

use loadcore::AdapterError;

/// Map a non-2xx HTTP status to an [`AdapterError`], except 404 on a read
/// path, which callers treat as a successful empty read rather than routing
/// it through here.
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> AdapterError {
    match status.as_u16() {
        401 | 403 => AdapterError::Protocol(format!("HTTP {status}: {body}")),
        400..=499 => AdapterError::BadOperation {
            field: "key".into(),
            reason: format!("HTTP {status}: {body}"),
        },
        500..=599 => AdapterError::Transport(format!("HTTP {status}: {body}")),
        _ => AdapterError::Protocol(format!("HTTP {status}: {body}")),
    }
}

/// Map a [`reqwest::Error`] to an [`AdapterError`].
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> AdapterError {
    if err.is_timeout() {
        AdapterError::Timeout
    } else if err.is_connect() {
        AdapterError::Transport(format!("connection error: {err}"))
    } else {
        AdapterError::Transport(err.to_string())
    }
}
