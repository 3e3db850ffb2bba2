//! The pooled connection type for the HTTP adapter.
//!
//! HTTP connection pooling is already handled inside `reqwest::Client`
//! itself; this wraps a cloned client handle so the HTTP adapter still
//! satisfies [`PooledConnection`] and the acquire/release/stats contract
//! stays uniform across every protocol adapter.

use async_trait::async_trait;
use std::time::Duration;

use loadcore::{PoolError, PooledConnection};

/// Configuration needed to build one [`HttpConnection`].
#[derive(Debug, Clone)]
pub struct HttpConnectionConfig {
    /// Per-request timeout applied by the underlying `reqwest::Client`.
    pub request_timeout: Duration,
}

/// A lightweight handle onto a shared `reqwest::Client`.
pub struct HttpConnection {
    pub(crate) client: reqwest::Client,
}

#[async_trait]
impl PooledConnection for HttpConnection {
    type Config = HttpConnectionConfig;

    async fn create(cfg: &HttpConnectionConfig) -> Result<Self, PoolError> {
        let client = reqwest::Client::builder()
            .timeout(cfg.request_timeout)
            .build()
            .map_err(|e| PoolError::CreateFailed(e.to_string()))?;
        Ok(Self { client })
    }

    async fn check_health(&mut self) -> bool {
        true
    }
}
