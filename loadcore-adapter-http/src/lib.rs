#![deny(missing_docs)]
//! # loadcore-adapter-http — HTTP protocol adapter
//!
//! Implements [`ProtocolAdapter`] over `reqwest`, the same HTTP client
//! crate used throughout this workspace's ancestry for every outbound
//! request. A 404 on `http_get` is this adapter's "not-found" sentinel and
//! follows the same successful-empty-read rule as the Redis adapter's
//! missing-key `GET`.

mod connection;
mod error;
mod factory;

pub use connection::{HttpConnection, HttpConnectionConfig};
pub use factory::{HttpDeleteFactory, HttpGetFactory, HttpPostFactory, HttpPutFactory};

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use loadcore::{AdapterError, Operation, OperationKind, OperationResult, PoolConfig, ProtocolAdapter};
use loadcore_pool::Pool;

/// Typed configuration for the HTTP adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Base URL every operation's key is appended to as a path.
    pub base_url: String,
    /// Extra headers sent with every request.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Per-request timeout.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: Duration,
    /// Pool sizing/timeout configuration.
    #[serde(default)]
    pub pool: PoolConfig,
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn dispatch_table() -> HashMap<&'static str, OperationKind> {
    HashMap::from([
        ("http_get", OperationKind::Read),
        ("http_post", OperationKind::Write),
        ("http_put", OperationKind::Write),
        ("http_delete", OperationKind::Write),
    ])
}

/// HTTP protocol adapter.
pub struct HttpAdapter {
    config: HttpConfig,
    pool: Pool<HttpConnection>,
    dispatch: HashMap<&'static str, OperationKind>,
    connected: AtomicBool,
}

impl HttpAdapter {
    /// Construct an adapter. The underlying pool starts filling toward
    /// `config.pool.min_idle` immediately; `connect` only runs a liveness
    /// probe and marks the adapter ready for `execute`.
    pub fn new(config: HttpConfig) -> Self {
        let conn_cfg = connection::HttpConnectionConfig {
            request_timeout: config.request_timeout,
        };
        let pool = Pool::new(config.pool.clone(), conn_cfg);
        Self {
            config,
            pool,
            dispatch: dispatch_table(),
            connected: AtomicBool::new(false),
        }
    }

    fn url_for(&self, key: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            key.trim_start_matches('/')
        )
    }

    async fn do_execute(&self, op: &Operation) -> Result<OperationResult, AdapterError> {
        let conn = self.pool.acquire().await?;
        let url = self.url_for(&op.key);
        let started = Instant::now();

        let result = match op.op_type.as_str() {
            "http_get" => {
                let mut req = conn.client.get(&url);
                for (k, v) in &self.config.headers {
                    req = req.header(k, v);
                }
                let resp = req.send().await.map_err(error::map_reqwest_error)?;
                if resp.status() == reqwest::StatusCode::NOT_FOUND {
                    Ok(OperationResult::successful_empty_read(started.elapsed()))
                } else if resp.status().is_success() {
                    let body = resp.bytes().await.map_err(error::map_reqwest_error)?;
                    Ok(OperationResult::success(true, started.elapsed(), Some(body)))
                } else {
                    let status = resp.status();
                    let body = resp.text().await.unwrap_or_default();
                    Err(error::map_http_status(status, &body))
                }
            }
            "http_post" | "http_put" => {
                let body = op.value.clone().unwrap_or_default();
                let mut req = if op.op_type == "http_post" {
                    conn.client.post(&url)
                } else {
                    conn.client.put(&url)
                };
                for (k, v) in &self.config.headers {
                    req = req.header(k, v);
                }
                let resp = req
                    .body(body)
                    .send()
                    .await
                    .map_err(error::map_reqwest_error)?;
                if resp.status().is_success() {
                    Ok(OperationResult::success(false, started.elapsed(), None))
                } else {
                    let status = resp.status();
                    let body = resp.text().await.unwrap_or_default();
                    Err(error::map_http_status(status, &body))
                }
            }
            "http_delete" => {
                let mut req = conn.client.delete(&url);
                for (k, v) in &self.config.headers {
                    req = req.header(k, v);
                }
                let resp = req.send().await.map_err(error::map_reqwest_error)?;
                if resp.status().is_success() || resp.status() == reqwest::StatusCode::NOT_FOUND {
                    Ok(OperationResult::success(false, started.elapsed(), None))
                } else {
                    let status = resp.status();
                    let body = resp.text().await.unwrap_or_default();
                    Err(error::map_http_status(status, &body))
                }
            }
            other => Err(AdapterError::BadOperation {
                field: "op_type".into(),
                reason: format!("unsupported HTTP operation type `{other}`"),
            }),
        };

        if let Err(err) = self.pool.release(conn).await {
            tracing::warn!(error = %err, "pool rejected release of its own connection");
        }
        result
    }
}

#[async_trait]
impl ProtocolAdapter for HttpAdapter {
    async fn connect(&self) -> Result<(), AdapterError> {
        if self.connected.swap(true, Ordering::AcqRel) {
            return Err(AdapterError::AlreadyConnected);
        }
        self.health_check().await
    }

    async fn execute(&self, op: &Operation) -> Result<OperationResult, AdapterError> {
        if !self.dispatch.contains_key(op.op_type.as_str()) {
            return Err(AdapterError::BadOperation {
                field: "op_type".into(),
                reason: format!("unsupported HTTP operation type `{}`", op.op_type),
            });
        }
        self.do_execute(op).await
    }

    fn kind_of(&self, op_type: &str) -> Option<OperationKind> {
        self.dispatch.get(op_type).copied()
    }

    async fn close(&self) {
        self.pool.close().await;
    }

    async fn health_check(&self) -> Result<(), AdapterError> {
        let conn = self.pool.acquire().await?;
        let result = conn
            .client
            .head(&self.config.base_url)
            .send()
            .await
            .map(|_| ())
            .or_else(|err| if err.is_connect() { Err(error::map_reqwest_error(err)) } else { Ok(()) });
        if let Err(err) = self.pool.release(conn).await {
            tracing::warn!(error = %err, "pool rejected release of its own connection");
        }
        result
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
