#![deny(missing_docs)]
//! # loadcore-pool — a generic connection pool
//!
//! [`Pool<C>`] implements the acquire/release/replenish algorithm exactly
//! once, generic over [`PooledConnection`]. Every protocol adapter's
//! connection type (a Redis multiplexed connection, a `reqwest::Client`
//! handle, an `rdkafka` producer) plugs into the same pool mechanics —
//! protocol is operation-defined, not mechanism-defined, applied here to
//! connections instead of operations.
//!
//! ## Concurrency design
//!
//! Idle connections and the active count live behind one `std::sync::Mutex`
//! guarding [`PoolState`]; hit/miss/timeout counters are atomics read
//! without taking that lock. `acquire` waits on a `tokio::sync::Notify`
//! woken by `release`, bounded by `tokio::time::timeout` against the pool's
//! configured `acquire_timeout`. A background replenishment task holds only
//! a `Weak` handle to the shared state, so it exits on its own once the
//! pool's last `Arc` is dropped; `close` additionally flips an `AtomicBool`
//! the replenishment loop checks every iteration, for a fast deterministic
//! stop that does not wait on `Weak` cleanup.
//!
//! ## Cancellation safety
//!
//! `acquire` returns a [`PoolGuard`], not a bare `C`. A guard that is
//! explicitly handed to [`Pool::release`] is health-checked and returned to
//! idle as before; a guard that is instead dropped — most often because the
//! future holding it was cancelled out from under a `tokio::time::timeout`
//! — still reclaims its slot via `Drop`, so a timed-out operation never
//! leaks a permanently "active" connection.

use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::Notify;

use loadcore::{PoolConfig, PoolError, PoolStats, PooledConnection};

struct PoolState<C> {
    idle: VecDeque<C>,
    active: u32,
}

struct Inner<C: PooledConnection> {
    config: PoolConfig,
    create_cfg: C::Config,
    state: Mutex<PoolState<C>>,
    notify: Notify,
    hits: AtomicU64,
    misses: AtomicU64,
    timeouts: AtomicU64,
    closed: AtomicBool,
}

/// A bounded pool of `C`-typed connections.
///
/// Cheap to clone — every clone shares the same underlying state via `Arc`.
pub struct Pool<C: PooledConnection> {
    inner: Arc<Inner<C>>,
}

impl<C: PooledConnection> Clone for Pool<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// A connection borrowed from a [`Pool`], returned via [`Pool::release`].
///
/// Derefs to `C`, so callers use it exactly as they would the bare
/// connection. If dropped without being released — the connection's future
/// was cancelled, most commonly by the scheduler's per-operation
/// `tokio::time::timeout` — the pool slot is still reclaimed: `Drop`
/// decrements the active count directly rather than leaking it, at the cost
/// of discarding the connection without a health check. The background
/// replenishment task creates a fresh one to make up the difference.
pub struct PoolGuard<C: PooledConnection> {
    conn: Option<C>,
    pool: Pool<C>,
}

impl<C: PooledConnection> Deref for PoolGuard<C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.conn.as_ref().expect("connection taken only by release or drop")
    }
}

impl<C: PooledConnection> DerefMut for PoolGuard<C> {
    fn deref_mut(&mut self) -> &mut C {
        self.conn.as_mut().expect("connection taken only by release or drop")
    }
}

impl<C: PooledConnection> Drop for PoolGuard<C> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.reclaim_without_health_check(conn);
        }
    }
}

impl<C: PooledConnection> Pool<C> {
    /// Create a pool and start its background replenishment task.
    ///
    /// Replenishment does not run synchronously here — the pool starts
    /// empty and fills toward `config.min_idle` in the background, so
    /// `new` never blocks on connection creation.
    pub fn new(config: PoolConfig, create_cfg: C::Config) -> Self {
        let inner = Arc::new(Inner {
            config,
            create_cfg,
            state: Mutex::new(PoolState {
                idle: VecDeque::new(),
                active: 0,
            }),
            notify: Notify::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        });
        tokio::spawn(replenish_loop(Arc::downgrade(&inner)));
        Self { inner }
    }

    fn wrap(&self, conn: C) -> PoolGuard<C> {
        PoolGuard {
            conn: Some(conn),
            pool: self.clone(),
        }
    }

    /// Borrow a connection, creating one if the pool has capacity and no
    /// idle connection is available, or waiting (bounded by
    /// `acquire_timeout`) for one to be released otherwise.
    pub async fn acquire(&self) -> Result<PoolGuard<C>, PoolError> {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(PoolError::Closed);
        }

        {
            let mut state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(conn) = state.idle.pop_front() {
                state.active += 1;
                drop(state);
                self.inner.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(self.wrap(conn));
            }
            if state.active < self.inner.config.max_size {
                state.active += 1;
            } else {
                drop(state);
                return self.wait_for_release().await;
            }
        }

        match C::create(&self.inner.create_cfg).await {
            Ok(conn) => {
                self.inner.misses.fetch_add(1, Ordering::Relaxed);
                Ok(self.wrap(conn))
            }
            Err(err) => {
                let mut state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
                state.active = state.active.saturating_sub(1);
                Err(err)
            }
        }
    }

    async fn wait_for_release(&self) -> Result<PoolGuard<C>, PoolError> {
        let wait = async {
            loop {
                self.inner.notify.notified().await;
                if self.inner.closed.load(Ordering::Acquire) {
                    return Err(PoolError::Closed);
                }
                let mut state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
                if let Some(conn) = state.idle.pop_front() {
                    state.active += 1;
                    return Ok(conn);
                }
            }
        };

        match tokio::time::timeout(self.inner.config.acquire_timeout, wait).await {
            Ok(Ok(conn)) => {
                self.inner.hits.fetch_add(1, Ordering::Relaxed);
                Ok(self.wrap(conn))
            }
            Ok(Err(err)) => Err(err),
            Err(_elapsed) => {
                self.inner.timeouts.fetch_add(1, Ordering::Relaxed);
                Err(PoolError::Timeout)
            }
        }
    }

    /// Return a connection to the pool. Health-checked before being made
    /// available again; an unhealthy connection is discarded (not
    /// returned to idle) and the replenishment task will create a
    /// replacement on its next pass.
    ///
    /// Fails with [`PoolError::UnrecognizedConnection`] if `guard` was
    /// acquired from a different `Pool` instance than `self` — identity is
    /// checked by comparing the guards' shared inner state, not by value.
    /// In that case `self`'s state is left untouched; the guard's own
    /// origin pool reclaims the slot when the guard is dropped.
    pub async fn release(&self, mut guard: PoolGuard<C>) -> Result<(), PoolError> {
        if !Arc::ptr_eq(&self.inner, &guard.pool.inner) {
            return Err(PoolError::UnrecognizedConnection);
        }

        let mut conn = guard
            .conn
            .take()
            .expect("a guard is released or dropped exactly once");

        if self.inner.closed.load(Ordering::Acquire) {
            let mut state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
            state.active = state.active.saturating_sub(1);
            return Ok(());
        }

        let healthy = conn.check_health().await;
        let mut state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
        state.active = state.active.saturating_sub(1);
        if healthy {
            state.idle.push_back(conn);
        }
        drop(state);
        self.inner.notify.notify_one();
        Ok(())
    }

    /// Decrement the active count for a connection whose guard was dropped
    /// without an explicit `release`. No health check, no return to idle —
    /// just the slot back, so `acquire` can create a replacement.
    fn reclaim_without_health_check(&self, _conn: C) {
        let mut state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
        state.active = state.active.saturating_sub(1);
        drop(state);
        self.inner.notify.notify_one();
    }

    /// Point-in-time pool statistics.
    pub fn stats(&self) -> PoolStats {
        let state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
        PoolStats {
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
            timeouts: self.inner.timeouts.load(Ordering::Relaxed),
            active: state.active,
            idle: state.idle.len() as u32,
        }
    }

    /// Close the pool: drop every idle connection and fail every pending
    /// and future `acquire`. Idempotent.
    pub async fn close(&self) {
        self.inner.closed.store(true, Ordering::Release);
        let mut state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
        state.idle.clear();
        drop(state);
        self.inner.notify.notify_waiters();
    }
}

async fn replenish_loop<C: PooledConnection>(weak: Weak<Inner<C>>) {
    loop {
        let interval = {
            let inner = match weak.upgrade() {
                Some(inner) => inner,
                None => return,
            };
            if inner.closed.load(Ordering::Acquire) {
                return;
            }

            let deficit = {
                let state = inner.state.lock().unwrap_or_else(|e| e.into_inner());
                let idle = state.idle.len() as u32;
                let room = inner.config.max_size.saturating_sub(state.active + idle);
                inner.config.min_idle.saturating_sub(idle).min(room)
            };

            for _ in 0..deficit {
                if inner.closed.load(Ordering::Acquire) {
                    return;
                }
                match C::create(&inner.create_cfg).await {
                    Ok(conn) => {
                        let mut state = inner.state.lock().unwrap_or_else(|e| e.into_inner());
                        state.idle.push_back(conn);
                        drop(state);
                        inner.notify.notify_one();
                    }
                    Err(err) => {
                        tracing::debug!(error = %err, "replenishment create failed, retrying next pass");
                        break;
                    }
                }
            }

            inner.config.idle_check_interval
            // `inner` (the strong Arc) drops here, before the sleep below,
            // so the pool can be torn down while this task is asleep.
        };

        tokio::time::sleep(interval).await;
    }
}
