//! Shared, concurrency-safe key generation for operation factories.

use rand::Rng;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// How a [`KeyGenerator`] fabricates keys for write operations.
#[derive(Debug, Clone, Copy)]
pub enum KeyMode {
    /// Monotone counter: `i:0`, `i:1`, ...
    Sequential,
    /// Random index into `0..range`: `r:k` for `k < range`.
    Random {
        /// Size of the key space to draw from.
        range: u64,
    },
}

impl KeyMode {
    /// `randomKeys == 0` means sequential; any other value is the range.
    pub fn from_random_keys(random_keys: u64) -> Self {
        if random_keys == 0 {
            KeyMode::Sequential
        } else {
            KeyMode::Random { range: random_keys }
        }
    }
}

/// Shared mutable state used by factories to fabricate keys.
///
/// One instance per run, passed into every factory call via
/// [`crate::FactoryParams`] rather than owned by a factory or a global
/// singleton (design note: "avoid a global singleton; one generator per run
/// is enough").
///
/// The monotone counter is a lock-free atomic add. The append-only history
/// of previously-written keys is protected by a plain mutex — reads
/// (uniform sampling) and writes (append) both take it, but the critical
/// section is a `VecDeque` push/index, not I/O, so contention is brief.
pub struct KeyGenerator {
    mode: KeyMode,
    counter: AtomicU64,
    history: Mutex<VecDeque<String>>,
    history_cap: usize,
}

/// Default cap on the number of previously-written keys retained for
/// uniform read sampling. Ambient resource bound: an unbounded history is
/// not implementable for long runs, and the distillation is silent on it.
pub const DEFAULT_HISTORY_CAP: usize = 100_000;

impl KeyGenerator {
    /// Create a generator with the default history cap.
    pub fn new(mode: KeyMode) -> Self {
        Self::with_history_cap(mode, DEFAULT_HISTORY_CAP)
    }

    /// Create a generator with an explicit history cap.
    pub fn with_history_cap(mode: KeyMode, history_cap: usize) -> Self {
        Self {
            mode,
            counter: AtomicU64::new(0),
            history: Mutex::new(VecDeque::with_capacity(history_cap.min(1024))),
            history_cap,
        }
    }

    /// Fabricate the next key for a write operation and record it into the
    /// append-only history so later reads can sample it.
    pub fn next_write_key(&self) -> String {
        let key = match self.mode {
            KeyMode::Sequential => {
                let n = self.counter.fetch_add(1, Ordering::Relaxed);
                format!("i:{n}")
            }
            KeyMode::Random { range } => {
                let idx = rand::rng().random_range(0..range.max(1));
                format!("r:{idx}")
            }
        };
        self.record(key.clone());
        key
    }

    /// Record a key into the history without generating a new one (used
    /// when the write key must be derived some other way but still needs
    /// to be sampleable by later reads).
    pub fn record(&self, key: String) {
        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        if history.len() >= self.history_cap {
            history.pop_front();
        }
        history.push_back(key);
    }

    /// Sample a previously-written key uniformly at random. `None` if no
    /// key has been written yet.
    pub fn sample_read_key(&self) -> Option<String> {
        let history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        if history.is_empty() {
            return None;
        }
        let idx = rand::rng().random_range(0..history.len());
        history.get(idx).cloned()
    }

    /// Number of keys currently retained for sampling.
    pub fn history_len(&self) -> usize {
        self.history.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
