//! Rolling per-second throughput window.
//!
//! A circular array of 60 per-second operation counts. The bucket for a
//! given second is cleared exactly once, lazily, when the window advances
//! past it — "one slot ahead of the write cursor" rather than an eager
//! background sweep.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

const WINDOW: usize = 60;

/// Rolling 60-second operation-count window.
pub struct ThroughputWindow {
    buckets: [AtomicU64; WINDOW],
    cursor: Mutex<u64>,
}

impl ThroughputWindow {
    /// Create a window with every bucket at zero.
    pub fn new() -> Self {
        Self {
            buckets: std::array::from_fn(|_| AtomicU64::new(0)),
            cursor: Mutex::new(0),
        }
    }

    /// Record one operation at `elapsed_secs` since the run started.
    pub fn record(&self, elapsed_secs: u64) {
        self.advance_to(elapsed_secs);
        let idx = (elapsed_secs as usize) % WINDOW;
        self.buckets[idx].fetch_add(1, Ordering::Relaxed);
    }

    fn advance_to(&self, elapsed_secs: u64) {
        let mut cursor = self.cursor.lock().unwrap_or_else(|e| e.into_inner());
        while *cursor < elapsed_secs {
            *cursor += 1;
            let idx = (*cursor as usize) % WINDOW;
            self.buckets[idx].store(0, Ordering::Relaxed);
        }
    }

    /// Read the window as of `elapsed_secs`, oldest second first, capped at
    /// the last 60 seconds.
    pub fn snapshot(&self, elapsed_secs: u64) -> Vec<u64> {
        self.advance_to(elapsed_secs);
        let window_len = (elapsed_secs + 1).min(WINDOW as u64);
        let start = elapsed_secs + 1 - window_len;
        (start..=elapsed_secs)
            .map(|sec| self.buckets[(sec as usize) % WINDOW].load(Ordering::Relaxed))
            .collect()
    }
}

impl Default for ThroughputWindow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_accumulate_within_the_same_second() {
        let w = ThroughputWindow::new();
        w.record(0);
        w.record(0);
        w.record(0);
        assert_eq!(w.snapshot(0), vec![3]);
    }

    #[test]
    fn window_length_grows_up_to_60_then_caps() {
        let w = ThroughputWindow::new();
        for sec in 0..5 {
            w.record(sec);
        }
        assert_eq!(w.snapshot(4).len(), 5);

        for sec in 5..100 {
            w.record(sec);
        }
        assert_eq!(w.snapshot(99).len(), 60);
    }

    #[test]
    fn stale_buckets_are_cleared_on_wraparound() {
        let w = ThroughputWindow::new();
        w.record(0);
        w.record(60); // same bucket index as second 0
        let snap = w.snapshot(60);
        // second 0's count must not leak into second 60's bucket
        assert_eq!(*snap.last().unwrap(), 1);
    }
}
