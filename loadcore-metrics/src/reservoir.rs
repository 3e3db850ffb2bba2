//! Bounded latency reservoir and its quantile computation.
//!
//! The reservoir itself only ever pushes and pops; it never sorts. Sorting
//! happens exactly once, on a cloned snapshot, inside [`quantiles`] — never
//! on the `record` hot path.

use loadcore::LatencyMs;
use std::collections::VecDeque;
use std::time::Duration;

/// Fixed-capacity ring buffer of recent latency samples.
///
/// Bounded lossiness: once full, the oldest sample is evicted to make room
/// for the newest. Quantiles over this buffer approximate the true
/// distribution of *recent* latencies, not the whole run's history.
pub struct ReservoirState {
    samples: VecDeque<Duration>,
    capacity: usize,
}

impl ReservoirState {
    /// Create an empty reservoir with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    /// Push a new sample, evicting the oldest one if full.
    pub fn push(&mut self, duration: Duration) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(duration);
    }

    /// Clone the retained samples out, for quantile computation outside the
    /// lock guarding this reservoir.
    pub fn snapshot_samples(&self) -> Vec<Duration> {
        self.samples.iter().copied().collect()
    }

    /// Discard all retained samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Latency summary computed from a (already sorted-free) sample set.
#[derive(Debug, Clone, Copy, Default)]
pub struct Quantiles {
    /// Minimum observed latency.
    pub min: Option<LatencyMs>,
    /// Maximum observed latency.
    pub max: Option<LatencyMs>,
    /// Mean observed latency.
    pub avg: Option<LatencyMs>,
    /// 50th percentile.
    pub p50: Option<LatencyMs>,
    /// 90th percentile.
    pub p90: Option<LatencyMs>,
    /// 95th percentile.
    pub p95: Option<LatencyMs>,
    /// 99th percentile.
    pub p99: Option<LatencyMs>,
}

/// Sort `samples` and compute min/max/avg/p50/p90/p95/p99 over them.
///
/// `samples` should already be a private clone of the reservoir's contents
/// — this function takes ownership so it can sort in place without an
/// extra allocation.
pub fn quantiles(mut samples: Vec<Duration>) -> Quantiles {
    if samples.is_empty() {
        return Quantiles::default();
    }
    samples.sort_unstable();

    let n = samples.len();
    let sum: Duration = samples.iter().sum();
    let avg = sum / n as u32;

    let at = |p: f64| -> Duration {
        let idx = ((p * n as f64).ceil() as usize).saturating_sub(1).min(n - 1);
        samples[idx]
    };

    Quantiles {
        min: Some(LatencyMs::from(samples[0])),
        max: Some(LatencyMs::from(samples[n - 1])),
        avg: Some(LatencyMs::from(avg)),
        p50: Some(LatencyMs::from(at(0.5))),
        p90: Some(LatencyMs::from(at(0.9))),
        p95: Some(LatencyMs::from(at(0.95))),
        p99: Some(LatencyMs::from(at(0.99))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_reservoir_yields_no_quantiles() {
        let r = ReservoirState::new(10);
        let q = quantiles(r.snapshot_samples());
        assert!(q.min.is_none());
    }

    #[test]
    fn overflow_evicts_oldest_sample() {
        let mut r = ReservoirState::new(3);
        for ms in [1, 2, 3, 4] {
            r.push(Duration::from_millis(ms));
        }
        let samples = r.snapshot_samples();
        assert_eq!(samples.len(), 3);
        assert!(!samples.contains(&Duration::from_millis(1)));
    }

    #[test]
    fn quantile_ordering_invariant_holds() {
        let mut r = ReservoirState::new(1000);
        for ms in 1..=1000u64 {
            r.push(Duration::from_millis(ms));
        }
        let q = quantiles(r.snapshot_samples());
        assert!(q.min.unwrap() <= q.p50.unwrap());
        assert!(q.p50.unwrap() <= q.p90.unwrap());
        assert!(q.p90.unwrap() <= q.p95.unwrap());
        assert!(q.p95.unwrap() <= q.p99.unwrap());
        assert!(q.p99.unwrap() <= q.max.unwrap());
    }

    #[test]
    fn single_sample_reports_itself_everywhere() {
        let mut r = ReservoirState::new(10);
        r.push(Duration::from_millis(42));
        let q = quantiles(r.snapshot_samples());
        assert_eq!(q.min, Some(LatencyMs::from_millis(42)));
        assert_eq!(q.p99, Some(LatencyMs::from_millis(42)));
    }
}
