use loadcore_metrics::quantiles;
use proptest::prelude::*;
use std::time::Duration;

proptest! {
    #[test]
    fn quantiles_are_non_decreasing_for_any_sample_set(ms in prop::collection::vec(0u64..10_000, 1..500)) {
        let samples: Vec<Duration> = ms.into_iter().map(Duration::from_millis).collect();
        let q = quantiles(samples);

        prop_assert!(q.min.unwrap() <= q.p50.unwrap());
        prop_assert!(q.p50.unwrap() <= q.p90.unwrap());
        prop_assert!(q.p90.unwrap() <= q.p95.unwrap());
        prop_assert!(q.p95.unwrap() <= q.p99.unwrap());
        prop_assert!(q.p99.unwrap() <= q.max.unwrap());
        prop_assert!(q.min.unwrap() <= q.avg.unwrap());
        prop_assert!(q.avg.unwrap() <= q.max.unwrap());
    }
}
