//! The typed job specification a [`crate::ProtocolAdapter`] run is driven by.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::error::SchedulerError;

/// Exactly one of count- or duration-based termination for a run.
///
/// Carrying this as an enum rather than two `Option` fields on [`JobSpec`]
/// makes "exactly one of total/duration" a type-level invariant instead of
/// a runtime check scattered across the scheduler.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Stop once this many operations have been issued.
    Count(u64),
    /// Stop once this much wall-clock time has elapsed since the run started.
    Duration(#[serde(with = "duration_secs")] Duration),
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        d.as_secs_f64().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Ok(Duration::from_secs_f64(secs))
    }
}

/// Typed specification for one scheduler run.
///
/// Populated by an external configuration collaborator (CLI flags, a YAML
/// file) — this crate defines the shape, not how it is loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSpec {
    /// Operation type looked up in the run's [`crate::OperationRegistry`].
    pub operation_type: String,

    /// Termination condition: a fixed count or a fixed duration, never both.
    pub termination: Termination,

    /// Number of concurrent workers.
    pub parallels: u32,

    /// Per-operation deadline, independent of the run-level deadline.
    pub timeout: Duration,

    /// Duration over which worker starts are staggered. Zero means every
    /// worker starts immediately.
    #[serde(default)]
    pub ramp_up: Duration,

    /// Payload size in bytes for write operations.
    #[serde(default)]
    pub data_size: usize,

    /// Read ratio (0-100) for mixed-workload operation types.
    #[serde(default)]
    pub read_percent: u8,

    /// Key-space size for random key mode; zero selects sequential mode.
    #[serde(default)]
    pub random_keys: u64,

    /// Write expiry, if the operation type and adapter support one.
    #[serde(default)]
    pub ttl: Option<Duration>,

    /// Adapter- or operation-specific extra parameters (hash field name,
    /// pub/sub channel, Kafka topic, ...).
    #[serde(default)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl JobSpec {
    /// Reject structurally invalid specs before a run starts. Exactly one
    /// termination condition is enforced by [`Termination`]'s type itself;
    /// this checks the remaining cross-field invariants.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if self.parallels == 0 {
            return Err(SchedulerError::InvalidJobSpec(
                "parallels must be at least 1".into(),
            ));
        }
        // `Termination::Count(0)` is a valid, degenerate run: zero operations
        // issued, a zero-count snapshot, no error. See `Scheduler::run`'s
        // early return for the same case.
        if matches!(self.termination, Termination::Duration(d) if d.is_zero()) {
            return Err(SchedulerError::InvalidJobSpec(
                "duration must be positive".into(),
            ));
        }
        if !(0..=100).contains(&self.read_percent) {
            return Err(SchedulerError::InvalidJobSpec(
                "read_percent must be between 0 and 100".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_spec() -> JobSpec {
        JobSpec {
            operation_type: "get".into(),
            termination: Termination::Count(1000),
            parallels: 10,
            timeout: Duration::from_secs(1),
            ramp_up: Duration::ZERO,
            data_size: 64,
            read_percent: 100,
            random_keys: 0,
            ttl: None,
            extra: HashMap::new(),
        }
    }

    #[test]
    fn valid_spec_passes() {
        assert!(base_spec().validate().is_ok());
    }

    #[test]
    fn zero_parallels_is_rejected() {
        let mut spec = base_spec();
        spec.parallels = 0;
        assert!(spec.validate().is_err());
    }

    #[test]
    fn zero_count_is_accepted_as_a_degenerate_run() {
        let mut spec = base_spec();
        spec.termination = Termination::Count(0);
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn zero_duration_is_rejected() {
        let mut spec = base_spec();
        spec.termination = Termination::Duration(Duration::ZERO);
        assert!(spec.validate().is_err());
    }

    #[test]
    fn duration_termination_is_accepted() {
        let mut spec = base_spec();
        spec.termination = Termination::Duration(Duration::from_secs(5));
        assert!(spec.validate().is_ok());
    }
}
