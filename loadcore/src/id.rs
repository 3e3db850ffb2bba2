//! Typed ID wrappers for run and worker identifiers.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Typed ID wrappers prevent mixing up a run ID with a worker index
/// formatted as a string, etc. These are just strings underneath — no
/// UUID enforcement, no format requirement.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new typed ID from anything that converts to String.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

typed_id!(RunId, "Unique identifier for one scheduler run.");
typed_id!(WorkerId, "Identifier for one worker within a run.");

impl RunId {
    /// Generate a new, effectively-unique run ID.
    ///
    /// Not a UUID — just random enough to tell runs apart in logs and
    /// snapshots, with no external crate dependency beyond `rand` (already
    /// a `loadcore` dependency for key generation).
    pub fn generate() -> Self {
        let n: u64 = rand::rng().random();
        Self(format!("run-{n:016x}"))
    }
}

impl WorkerId {
    /// Construct the ID for worker `index` within a run.
    pub fn for_index(index: u32) -> Self {
        Self(format!("w{index}"))
    }
}
