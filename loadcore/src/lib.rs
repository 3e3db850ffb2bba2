//! # loadcore — data model and protocol traits for a load-generation engine
//!
//! This crate defines the protocol boundaries a multi-protocol load
//! generator is built from, and the typed data that flows across them. It
//! performs no I/O itself.
//!
//! ## The boundaries
//!
//! | Boundary | Trait | What it does |
//! |----------|-------|-------------|
//! | Protocol adapter | [`ProtocolAdapter`] | Executes one [`Operation`] against a remote protocol |
//! | Connection | [`PooledConnection`] | What a [`PoolConfig`]-driven pool creates and recycles |
//! | Operation factory | [`OperationFactory`] | Fabricates operations from job parameters |
//!
//! ## Design principle
//!
//! Every protocol trait is operation-defined, not mechanism-defined.
//! [`ProtocolAdapter::execute`] means "carry out this operation against the
//! remote end" — not "open a socket" or "call this SDK method." This is
//! what lets a Redis adapter, an HTTP adapter, and a Kafka adapter share one
//! scheduler and one metrics collector.
//!
//! ## Dependency notes
//!
//! This crate depends on `serde_json::Value` for extension data fields
//! (`Operation::params`, `Operation::metadata`, `JobSpec::extra`). This is
//! an intentional choice: per-adapter and per-operation-type parameters are
//! genuinely open-ended, and a generic `T: Serialize` would complicate
//! trait-object safety without practical benefit.

#![deny(missing_docs)]

pub mod adapter;
pub mod error;
pub mod factory;
pub mod id;
pub mod job;
pub mod keygen;
pub mod latency;
pub mod operation;
pub mod pool;
pub mod snapshot;

pub use adapter::{OperationKind, ProtocolAdapter};
pub use error::{AdapterError, PoolError, SchedulerError};
pub use factory::{FactoryError, FactoryParams, OperationFactory, OperationRegistry};
pub use id::{RunId, WorkerId};
pub use job::{JobSpec, Termination};
pub use keygen::{KeyGenerator, KeyMode};
pub use latency::LatencyMs;
pub use operation::{Operation, OperationResult};
pub use pool::{PoolConfig, PooledConnection, PoolStats};
pub use snapshot::{ErrorClass, ErrorEntry, Impact, Snapshot, TypeSnapshot};
