//! leadlane-sim: deterministic simulation harness for the sync engine.
//!
//! Provides an in-memory backend implementing the remote-service traits,
//! scripted concurrent actors, a reproducible RNG, and an invariant
//! oracle. Scenarios replay exactly from a seed.
//!
//! # Conventions
//!
//! - **Errors**: `anyhow::Result` at scenario boundaries, typed errors below.
//! - **Logging**: `tracing` macros.

pub mod actors;
pub mod backend;
pub mod oracle;
pub mod rng;

pub use actors::ActorPool;
pub use backend::{Faults, MemoryBackend};
pub use oracle::{OracleResult, check_all};
pub use rng::DeterministicRng;
