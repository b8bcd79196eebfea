//! leadlane-core: the lead synchronization and view-projection engine.
//!
//! The [`store::LeadStore`] owns the in-memory lead collection and is the
//! single writer; it merges three sources of change under one policy:
//! local optimistic edits, the remote change feed (via [`feed`]), and
//! explicit snapshot loads. [`view`] derives the table and board
//! projections from the store without mutating it, [`transition`] runs
//! the optimistic status-change cycle, and [`export`] serializes the
//! projected table. The hosted backend sits behind the [`remote`] traits.
//!
//! # Conventions
//!
//! - **Errors**: typed [`error::SyncError`] inside the engine;
//!   `anyhow::Result` only at binary boundaries.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod config;
pub mod error;
pub mod export;
pub mod feed;
pub mod link;
pub mod model;
pub mod remote;
pub mod store;
pub mod transition;
pub mod view;
