//! Boundary traits for the hosted backend.
//!
//! The persistent store, the vehicle catalog, and the auth service are
//! external collaborators. They are reached through an explicitly
//! constructed [`Services`] handle that is passed into the store loader,
//! the transition controller, and the login flow — never through a
//! module-level singleton.

use std::sync::Arc;
use std::sync::mpsc;

use serde::{Deserialize, Serialize};

use crate::error::SyncError;
use crate::feed::RawChange;
use crate::model::{Lead, LeadId, LeadPatch, NewLead, Vehicle};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure of a single remote call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The call never reached the store (network down, subscription dead).
    #[error("remote unavailable: {reason}")]
    Unavailable { reason: String },
    /// The store reached a decision and said no (validation, constraint).
    #[error("write rejected: {reason}")]
    Rejected { reason: String },
}

impl From<RemoteError> for SyncError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Unavailable { reason } => Self::RemoteUnavailable { reason },
            RemoteError::Rejected { reason } => Self::WriteRejected { reason },
        }
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// The remote lead collection.
pub trait LeadBackend {
    /// Insert a new lead with `status = Nuevo`; the store assigns the id
    /// and creation timestamp and returns the confirmed record.
    fn insert(&self, draft: NewLead) -> Result<Lead, RemoteError>;

    /// Patch the record with the given id.
    fn update(&self, id: &LeadId, patch: &LeadPatch) -> Result<(), RemoteError>;

    /// Delete the record with the given id.
    fn delete(&self, id: &LeadId) -> Result<(), RemoteError>;

    /// Full fetch ordered by `created_at` descending, used to establish or
    /// refresh the store snapshot.
    fn query_all(&self) -> Result<Vec<Lead>, RemoteError>;

    /// Open a change subscription. No backfill: only commits after this
    /// call are delivered. A dropped subscription closes the channel.
    fn subscribe(&self) -> mpsc::Receiver<RawChange>;
}

/// The vehicle reference catalog.
pub trait VehicleCatalog {
    /// All catalog entries ordered by name ascending.
    fn list(&self) -> Result<Vec<Vehicle>, RemoteError>;

    /// Add an entry; returns the stored row.
    fn add(&self, name: &str) -> Result<Vehicle, RemoteError>;

    /// Remove an entry by id. Leads that reference it keep their value.
    fn remove(&self, id: &str) -> Result<(), RemoteError>;
}

/// An authenticated session, as reported by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
}

/// The opaque authentication service.
pub trait AuthService {
    fn sign_in(&self, email: &str, password: &str) -> Result<Session, RemoteError>;
    fn sign_up(&self, email: &str, password: &str) -> Result<(), RemoteError>;
    fn sign_out(&self);
    fn session(&self) -> Option<Session>;
}

// ---------------------------------------------------------------------------
// Services handle
// ---------------------------------------------------------------------------

/// Bundle of backend handles created once at session start and passed to
/// whoever needs a remote call.
#[derive(Clone)]
pub struct Services {
    pub leads: Arc<dyn LeadBackend + Send + Sync>,
    pub catalog: Arc<dyn VehicleCatalog + Send + Sync>,
    pub auth: Arc<dyn AuthService + Send + Sync>,
}

impl Services {
    #[must_use]
    pub fn new(
        leads: Arc<dyn LeadBackend + Send + Sync>,
        catalog: Arc<dyn VehicleCatalog + Send + Sync>,
        auth: Arc<dyn AuthService + Send + Sync>,
    ) -> Self {
        Self {
            leads,
            catalog,
            auth,
        }
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}
