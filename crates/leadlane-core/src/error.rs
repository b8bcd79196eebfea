//! Error types surfaced by the sync engine.
//!
//! Nothing here is fatal: every variant maps to a user-visible notice or a
//! dropped event, and the engine keeps accepting commands afterwards.

use crate::model::{EmptyField, LeadId, Status};

/// Engine-level error with a stable machine-readable code per variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// The subscription dropped or a remote call never reached the store.
    /// The store keeps serving its last known snapshot.
    #[error("remote store unreachable: {reason}")]
    RemoteUnavailable { reason: String },

    /// The remote store rejected a write; the optimistic change was
    /// reverted and the write is never retried automatically.
    #[error("remote store rejected the write: {reason}")]
    WriteRejected { reason: String },

    /// The configured transition policy denies this status change.
    #[error("transition {from} -> {to} is denied by policy")]
    TransitionDenied { from: Status, to: Status },

    /// A change-feed event could not be normalized and was dropped.
    #[error("malformed remote event: {detail}")]
    MalformedRemoteEvent { detail: String },

    /// An operation referenced a lead the store does not hold.
    #[error("lead '{id}' not found")]
    UnknownLead { id: LeadId },

    /// A form submission left a required field empty.
    #[error(transparent)]
    EmptyField(#[from] EmptyField),
}

impl SyncError {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::RemoteUnavailable { .. } => "E1001",
            Self::WriteRejected { .. } => "E1002",
            Self::TransitionDenied { .. } => "E2001",
            Self::MalformedRemoteEvent { .. } => "E2002",
            Self::UnknownLead { .. } => "E2003",
            Self::EmptyField(_) => "E2004",
        }
    }

    /// Optional remediation hint surfaced alongside the message.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        match self {
            Self::RemoteUnavailable { .. } => {
                Some("Showing the last synced data; refresh once the connection returns.")
            }
            Self::WriteRejected { .. } => Some("The change was rolled back; retry manually."),
            Self::TransitionDenied { .. } => Some("Adjust [transitions] in leadlane.toml."),
            Self::MalformedRemoteEvent { .. } | Self::UnknownLead { .. } | Self::EmptyField(_) => {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_are_unique_and_machine_friendly() {
        let all = [
            SyncError::RemoteUnavailable {
                reason: String::new(),
            },
            SyncError::WriteRejected {
                reason: String::new(),
            },
            SyncError::TransitionDenied {
                from: Status::New,
                to: Status::Closed,
            },
            SyncError::MalformedRemoteEvent {
                detail: String::new(),
            },
            SyncError::UnknownLead {
                id: LeadId::from("x"),
            },
            SyncError::EmptyField(EmptyField { field: "nombre" }),
        ];

        let mut seen = HashSet::new();
        for err in &all {
            let code = err.code();
            assert!(seen.insert(code), "duplicate code {code}");
            assert_eq!(code.len(), 5);
            assert!(code.starts_with('E'));
            assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
        }
    }
}
