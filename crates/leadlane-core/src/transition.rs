//! Status transition controller: the one path that changes a lead's
//! pipeline stage.
//!
//! Every change runs the optimistic cycle — apply locally, write remotely,
//! confirm or roll back on the ack — with the store's token
//! compare-and-swap guarding against a late failure clobbering state that
//! a remote event already superseded. The cycle is split-phase
//! ([`TransitionController::begin`] / [`TransitionController::finish`]) so
//! the unconfirmed window is explicit; [`TransitionController::set_status`]
//! runs both phases for synchronous callers.
//!
//! Board mode adds the drag lifecycle on top: capture on drag start,
//! candidate-column tracking on drag over (visual feedback only), the
//! optimistic cycle on drop, and unconditional cleanup on drag end.

use tracing::{debug, info};

use crate::config::TransitionPolicy;
use crate::error::SyncError;
use crate::model::{LeadId, LeadPatch, Status};
use crate::remote::{LeadBackend, RemoteError};
use crate::store::{LeadStore, OpToken};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// A transition that has been applied optimistically and awaits the
/// remote verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransition {
    pub id: LeadId,
    pub from: Status,
    pub to: Status,
    token: OpToken,
}

/// Result of a completed direct transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The status changed and the remote confirmed it.
    Applied { from: Status, to: Status },
    /// Target equals the current status; nothing to do.
    Unchanged,
}

/// Result of a board drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// The card moved columns and the remote confirmed it.
    Moved {
        id: LeadId,
        from: Status,
        to: Status,
    },
    /// Dropped onto its own column — a silent no-op, not an error.
    SamePlace,
    /// No drag was in progress.
    NoDrag,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
struct DragState {
    source: Option<(LeadId, Status)>,
    hover: Option<Status>,
}

/// Mediates drag-and-drop and direct status changes under one policy.
#[derive(Debug)]
pub struct TransitionController {
    policy: TransitionPolicy,
    drag: DragState,
}

impl TransitionController {
    #[must_use]
    pub const fn new(policy: TransitionPolicy) -> Self {
        Self {
            policy,
            drag: DragState {
                source: None,
                hover: None,
            },
        }
    }

    // -- split-phase optimistic cycle --------------------------------------

    /// Phase one: policy check plus immediate optimistic apply.
    ///
    /// Returns `Ok(None)` when the target equals the current status (the
    /// stale-drag no-op). If an earlier transition on the same lead is
    /// still unconfirmed, its optimistic apply is aborted here — the
    /// store spends its token and this request takes over; the earlier
    /// ack resolves against a spent token and does nothing.
    ///
    /// # Errors
    ///
    /// [`SyncError::UnknownLead`] for an absent id,
    /// [`SyncError::TransitionDenied`] when policy forbids the move.
    pub fn begin(
        &self,
        store: &mut LeadStore,
        id: &LeadId,
        target: Status,
    ) -> Result<Option<PendingTransition>, SyncError> {
        let from = store
            .get(id)
            .ok_or_else(|| SyncError::UnknownLead { id: id.clone() })?
            .status;
        if from == target {
            return Ok(None);
        }
        if !self.policy.allows(from, target) {
            return Err(SyncError::TransitionDenied { from, to: target });
        }
        if store.pending_token(id).is_some() {
            debug!(id = %id, "superseding unconfirmed transition");
        }
        let token = store.apply_optimistic(id, &LeadPatch::status_only(target))?;
        Ok(Some(PendingTransition {
            id: id.clone(),
            from,
            to: target,
            token,
        }))
    }

    /// Phase two: settle a pending transition with the remote verdict.
    ///
    /// On success the optimistic tag is confirmed (the feed echo later
    /// no-ops idempotently). On failure the tag is reverted — unless a
    /// remote event already spent it, in which case the newer state stands
    /// and only the error is reported.
    ///
    /// # Errors
    ///
    /// Propagates the remote failure as [`SyncError`] after the rollback.
    pub fn finish(
        store: &mut LeadStore,
        pending: &PendingTransition,
        verdict: Result<(), RemoteError>,
    ) -> Result<(), SyncError> {
        match verdict {
            Ok(()) => {
                store.confirm(&pending.id, pending.token);
                info!(id = %pending.id, from = %pending.from, to = %pending.to, "transition confirmed");
                Ok(())
            }
            Err(err) => {
                store.revert(&pending.id, pending.token);
                Err(err.into())
            }
        }
    }

    /// Direct selection path (table mode): both phases back to back.
    ///
    /// # Errors
    ///
    /// Everything [`Self::begin`] and [`Self::finish`] can report.
    pub fn set_status(
        &self,
        store: &mut LeadStore,
        backend: &dyn LeadBackend,
        id: &LeadId,
        target: Status,
    ) -> Result<TransitionOutcome, SyncError> {
        let Some(pending) = self.begin(store, id, target)? else {
            return Ok(TransitionOutcome::Unchanged);
        };
        let verdict = backend.update(id, &LeadPatch::status_only(target));
        Self::finish(store, &pending, verdict)?;
        Ok(TransitionOutcome::Applied {
            from: pending.from,
            to: pending.to,
        })
    }

    // -- drag lifecycle -----------------------------------------------------

    /// Drag start: capture the source card and its current status. No
    /// state change yet.
    ///
    /// # Errors
    ///
    /// [`SyncError::UnknownLead`] when the card vanished under the cursor.
    pub fn drag_start(&mut self, store: &LeadStore, id: &LeadId) -> Result<(), SyncError> {
        let status = store
            .get(id)
            .ok_or_else(|| SyncError::UnknownLead { id: id.clone() })?
            .status;
        self.drag.source = Some((id.clone(), status));
        self.drag.hover = None;
        Ok(())
    }

    /// Drag over a column: remember the candidate target for visual
    /// feedback only.
    pub fn drag_over(&mut self, column: Status) {
        if self.drag.source.is_some() {
            self.drag.hover = Some(column);
        }
    }

    /// The card currently held, if a drag is in progress.
    #[must_use]
    pub fn dragging(&self) -> Option<(&LeadId, Status)> {
        self.drag.source.as_ref().map(|(id, status)| (id, *status))
    }

    /// The candidate column under the held card, if any.
    #[must_use]
    pub const fn hover(&self) -> Option<Status> {
        self.drag.hover
    }

    /// Drop onto a column. Transient drag state is cleared no matter how
    /// the drop resolves.
    ///
    /// # Errors
    ///
    /// The optimistic-cycle failures of [`Self::set_status`]; the
    /// optimistic change is already rolled back when this returns an
    /// error.
    pub fn drop_on(
        &mut self,
        store: &mut LeadStore,
        backend: &dyn LeadBackend,
        column: Status,
    ) -> Result<DropOutcome, SyncError> {
        let source = self.drag.source.take();
        self.drag.hover = None;
        let Some((id, from)) = source else {
            return Ok(DropOutcome::NoDrag);
        };
        if from == column {
            return Ok(DropOutcome::SamePlace);
        }
        match self.set_status(store, backend, &id, column)? {
            TransitionOutcome::Applied { from, to } => Ok(DropOutcome::Moved { id, from, to }),
            // The status changed under us between drag start and drop;
            // the card is already where it was dropped.
            TransitionOutcome::Unchanged => Ok(DropOutcome::SamePlace),
        }
    }

    /// Drag end: clear all transient drag state. Runs on cancelled and
    /// aborted drags too — a drop outside any column must not leave a
    /// card held.
    pub fn drag_end(&mut self) {
        self.drag.source = None;
        self.drag.hover = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
