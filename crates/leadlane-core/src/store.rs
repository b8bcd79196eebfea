//! The lead store: the single authoritative in-memory mapping of lead id
//! to lead record.
//!
//! All mutation flows through one writer path — snapshot loads, remote
//! feed merges, and local optimistic edits — so observers never see a
//! partially merged record. The merge discipline is "remote wins": any
//! remote event for an id supersedes that id's in-flight optimistic patch,
//! and supersession is tracked with a per-record token compare-and-swap,
//! never with timestamps.
//!
//! # Merge policy
//!
//! - Insert: add, or overwrite by id when the id is already present
//!   (duplicate delivery / echo of a local insert) — idempotent.
//! - Update: overwrite all fields by id; an update for an id the store has
//!   not seen yet is treated as an insert (out-of-order vs. snapshot).
//! - Delete: remove if present, no-op otherwise — idempotent.
//!
//! Events for the same id must arrive in server commit order (the feed
//! adapter enforces this); the store does not reorder.

use std::collections::HashMap;

use tracing::debug;

use crate::error::SyncError;
use crate::feed::{ChangeEvent, ChangeKind};
use crate::model::{Lead, LeadId, LeadPatch};

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// Identity of one optimistic apply. A token is spent the moment a remote
/// event lands on its record or a newer optimistic apply replaces it;
/// confirm/revert with a spent token is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpToken(u64);

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct PendingOp {
    token: OpToken,
    /// Last confirmed field values, restored verbatim on revert.
    base: Lead,
}

#[derive(Debug, Clone)]
struct Entry {
    lead: Lead,
    optimistic: Option<PendingOp>,
    /// Locally deleted, awaiting the remote verdict. Hidden from
    /// snapshots until confirmed or reverted.
    pending_delete: bool,
}

/// Authoritative in-memory lead collection. At most one record per id at
/// all times; `snapshot()` yields records in insertion order.
#[derive(Debug, Default)]
pub struct LeadStore {
    entries: HashMap<LeadId, Entry>,
    order: Vec<LeadId>,
    version: u64,
    next_token: u64,
}

impl LeadStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotone counter bumped by every observable mutation. Projections
    /// record the version they derived from so stale views are detectable.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Number of records, hidden pending-deletes included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The visible record for an id, if any.
    #[must_use]
    pub fn get(&self, id: &LeadId) -> Option<&Lead> {
        self.entries
            .get(id)
            .filter(|entry| !entry.pending_delete)
            .map(|entry| &entry.lead)
    }

    /// Read-only copy of all visible leads in insertion order. Callers get
    /// owned records and cannot alias the store's state.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Lead> {
        self.order
            .iter()
            .filter_map(|id| self.get(id).cloned())
            .collect()
    }

    fn bump(&mut self) {
        self.version += 1;
    }

    fn fresh_token(&mut self) -> OpToken {
        self.next_token += 1;
        OpToken(self.next_token)
    }

    // -- snapshot load ------------------------------------------------------

    /// Replace the full record set atomically (startup and manual
    /// refresh). Snapshot fields win over any optimistic edit in flight,
    /// but a record marked pending-delete stays excluded until its delete
    /// is confirmed or explicitly reverted.
    pub fn load_snapshot(&mut self, records: Vec<Lead>) {
        let pending_deletes: Vec<LeadId> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.pending_delete)
            .map(|(id, _)| id.clone())
            .collect();

        self.entries.clear();
        self.order.clear();
        for lead in records {
            let id = lead.id.clone();
            let pending_delete = pending_deletes.contains(&id);
            self.order.push(id.clone());
            self.entries.insert(
                id,
                Entry {
                    lead,
                    optimistic: None,
                    pending_delete,
                },
            );
        }
        self.bump();
        debug!(count = self.entries.len(), "snapshot loaded");
    }

    // -- remote merge -------------------------------------------------------

    /// Merge one normalized feed event. Remote is the final authority: the
    /// record's optimistic tag, if any, is spent by this call.
    pub fn apply_remote_event(&mut self, event: &ChangeEvent) {
        match event.kind {
            ChangeKind::Insert | ChangeKind::Update => self.upsert(event.lead.clone()),
            ChangeKind::Delete => self.remove(&event.lead.id),
        }
    }

    fn upsert(&mut self, lead: Lead) {
        let id = lead.id.clone();
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.lead = lead;
            entry.optimistic = None;
        } else {
            self.order.push(id.clone());
            self.entries.insert(
                id,
                Entry {
                    lead,
                    optimistic: None,
                    pending_delete: false,
                },
            );
        }
        self.bump();
    }

    fn remove(&mut self, id: &LeadId) {
        if self.entries.remove(id).is_some() {
            self.order.retain(|other| other != id);
            self.bump();
        }
    }

    // -- optimistic edits ---------------------------------------------------

    /// Apply a partial change immediately, ahead of remote confirmation.
    ///
    /// The pre-patch field values are retained so a later [`Self::revert`]
    /// restores exactly the last confirmed state. When an earlier
    /// optimistic apply is still unconfirmed its base is kept and its
    /// token is spent — the newer apply supersedes it.
    ///
    /// # Errors
    ///
    /// [`SyncError::UnknownLead`] when the id is absent or hidden by a
    /// pending delete.
    pub fn apply_optimistic(&mut self, id: &LeadId, patch: &LeadPatch) -> Result<OpToken, SyncError> {
        let token = self.fresh_token();
        let entry = self
            .entries
            .get_mut(id)
            .filter(|entry| !entry.pending_delete)
            .ok_or_else(|| SyncError::UnknownLead { id: id.clone() })?;

        let base = entry
            .optimistic
            .take()
            .map_or_else(|| entry.lead.clone(), |prev| prev.base);
        entry.lead.apply_patch(patch);
        entry.optimistic = Some(PendingOp { token, base });
        self.bump();
        Ok(token)
    }

    /// The live optimistic token for an id, if one is unconfirmed.
    #[must_use]
    pub fn pending_token(&self, id: &LeadId) -> Option<OpToken> {
        self.entries
            .get(id)
            .and_then(|entry| entry.optimistic.as_ref())
            .map(|op| op.token)
    }

    /// Settle an optimistic apply whose remote write succeeded. No-op when
    /// the token was already spent (the remote echo or a newer apply got
    /// there first).
    pub fn confirm(&mut self, id: &LeadId, token: OpToken) {
        if let Some(entry) = self.entries.get_mut(id) {
            if entry.optimistic.as_ref().is_some_and(|op| op.token == token) {
                entry.optimistic = None;
            }
        }
    }

    /// Roll back an optimistic apply whose remote write failed — but only
    /// if its token is still current. A stale token means a remote event
    /// already superseded the patch, and restoring the old base would
    /// clobber newer state.
    pub fn revert(&mut self, id: &LeadId, token: OpToken) {
        let Some(entry) = self.entries.get_mut(id) else {
            return;
        };
        if let Some(op) = entry.optimistic.take_if(|op| op.token == token) {
            entry.lead = op.base;
            self.bump();
        } else {
            debug!(id = %id, "revert skipped: optimistic tag superseded");
        }
    }

    // -- optimistic delete --------------------------------------------------

    /// Hide a record immediately while its remote delete is in flight.
    ///
    /// # Errors
    ///
    /// [`SyncError::UnknownLead`] when the id is not in the store.
    pub fn mark_pending_delete(&mut self, id: &LeadId) -> Result<(), SyncError> {
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| SyncError::UnknownLead { id: id.clone() })?;
        entry.pending_delete = true;
        entry.optimistic = None;
        self.bump();
        Ok(())
    }

    /// The remote accepted the delete (ack or feed echo): drop the record.
    pub fn confirm_delete(&mut self, id: &LeadId) {
        self.remove(id);
    }

    /// The remote rejected the delete: the record becomes visible again
    /// with whatever fields it currently carries.
    pub fn revert_delete(&mut self, id: &LeadId) {
        if let Some(entry) = self.entries.get_mut(id) {
            if entry.pending_delete {
                entry.pending_delete = false;
                self.bump();
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;
    use chrono::{TimeZone, Utc};

    fn lead(id: &str, status: Status) -> Lead {
        Lead {
            id: LeadId::from(id),
            name: format!("Lead {id}"),
            phone: "5511122233".to_string(),
            vehicle_interest: "Rav4".to_string(),
            comment: None,
            status,
            classification: None,
            created_at: Utc.with_ymd_and_hms(2026, 1, 15, 8, 0, 0).single().expect("valid ts"),
        }
    }

    fn event(kind: ChangeKind, record: Lead, seq: u64) -> ChangeEvent {
        ChangeEvent {
            kind,
            lead: record,
            commit_seq: seq,
        }
    }

    #[test]
    fn insert_then_duplicate_insert_is_idempotent() {
        let mut store = LeadStore::new();
        store.apply_remote_event(&event(ChangeKind::Insert, lead("a", Status::New), 1));
        let mut echoed = lead("a", Status::New);
        echoed.comment = Some("eco".to_string());
        store.apply_remote_event(&event(ChangeKind::Insert, echoed, 2));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].comment.as_deref(), Some("eco"));
    }

    #[test]
    fn update_for_unknown_id_inserts() {
        let mut store = LeadStore::new();
        store.apply_remote_event(&event(ChangeKind::Update, lead("a", Status::Contacted), 1));
        assert_eq!(store.snapshot().len(), 1);
        assert_eq!(store.get(&LeadId::from("a")).expect("present").status, Status::Contacted);
    }

    #[test]
    fn delete_is_idempotent() {
        let mut store = LeadStore::new();
        store.apply_remote_event(&event(ChangeKind::Insert, lead("a", Status::New), 1));
        store.apply_remote_event(&event(ChangeKind::Delete, lead("a", Status::New), 2));
        let version = store.version();
        store.apply_remote_event(&event(ChangeKind::Delete, lead("a", Status::New), 3));
        assert!(store.is_empty());
        // The second delete changed nothing observable.
        assert_eq!(store.version(), version);
    }

    #[test]
    fn delete_then_reinsert_leaves_one_record() {
        let mut store = LeadStore::new();
        store.apply_remote_event(&event(ChangeKind::Insert, lead("a", Status::New), 1));
        store.apply_remote_event(&event(ChangeKind::Delete, lead("a", Status::New), 2));
        store.apply_remote_event(&event(ChangeKind::Insert, lead("a", Status::Contacted), 3));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].status, Status::Contacted);
    }

    #[test]
    fn optimistic_then_reverted_restores_exact_base() {
        let mut store = LeadStore::new();
        store.apply_remote_event(&event(ChangeKind::Insert, lead("x", Status::New), 1));

        let token = store
            .apply_optimistic(&LeadId::from("x"), &LeadPatch::status_only(Status::Contacted))
            .expect("apply");
        assert_eq!(store.get(&LeadId::from("x")).expect("present").status, Status::Contacted);

        store.revert(&LeadId::from("x"), token);
        assert_eq!(store.get(&LeadId::from("x")).expect("present").status, Status::New);
        assert_eq!(store.pending_token(&LeadId::from("x")), None);
    }

    #[test]
    fn optimistic_then_superseded_ignores_stale_revert() {
        let mut store = LeadStore::new();
        store.apply_remote_event(&event(ChangeKind::Insert, lead("x", Status::New), 1));

        let token = store
            .apply_optimistic(&LeadId::from("x"), &LeadPatch::status_only(Status::Contacted))
            .expect("apply");

        // Another actor commits before our write resolves.
        store.apply_remote_event(&event(ChangeKind::Update, lead("x", Status::Closed), 2));

        // Our write eventually fails; the rollback must not fire.
        store.revert(&LeadId::from("x"), token);
        assert_eq!(store.get(&LeadId::from("x")).expect("present").status, Status::Closed);
    }

    #[test]
    fn newer_optimistic_apply_spends_older_token_but_keeps_base() {
        let mut store = LeadStore::new();
        store.apply_remote_event(&event(ChangeKind::Insert, lead("x", Status::New), 1));
        let id = LeadId::from("x");

        let first = store
            .apply_optimistic(&id, &LeadPatch::status_only(Status::Contacted))
            .expect("apply");
        let second = store
            .apply_optimistic(&id, &LeadPatch::status_only(Status::Closed))
            .expect("apply");
        assert_ne!(first, second);

        // The first write's failure arrives late: stale token, no effect.
        store.revert(&id, first);
        assert_eq!(store.get(&id).expect("present").status, Status::Closed);

        // The second write fails too: rollback lands on the confirmed
        // base, not on the first optimistic value.
        store.revert(&id, second);
        assert_eq!(store.get(&id).expect("present").status, Status::New);
    }

    #[test]
    fn confirm_settles_without_field_change() {
        let mut store = LeadStore::new();
        store.apply_remote_event(&event(ChangeKind::Insert, lead("x", Status::New), 1));
        let id = LeadId::from("x");
        let token = store
            .apply_optimistic(&id, &LeadPatch::status_only(Status::Contacted))
            .expect("apply");

        store.confirm(&id, token);
        assert_eq!(store.pending_token(&id), None);
        assert_eq!(store.get(&id).expect("present").status, Status::Contacted);

        // A later revert with the same (spent) token is a no-op.
        store.revert(&id, token);
        assert_eq!(store.get(&id).expect("present").status, Status::Contacted);
    }

    #[test]
    fn pending_delete_hides_until_resolved() {
        let mut store = LeadStore::new();
        store.apply_remote_event(&event(ChangeKind::Insert, lead("a", Status::New), 1));
        store.apply_remote_event(&event(ChangeKind::Insert, lead("b", Status::New), 2));

        store.mark_pending_delete(&LeadId::from("a")).expect("mark");
        assert_eq!(store.snapshot().len(), 1);

        // A remote update for the hidden id merges but stays hidden.
        store.apply_remote_event(&event(ChangeKind::Update, lead("a", Status::Closed), 3));
        assert_eq!(store.snapshot().len(), 1);

        store.revert_delete(&LeadId::from("a"));
        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(
            store.get(&LeadId::from("a")).expect("present").status,
            Status::Closed
        );
    }

    #[test]
    fn pending_delete_survives_snapshot_reload() {
        let mut store = LeadStore::new();
        store.apply_remote_event(&event(ChangeKind::Insert, lead("a", Status::New), 1));
        store.mark_pending_delete(&LeadId::from("a")).expect("mark");

        // Refresh races the unresolved delete; the row must stay hidden.
        store.load_snapshot(vec![lead("a", Status::New), lead("b", Status::New)]);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id.as_str(), "b");

        store.confirm_delete(&LeadId::from("a"));
        assert_eq!(store.snapshot().len(), 1);
    }

    #[test]
    fn snapshot_load_discards_in_flight_optimistic_edits() {
        let mut store = LeadStore::new();
        store.apply_remote_event(&event(ChangeKind::Insert, lead("a", Status::New), 1));
        let token = store
            .apply_optimistic(&LeadId::from("a"), &LeadPatch::status_only(Status::Contacted))
            .expect("apply");

        store.load_snapshot(vec![lead("a", Status::New)]);
        assert_eq!(store.pending_token(&LeadId::from("a")), None);
        assert_eq!(store.get(&LeadId::from("a")).expect("present").status, Status::New);

        // Late failure of the pre-reload write cannot touch the new state.
        store.revert(&LeadId::from("a"), token);
        assert_eq!(store.get(&LeadId::from("a")).expect("present").status, Status::New);
    }

    #[test]
    fn version_moves_on_observable_mutation() {
        let mut store = LeadStore::new();
        let v0 = store.version();
        store.apply_remote_event(&event(ChangeKind::Insert, lead("a", Status::New), 1));
        assert!(store.version() > v0);

        let v1 = store.version();
        store
            .apply_optimistic(&LeadId::from("a"), &LeadPatch::status_only(Status::Contacted))
            .expect("apply");
        assert!(store.version() > v1);
    }
}
