//! Invariant oracle: after the client drains its feed, its store must be
//! an exact mirror of the backend, and the projections must obey the
//! partition laws.

use std::collections::BTreeMap;

use leadlane_core::model::{Lead, LeadId, Status};
use leadlane_core::remote::LeadBackend;
use leadlane_core::store::LeadStore;
use leadlane_core::view::project_board;

use crate::backend::MemoryBackend;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Oracle result for an invariant check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleResult {
    /// `true` iff no violations were found.
    pub passed: bool,
    /// Description of every violated invariant.
    pub violations: Vec<InvariantViolation>,
}

impl OracleResult {
    fn pass() -> Self {
        Self {
            passed: true,
            violations: Vec::new(),
        }
    }

    fn fail(violations: Vec<InvariantViolation>) -> Self {
        Self {
            passed: false,
            violations,
        }
    }

    /// Merge another result into this one (failures accumulate).
    #[must_use]
    fn merge(mut self, other: Self) -> Self {
        if !other.passed {
            self.passed = false;
            self.violations.extend(other.violations);
        }
        self
    }
}

/// Diagnostic for a single failed invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// The client store and the backend disagree after quiesce.
    Divergence {
        id: LeadId,
        in_store: Option<Box<Lead>>,
        in_backend: Option<Box<Lead>>,
    },
    /// A lead appears in the wrong number of board columns.
    Partition {
        id: LeadId,
        status: Status,
        columns_holding: usize,
    },
    /// Board bucket totals do not reconcile with the snapshot.
    CountMismatch {
        cards: usize,
        leads: usize,
        lost: usize,
    },
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

/// After the feed has been fully drained, every row the backend holds must
/// appear in the client store with identical fields, and vice versa.
#[must_use]
pub fn check_mirror(store: &LeadStore, backend: &MemoryBackend) -> OracleResult {
    let Ok(rows) = backend.query_all() else {
        return OracleResult::fail(vec![InvariantViolation::CountMismatch {
            cards: 0,
            leads: 0,
            lost: 0,
        }]);
    };
    let backend_rows: BTreeMap<LeadId, Lead> =
        rows.into_iter().map(|lead| (lead.id.clone(), lead)).collect();
    let store_rows: BTreeMap<LeadId, Lead> = store
        .snapshot()
        .into_iter()
        .map(|lead| (lead.id.clone(), lead))
        .collect();

    let mut violations = Vec::new();
    for (id, expected) in &backend_rows {
        if store_rows.get(id) != Some(expected) {
            violations.push(InvariantViolation::Divergence {
                id: id.clone(),
                in_store: store_rows.get(id).cloned().map(Box::new),
                in_backend: Some(Box::new(expected.clone())),
            });
        }
    }
    for (id, stale) in &store_rows {
        if !backend_rows.contains_key(id) {
            violations.push(InvariantViolation::Divergence {
                id: id.clone(),
                in_store: Some(Box::new(stale.clone())),
                in_backend: None,
            });
        }
    }

    if violations.is_empty() {
        OracleResult::pass()
    } else {
        OracleResult::fail(violations)
    }
}

/// Every non-Lost lead sits in exactly one board column, Lost leads in
/// none, and the bucket sizes sum to `N - lost`.
#[must_use]
pub fn check_partition(store: &LeadStore) -> OracleResult {
    let board = project_board(store);
    let snapshot = store.snapshot();
    let mut violations = Vec::new();

    for lead in &snapshot {
        let holding = board
            .columns
            .iter()
            .filter(|column| column.leads.iter().any(|card| card.id == lead.id))
            .count();
        let expected = usize::from(lead.status.on_board());
        if holding != expected {
            violations.push(InvariantViolation::Partition {
                id: lead.id.clone(),
                status: lead.status,
                columns_holding: holding,
            });
        }
    }

    let lost = snapshot.iter().filter(|lead| lead.status == Status::Lost).count();
    if board.card_count() != snapshot.len() - lost {
        violations.push(InvariantViolation::CountMismatch {
            cards: board.card_count(),
            leads: snapshot.len(),
            lost,
        });
    }

    if violations.is_empty() {
        OracleResult::pass()
    } else {
        OracleResult::fail(violations)
    }
}

/// Run every invariant check and accumulate violations.
#[must_use]
pub fn check_all(store: &LeadStore, backend: &MemoryBackend) -> OracleResult {
    check_mirror(store, backend).merge(check_partition(store))
}
