//! Scripted remote actors: other dashboard users and the external
//! classifier, all committing against the backend while the client under
//! test mirrors the feed.

use tracing::debug;

use leadlane_core::model::{Classification, LeadPatch, NewLead, Status};
use leadlane_core::remote::LeadBackend;

use crate::backend::MemoryBackend;
use crate::rng::DeterministicRng;

/// One operation an actor may perform in a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActorOp {
    MoveStatus,
    Classify,
    EditComment,
    Create,
    Delete,
}

/// Weighted op pool: moves and classifications dominate, deletes are rare.
const WEIGHTED: [ActorOp; 10] = [
    ActorOp::MoveStatus,
    ActorOp::MoveStatus,
    ActorOp::MoveStatus,
    ActorOp::MoveStatus,
    ActorOp::Classify,
    ActorOp::Classify,
    ActorOp::EditComment,
    ActorOp::EditComment,
    ActorOp::Create,
    ActorOp::Delete,
];

/// A pool of scripted concurrent writers driven by one deterministic RNG.
#[derive(Debug)]
pub struct ActorPool {
    rng: DeterministicRng,
    created: u64,
}

impl ActorPool {
    #[must_use]
    pub const fn new(rng: DeterministicRng) -> Self {
        Self { rng, created: 0 }
    }

    /// Run `ops` random operations against the backend. Returns how many
    /// actually committed (an op against an empty store may be skipped).
    pub fn run_round(&mut self, backend: &MemoryBackend, ops: usize) -> usize {
        let mut committed = 0;
        for _ in 0..ops {
            if self.run_one(backend) {
                committed += 1;
            }
        }
        committed
    }

    fn run_one(&mut self, backend: &MemoryBackend) -> bool {
        let op = if backend.is_empty() {
            ActorOp::Create
        } else {
            *self.rng.pick(&WEIGHTED)
        };
        debug!(?op, "actor op");
        match op {
            ActorOp::MoveStatus => self.move_status(backend),
            ActorOp::Classify => self.classify(backend),
            ActorOp::EditComment => self.edit_comment(backend),
            ActorOp::Create => self.create(backend),
            ActorOp::Delete => self.delete(backend),
        }
    }

    fn pick_lead(&mut self, backend: &MemoryBackend) -> Option<leadlane_core::model::Lead> {
        let rows = backend.query_all().ok()?;
        if rows.is_empty() {
            return None;
        }
        Some(self.rng.pick(&rows).clone())
    }

    fn move_status(&mut self, backend: &MemoryBackend) -> bool {
        let Some(lead) = self.pick_lead(backend) else {
            return false;
        };
        let target = *self.rng.pick(&Status::ALL);
        if target == lead.status {
            return false;
        }
        backend
            .update(&lead.id, &LeadPatch::status_only(target))
            .is_ok()
    }

    fn classify(&mut self, backend: &MemoryBackend) -> bool {
        let Some(lead) = self.pick_lead(backend) else {
            return false;
        };
        let tier = *self.rng.pick(&[
            Classification::High,
            Classification::Medium,
            Classification::Low,
        ]);
        backend.classify(&lead.id, tier);
        true
    }

    fn edit_comment(&mut self, backend: &MemoryBackend) -> bool {
        let Some(lead) = self.pick_lead(backend) else {
            return false;
        };
        let note = format!("seguimiento #{}", self.rng.next_bounded(1000));
        let patch = LeadPatch {
            comment: Some(Some(note)),
            ..LeadPatch::default()
        };
        backend.update(&lead.id, &patch).is_ok()
    }

    fn create(&mut self, backend: &MemoryBackend) -> bool {
        self.created += 1;
        let draft = NewLead {
            name: format!("Prospecto {}", self.created),
            phone: format!("55{:08}", self.rng.next_bounded(100_000_000)),
            vehicle_interest: (*self.rng.pick(&["Mustang", "Geely", "Rav4"])).to_string(),
            comment: None,
        };
        backend.insert(draft).is_ok()
    }

    fn delete(&mut self, backend: &MemoryBackend) -> bool {
        let Some(lead) = self.pick_lead(backend) else {
            return false;
        };
        backend.delete(&lead.id).is_ok()
    }
}
