//! Change feed adapter: normalizes the remote subscription's raw payloads
//! into typed change events and enforces per-lead delivery order.
//!
//! The subscription is a producer queue (`mpsc`) consumed on the store's
//! single mutation path. The adapter performs no backfill — the snapshot
//! fetch is a separate explicit step — and does not reconnect by itself;
//! re-establishing a snapshot after a drop is an externally triggered
//! recovery action because replay order across a dropped connection is not
//! guaranteed by the remote store.

use std::collections::HashMap;
use std::sync::mpsc::{Receiver, TryRecvError};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::SyncError;
use crate::model::{Lead, LeadId};
use crate::store::LeadStore;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// The three kinds of change the remote store commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl ChangeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

/// A normalized change event, ready for the store's merge path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub lead: Lead,
    /// Server commit sequence for this collection; strictly increasing per
    /// lead id.
    pub commit_seq: u64,
}

/// Raw subscription payload as delivered on the wire: an event type tag
/// plus the new and/or old row images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawChange {
    #[serde(rename = "eventType")]
    pub event_type: String,
    #[serde(default)]
    pub new: Option<serde_json::Value>,
    #[serde(default)]
    pub old: Option<serde_json::Value>,
    pub commit_seq: u64,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Why a raw payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    #[error("unknown event type '{raw}'")]
    UnknownEventType { raw: String },
    #[error("{kind} event carries no row image")]
    MissingRecord { kind: &'static str },
    #[error("undecodable lead record: {detail}")]
    BadRecord { detail: String },
}

impl From<FeedError> for SyncError {
    fn from(err: FeedError) -> Self {
        Self::MalformedRemoteEvent {
            detail: err.to_string(),
        }
    }
}

/// Normalize one raw payload into a typed [`ChangeEvent`].
///
/// Delete payloads carry the row in `old`; inserts and updates in `new`.
/// A record with an unrecognized status fails here and is excluded rather
/// than silently accepted.
///
/// # Errors
///
/// Returns [`FeedError`] for an unknown event type, a payload without a
/// row image, or a row that does not decode as a lead.
pub fn normalize(raw: &RawChange) -> Result<ChangeEvent, FeedError> {
    let kind = match raw.event_type.as_str() {
        "INSERT" => ChangeKind::Insert,
        "UPDATE" => ChangeKind::Update,
        "DELETE" => ChangeKind::Delete,
        other => {
            return Err(FeedError::UnknownEventType {
                raw: other.to_string(),
            });
        }
    };

    let value = match kind {
        ChangeKind::Insert | ChangeKind::Update => raw.new.as_ref(),
        ChangeKind::Delete => raw.old.as_ref().or(raw.new.as_ref()),
    }
    .ok_or(FeedError::MissingRecord {
        kind: kind.as_str(),
    })?;

    let lead: Lead = serde_json::from_value(value.clone()).map_err(|err| FeedError::BadRecord {
        detail: err.to_string(),
    })?;

    Ok(ChangeEvent {
        kind,
        lead,
        commit_seq: raw.commit_seq,
    })
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

/// Result of polling the feed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedPoll {
    /// A normalized event ready to merge.
    Event(ChangeEvent),
    /// Nothing queued right now.
    Empty,
    /// The subscription is gone; the caller decides when to recover.
    Disconnected,
}

/// Counters for one pump pass over the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpStats {
    pub applied: usize,
    pub dropped: usize,
    pub disconnected: bool,
}

/// Wraps a subscription receiver; yields events in delivery order and
/// enforces that per-id commit sequences only move forward.
#[derive(Debug)]
pub struct ChangeFeed {
    rx: Receiver<RawChange>,
    last_seq: HashMap<LeadId, u64>,
    disconnected: bool,
}

impl ChangeFeed {
    #[must_use]
    pub fn new(rx: Receiver<RawChange>) -> Self {
        Self {
            rx,
            last_seq: HashMap::new(),
            disconnected: false,
        }
    }

    /// Whether a disconnection signal has been observed.
    #[must_use]
    pub const fn is_disconnected(&self) -> bool {
        self.disconnected
    }

    /// Pull the next deliverable event. Malformed payloads and stale
    /// duplicates are dropped with a diagnostic and polling continues —
    /// a bad event never stalls the pipeline.
    pub fn poll(&mut self) -> FeedPoll {
        if self.disconnected {
            return FeedPoll::Disconnected;
        }
        loop {
            let raw = match self.rx.try_recv() {
                Ok(raw) => raw,
                Err(TryRecvError::Empty) => return FeedPoll::Empty,
                Err(TryRecvError::Disconnected) => {
                    self.disconnected = true;
                    return FeedPoll::Disconnected;
                }
            };

            let event = match normalize(&raw) {
                Ok(event) => event,
                Err(err) => {
                    warn!(error = %err, event_type = %raw.event_type, "dropping malformed feed event");
                    continue;
                }
            };

            let last = self.last_seq.get(&event.lead.id).copied();
            if last.is_some_and(|seen| event.commit_seq <= seen) {
                warn!(
                    id = %event.lead.id,
                    seq = event.commit_seq,
                    last = last.unwrap_or_default(),
                    "dropping out-of-order feed event"
                );
                continue;
            }
            self.last_seq.insert(event.lead.id.clone(), event.commit_seq);
            return FeedPoll::Event(event);
        }
    }

    /// Drain every ready event into the store's merge path.
    pub fn pump(&mut self, store: &mut LeadStore) -> PumpStats {
        let mut stats = PumpStats::default();
        loop {
            match self.poll() {
                FeedPoll::Event(event) => {
                    debug!(kind = event.kind.as_str(), id = %event.lead.id, "merging feed event");
                    store.apply_remote_event(&event);
                    stats.applied += 1;
                }
                FeedPoll::Empty => return stats,
                FeedPoll::Disconnected => {
                    stats.disconnected = true;
                    return stats;
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
