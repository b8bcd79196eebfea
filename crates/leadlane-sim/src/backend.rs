//! Deterministic in-memory stand-in for the hosted backend.
//!
//! Implements all three service traits over one mutex-guarded state, with
//! a global commit sequence and broadcast delivery of raw change payloads
//! to every open subscription. Fault switches let scenarios script write
//! rejections, outages, duplicate deliveries, and subscription drops.
//! Per-id commit order is always preserved — that is the guarantee the
//! real store gives and the one the client's feed adapter builds on.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};

use chrono::{DateTime, Duration, TimeZone, Utc};
use tracing::debug;

use leadlane_core::feed::RawChange;
use leadlane_core::model::{Classification, Lead, LeadId, LeadPatch, NewLead, Status, Vehicle};
use leadlane_core::remote::{AuthService, LeadBackend, RemoteError, Session, VehicleCatalog};

use crate::rng::DeterministicRng;

// ---------------------------------------------------------------------------
// Faults
// ---------------------------------------------------------------------------

/// Fault switches consulted by every write and broadcast.
#[derive(Debug, Clone, Copy, Default)]
pub struct Faults {
    /// Every write fails with `Rejected`.
    pub reject_writes: bool,
    /// Every call fails with `Unavailable`.
    pub offline: bool,
    /// The next broadcast is delivered twice (same commit sequence).
    pub duplicate_next: bool,
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Inner {
    leads: BTreeMap<LeadId, Lead>,
    vehicles: BTreeMap<String, Vehicle>,
    users: BTreeMap<String, String>,
    session: Option<Session>,
    subscribers: Vec<Sender<RawChange>>,
    commit_seq: u64,
    next_lead: u64,
    next_vehicle: u64,
    faults: Faults,
}

/// In-memory remote store, vehicle catalog, and auth service in one.
#[derive(Debug)]
pub struct MemoryBackend {
    inner: Mutex<Inner>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Empty backend with the three catalog staples and a demo account.
    #[must_use]
    pub fn new() -> Self {
        let mut vehicles = BTreeMap::new();
        for (i, name) in ["Mustang", "Geely", "Rav4"].iter().enumerate() {
            let id = format!("veh-{:03}", i + 1);
            vehicles.insert(
                id.clone(),
                Vehicle {
                    id,
                    name: (*name).to_string(),
                },
            );
        }
        let mut users = BTreeMap::new();
        users.insert("demo@leadlane.mx".to_string(), "demo123".to_string());

        Self {
            inner: Mutex::new(Inner {
                leads: BTreeMap::new(),
                vehicles,
                users,
                session: None,
                subscribers: Vec::new(),
                commit_seq: 0,
                next_lead: 0,
                next_vehicle: 3,
                faults: Faults::default(),
            }),
        }
    }

    /// Backend pre-populated with `count` sample leads.
    #[must_use]
    pub fn seeded(count: usize, rng: &mut DeterministicRng) -> Self {
        let backend = Self::new();
        let names = [
            "María Torres",
            "Jorge Peña",
            "Lucía Fernández",
            "Carlos Medina",
            "Ana Sofía Ríos",
            "Pedro Aguilar",
            "Gabriela Núñez",
            "Raúl Castañeda",
        ];
        let vehicles = ["Mustang", "Geely", "Rav4"];
        let statuses = [Status::New, Status::New, Status::Contacted, Status::Closed, Status::Lost];
        let tiers = [
            None,
            None,
            Some(Classification::High),
            Some(Classification::Medium),
            Some(Classification::Low),
        ];

        for i in 0..count {
            let draft = NewLead {
                name: format!("{} {}", rng.pick(&names), i + 1),
                phone: format!("+52 55 {:04} {:04}", rng.next_bounded(10_000), rng.next_bounded(10_000)),
                vehicle_interest: (*rng.pick(&vehicles)).to_string(),
                comment: if rng.hit_rate_percent(30) {
                    Some("vio el anuncio en línea".to_string())
                } else {
                    None
                },
            };
            let lead = backend.insert(draft).expect("seed insert cannot fail");
            let status = *rng.pick(&statuses);
            if status != Status::New {
                backend
                    .update(&lead.id, &LeadPatch::status_only(status))
                    .expect("seed update cannot fail");
            }
            if let Some(tier) = *rng.pick(&tiers) {
                backend.classify(&lead.id, tier);
            }
        }
        backend
    }

    fn locked(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("backend state poisoned")
    }

    /// Flip fault switches for the next operations.
    pub fn set_faults(&self, faults: Faults) {
        self.locked().faults = faults;
    }

    /// Close every open subscription channel, simulating a dropped feed.
    pub fn drop_subscriptions(&self) {
        self.locked().subscribers.clear();
    }

    /// Number of rows currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locked().leads.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locked().leads.is_empty()
    }

    /// The external classification process: tiers a lead and commits the
    /// change like any other writer. Not part of the client-facing trait —
    /// the client never writes classifications.
    pub fn classify(&self, id: &LeadId, tier: Classification) {
        let mut inner = self.locked();
        if let Some(lead) = inner.leads.get_mut(id) {
            lead.classification = Some(tier);
            let row = lead.clone();
            Inner::broadcast(&mut inner, "UPDATE", Some(&row), None);
        }
    }

    /// Commit a malformed row straight onto the feed (for scenarios that
    /// exercise the client's rejection path). The stored state is not
    /// touched.
    pub fn emit_raw(&self, event_type: &str, new: Option<serde_json::Value>, old: Option<serde_json::Value>) {
        let mut inner = self.locked();
        inner.commit_seq += 1;
        let raw = RawChange {
            event_type: event_type.to_string(),
            new,
            old,
            commit_seq: inner.commit_seq,
        };
        inner.subscribers.retain(|tx| tx.send(raw.clone()).is_ok());
    }
}

impl Inner {
    fn check_faults(&self) -> Result<(), RemoteError> {
        if self.faults.offline {
            return Err(RemoteError::Unavailable {
                reason: "backend offline".to_string(),
            });
        }
        if self.faults.reject_writes {
            return Err(RemoteError::Rejected {
                reason: "escritura rechazada".to_string(),
            });
        }
        Ok(())
    }

    fn broadcast(inner: &mut Self, event_type: &str, new: Option<&Lead>, old: Option<&Lead>) {
        inner.commit_seq += 1;
        let raw = RawChange {
            event_type: event_type.to_string(),
            new: new.map(|lead| serde_json::to_value(lead).expect("lead serializes")),
            old: old.map(|lead| serde_json::to_value(lead).expect("lead serializes")),
            commit_seq: inner.commit_seq,
        };
        let duplicate = std::mem::take(&mut inner.faults.duplicate_next);
        inner.subscribers.retain(|tx| tx.send(raw.clone()).is_ok());
        if duplicate {
            debug!(seq = raw.commit_seq, "duplicating delivery");
            inner.subscribers.retain(|tx| tx.send(raw.clone()).is_ok());
        }
    }

    fn created_at_for(&self, seq: u64) -> DateTime<Utc> {
        // Deterministic clock: one minute per commit from a fixed epoch.
        let base = Utc
            .with_ymd_and_hms(2026, 1, 1, 9, 0, 0)
            .single()
            .expect("fixed epoch is valid");
        base + Duration::minutes(i64::try_from(seq).unwrap_or(i64::MAX))
    }
}

impl LeadBackend for MemoryBackend {
    fn insert(&self, draft: NewLead) -> Result<Lead, RemoteError> {
        let mut inner = self.locked();
        inner.check_faults()?;
        draft.validate().map_err(|err| RemoteError::Rejected {
            reason: err.to_string(),
        })?;

        inner.next_lead += 1;
        let id = LeadId::new(format!("ld-{:04}", inner.next_lead));
        let created_at = inner.created_at_for(inner.next_lead);
        let lead = Lead {
            id: id.clone(),
            name: draft.name,
            phone: draft.phone,
            vehicle_interest: draft.vehicle_interest,
            comment: draft.comment,
            status: Status::New,
            classification: None,
            created_at,
        };
        inner.leads.insert(id, lead.clone());
        Inner::broadcast(&mut inner, "INSERT", Some(&lead), None);
        Ok(lead)
    }

    fn update(&self, id: &LeadId, patch: &LeadPatch) -> Result<(), RemoteError> {
        let mut inner = self.locked();
        inner.check_faults()?;
        let Some(lead) = inner.leads.get_mut(id) else {
            return Err(RemoteError::Rejected {
                reason: format!("lead '{id}' no existe"),
            });
        };
        lead.apply_patch(patch);
        let row = lead.clone();
        Inner::broadcast(&mut inner, "UPDATE", Some(&row), None);
        Ok(())
    }

    fn delete(&self, id: &LeadId) -> Result<(), RemoteError> {
        let mut inner = self.locked();
        inner.check_faults()?;
        if let Some(old) = inner.leads.remove(id) {
            Inner::broadcast(&mut inner, "DELETE", None, Some(&old));
        }
        Ok(())
    }

    fn query_all(&self) -> Result<Vec<Lead>, RemoteError> {
        let inner = self.locked();
        if inner.faults.offline {
            return Err(RemoteError::Unavailable {
                reason: "backend offline".to_string(),
            });
        }
        let mut rows: Vec<Lead> = inner.leads.values().cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    fn subscribe(&self) -> Receiver<RawChange> {
        let (tx, rx) = mpsc::channel();
        self.locked().subscribers.push(tx);
        rx
    }
}

impl VehicleCatalog for MemoryBackend {
    fn list(&self) -> Result<Vec<Vehicle>, RemoteError> {
        let inner = self.locked();
        if inner.faults.offline {
            return Err(RemoteError::Unavailable {
                reason: "backend offline".to_string(),
            });
        }
        let mut rows: Vec<Vehicle> = inner.vehicles.values().cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    fn add(&self, name: &str) -> Result<Vehicle, RemoteError> {
        let mut inner = self.locked();
        inner.check_faults()?;
        leadlane_core::model::vehicle::validate_vehicle_name(name).map_err(|err| {
            RemoteError::Rejected {
                reason: err.to_string(),
            }
        })?;
        inner.next_vehicle += 1;
        let id = format!("veh-{:03}", inner.next_vehicle);
        let vehicle = Vehicle {
            id: id.clone(),
            name: name.trim().to_string(),
        };
        inner.vehicles.insert(id, vehicle.clone());
        Ok(vehicle)
    }

    fn remove(&self, id: &str) -> Result<(), RemoteError> {
        let mut inner = self.locked();
        inner.check_faults()?;
        inner.vehicles.remove(id);
        Ok(())
    }
}

impl AuthService for MemoryBackend {
    fn sign_in(&self, email: &str, password: &str) -> Result<Session, RemoteError> {
        let mut inner = self.locked();
        if inner.faults.offline {
            return Err(RemoteError::Unavailable {
                reason: "backend offline".to_string(),
            });
        }
        let stored = inner.users.get(email);
        if stored.is_none_or(|expected| expected != password) {
            return Err(RemoteError::Rejected {
                reason: "credenciales inválidas".to_string(),
            });
        }
        let session = Session {
            user_id: format!("usr-{}", email.len()),
            email: email.to_string(),
        };
        inner.session = Some(session.clone());
        Ok(session)
    }

    fn sign_up(&self, email: &str, password: &str) -> Result<(), RemoteError> {
        let mut inner = self.locked();
        if inner.faults.offline {
            return Err(RemoteError::Unavailable {
                reason: "backend offline".to_string(),
            });
        }
        if email.trim().is_empty() || password.is_empty() {
            return Err(RemoteError::Rejected {
                reason: "correo y contraseña son obligatorios".to_string(),
            });
        }
        if inner.users.contains_key(email) {
            return Err(RemoteError::Rejected {
                reason: "la cuenta ya existe".to_string(),
            });
        }
        inner.users.insert(email.to_string(), password.to_string());
        Ok(())
    }

    fn sign_out(&self) {
        self.locked().session = None;
    }

    fn session(&self) -> Option<Session> {
        self.locked().session.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
