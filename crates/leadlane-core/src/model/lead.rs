//! Lead record types: id, pipeline status, classification tier, and the
//! field aggregate synced with the remote collection.
//!
//! Wire field names and enum strings match the hosted backend's columns
//! (`nombre`, `telefono`, `estado = "Nuevo" | "Contactado" | "Cerrado" |
//! "Perdido"`, ...), so a record round-trips byte-compatible with what the
//! subscription delivers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

// ---------------------------------------------------------------------------
// LeadId
// ---------------------------------------------------------------------------

/// Opaque unique lead identifier, assigned by the remote store at creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadId(String);

impl LeadId {
    /// Wrap an id string received from the remote store.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LeadId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// The four pipeline stages of a lead.
///
/// Only the first three appear as board columns; `Lost` is reachable via
/// direct selection only and is invisible in board mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    New,
    Contacted,
    Closed,
    Lost,
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status '{raw}': expected one of Nuevo, Contactado, Cerrado, Perdido")]
pub struct UnknownStatus {
    /// The unrecognised input string.
    pub raw: String,
}

impl Status {
    /// All statuses in pipeline order.
    pub const ALL: [Self; 4] = [Self::New, Self::Contacted, Self::Closed, Self::Lost];

    /// The three statuses that materialize as board columns.
    pub const BOARD: [Self; 3] = [Self::New, Self::Contacted, Self::Closed];

    /// The backend's canonical string for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "Nuevo",
            Self::Contacted => "Contactado",
            Self::Closed => "Cerrado",
            Self::Lost => "Perdido",
        }
    }

    /// Whether this status owns a column in board mode.
    #[must_use]
    pub const fn on_board(self) -> bool {
        !matches!(self, Self::Lost)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Nuevo" => Ok(Self::New),
            "Contactado" => Ok(Self::Contacted),
            "Cerrado" => Ok(Self::Closed),
            "Perdido" => Ok(Self::Lost),
            _ => Err(UnknownStatus { raw: s.to_string() }),
        }
    }
}

// Custom serde: the wire value is the backend's Spanish string. Unknown
// values must fail loudly here so the feed adapter can reject the record.
impl Serialize for Status {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Externally assigned priority tier. Never written by this client; parsed
/// leniently because the classifier emits gendered Spanish variants
/// (`alto`/`alta`) and older rows carry English names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    High,
    Medium,
    Low,
}

impl Classification {
    /// Canonical display string (what the backend's classifier writes today).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "Alta",
            Self::Medium => "Media",
            Self::Low => "Baja",
        }
    }

    /// Lenient, case-insensitive parse accepting localized synonyms.
    ///
    /// Returns `None` for empty or unrecognized tiers — those render as
    /// "Pendiente" and filter as pending.
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "alta" | "alto" | "high" => Some(Self::High),
            "media" | "medio" | "medium" => Some(Self::Medium),
            "baja" | "bajo" | "low" => Some(Self::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Classification {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Classification {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse_lenient(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown classification '{s}'")))
    }
}

/// Deserialize the `clasificacion` column: null, empty, and unrecognized
/// tiers all collapse to pending rather than rejecting the record.
fn de_classification<'de, D>(deserializer: D) -> Result<Option<Classification>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Classification::parse_lenient))
}

// ---------------------------------------------------------------------------
// Lead
// ---------------------------------------------------------------------------

/// A confirmed lead record as the remote store sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "telefono")]
    pub phone: String,
    #[serde(rename = "vehiculo_interes")]
    pub vehicle_interest: String,
    #[serde(rename = "comentario", default)]
    pub comment: Option<String>,
    #[serde(rename = "estado")]
    pub status: Status,
    #[serde(rename = "clasificacion", default, deserialize_with = "de_classification")]
    pub classification: Option<Classification>,
    pub created_at: DateTime<Utc>,
}

impl Lead {
    /// Digits-only derivation of the phone number, used for the messaging
    /// deep link. Empty when the phone field carries no digits.
    #[must_use]
    pub fn phone_digits(&self) -> String {
        self.phone.chars().filter(char::is_ascii_digit).collect()
    }

    /// Apply a partial field change in place. `None` fields are untouched.
    pub fn apply_patch(&mut self, patch: &LeadPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(phone) = &patch.phone {
            self.phone.clone_from(phone);
        }
        if let Some(vehicle) = &patch.vehicle_interest {
            self.vehicle_interest.clone_from(vehicle);
        }
        if let Some(comment) = &patch.comment {
            self.comment.clone_from(comment);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}

/// Fields for a lead not yet accepted by the remote store. The store
/// assigns `id`, `created_at`, and leaves classification pending; new
/// leads always enter the pipeline as [`Status::New`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLead {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "telefono")]
    pub phone: String,
    #[serde(rename = "vehiculo_interes")]
    pub vehicle_interest: String,
    #[serde(rename = "comentario", default)]
    pub comment: Option<String>,
}

/// Error for a submission missing a required field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("required field '{field}' is empty")]
pub struct EmptyField {
    pub field: &'static str,
}

impl NewLead {
    /// Validate the required fields the create form enforces.
    ///
    /// # Errors
    ///
    /// Returns the first required field that is empty or whitespace.
    pub fn validate(&self) -> Result<(), EmptyField> {
        if self.name.trim().is_empty() {
            return Err(EmptyField { field: "nombre" });
        }
        if self.phone.trim().is_empty() {
            return Err(EmptyField { field: "telefono" });
        }
        if self.vehicle_interest.trim().is_empty() {
            return Err(EmptyField {
                field: "vehiculo_interes",
            });
        }
        Ok(())
    }
}

/// A partial field change; `None` means "leave unchanged".
///
/// `comment: Some(None)` clears the comment, mirroring the backend's
/// nullable column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadPatch {
    #[serde(rename = "nombre", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "telefono", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "vehiculo_interes", skip_serializing_if = "Option::is_none")]
    pub vehicle_interest: Option<String>,
    #[serde(rename = "comentario", skip_serializing_if = "Option::is_none")]
    pub comment: Option<Option<String>>,
    #[serde(rename = "estado", skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl LeadPatch {
    /// A patch that changes only the pipeline status.
    #[must_use]
    pub fn status_only(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// True when the patch would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.vehicle_interest.is_none()
            && self.comment.is_none()
            && self.status.is_none()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn lead(id: &str) -> Lead {
        Lead {
            id: LeadId::from(id),
            name: "María Torres".to_string(),
            phone: "+52 55 1234 5678".to_string(),
            vehicle_interest: "Rav4".to_string(),
            comment: None,
            status: Status::New,
            classification: None,
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().expect("valid ts"),
        }
    }

    #[test]
    fn status_display_fromstr_roundtrip() {
        for status in Status::ALL {
            let parsed: Status = status.as_str().parse().expect("should parse");
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn status_rejects_unknown() {
        let err = "Archivado".parse::<Status>().unwrap_err();
        assert_eq!(err.raw, "Archivado");
        assert!(err.to_string().contains("Perdido"));
    }

    #[test]
    fn status_serde_uses_wire_strings() {
        let json = serde_json::to_string(&Status::Contacted).expect("serialize");
        assert_eq!(json, "\"Contactado\"");
        let back: Status = serde_json::from_str("\"Perdido\"").expect("deserialize");
        assert_eq!(back, Status::Lost);
        assert!(serde_json::from_str::<Status>("\"nuevo\"").is_err());
    }

    #[test]
    fn lost_is_off_board() {
        assert!(!Status::Lost.on_board());
        for status in Status::BOARD {
            assert!(status.on_board());
        }
    }

    #[test]
    fn classification_accepts_localized_synonyms() {
        for raw in ["Alta", "alto", "ALTA", "high"] {
            assert_eq!(Classification::parse_lenient(raw), Some(Classification::High));
        }
        for raw in ["media", "Medio", "medium"] {
            assert_eq!(Classification::parse_lenient(raw), Some(Classification::Medium));
        }
        for raw in ["baja", "BAJO", "low"] {
            assert_eq!(Classification::parse_lenient(raw), Some(Classification::Low));
        }
        assert_eq!(Classification::parse_lenient(""), None);
        assert_eq!(Classification::parse_lenient("urgente"), None);
    }

    #[test]
    fn lead_wire_field_names() {
        let json = serde_json::to_value(lead("ld-1")).expect("serialize");
        assert_eq!(json["nombre"], "María Torres");
        assert_eq!(json["telefono"], "+52 55 1234 5678");
        assert_eq!(json["vehiculo_interes"], "Rav4");
        assert_eq!(json["estado"], "Nuevo");
        assert!(json["clasificacion"].is_null());
    }

    #[test]
    fn lead_deserializes_unknown_classification_as_pending() {
        let json = serde_json::json!({
            "id": "ld-9",
            "nombre": "Ana",
            "telefono": "555",
            "vehiculo_interes": "Geely",
            "comentario": null,
            "estado": "Contactado",
            "clasificacion": "urgentísima",
            "created_at": "2026-03-01T12:00:00Z",
        });
        let parsed: Lead = serde_json::from_value(json).expect("deserialize");
        assert_eq!(parsed.classification, None);
    }

    #[test]
    fn phone_digits_strips_formatting() {
        let mut record = lead("ld-2");
        record.phone = "+52 (55) 1234-5678".to_string();
        assert_eq!(record.phone_digits(), "525512345678");
        record.phone = "sin teléfono".to_string();
        assert_eq!(record.phone_digits(), "");
    }

    #[test]
    fn patch_applies_only_set_fields() {
        let mut record = lead("ld-3");
        record.comment = Some("llamar martes".to_string());
        let patch = LeadPatch {
            phone: Some("5544332211".to_string()),
            comment: Some(None),
            status: Some(Status::Contacted),
            ..LeadPatch::default()
        };
        record.apply_patch(&patch);
        assert_eq!(record.phone, "5544332211");
        assert_eq!(record.comment, None);
        assert_eq!(record.status, Status::Contacted);
        assert_eq!(record.name, "María Torres");
    }

    #[test]
    fn new_lead_validation_requires_core_fields() {
        let draft = NewLead {
            name: "  ".to_string(),
            phone: "555".to_string(),
            vehicle_interest: "Mustang".to_string(),
            comment: None,
        };
        assert_eq!(draft.validate().unwrap_err().field, "nombre");

        let ok = NewLead {
            name: "Luis".to_string(),
            phone: "555".to_string(),
            vehicle_interest: "Mustang".to_string(),
            comment: Some("vio el anuncio".to_string()),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn patch_wire_shape_omits_unset_fields() {
        let patch = LeadPatch::status_only(Status::Closed);
        let json = serde_json::to_value(&patch).expect("serialize");
        assert_eq!(json, serde_json::json!({ "estado": "Cerrado" }));
    }
}
