//! Command handlers for the `lane` binary, one module per subcommand.

pub mod auth;
pub mod board;
pub mod create;
pub mod delete;
pub mod edit;
pub mod export;
pub mod list;
pub mod move_cmd;
pub mod sim;
pub mod stats;
pub mod vehicles;

use anyhow::{Result, bail};

use leadlane_core::model::{Classification, Lead, Status};
use leadlane_core::store::LeadStore;
use leadlane_core::view::{ClassificationFilter, StatusFilter};

/// Parse a status argument, case-insensitively, by its wire name.
pub fn parse_status(raw: &str) -> Result<Status> {
    match raw.trim().to_lowercase().as_str() {
        "nuevo" => Ok(Status::New),
        "contactado" => Ok(Status::Contacted),
        "cerrado" => Ok(Status::Closed),
        "perdido" => Ok(Status::Lost),
        other => bail!("estado desconocido '{other}' (nuevo|contactado|cerrado|perdido)"),
    }
}

/// Parse the `--status` filter value (`all` or a status name).
pub fn parse_status_filter(raw: &str) -> Result<StatusFilter> {
    if raw.trim().eq_ignore_ascii_case("all") {
        return Ok(StatusFilter::All);
    }
    Ok(StatusFilter::Only(parse_status(raw)?))
}

/// Parse the `--classification` filter value (`all`, `pendiente`, or a
/// tier name — localized synonyms accepted).
pub fn parse_classification_filter(raw: &str) -> Result<ClassificationFilter> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("all") {
        return Ok(ClassificationFilter::All);
    }
    if trimmed.eq_ignore_ascii_case("pendiente") || trimmed.eq_ignore_ascii_case("pending") {
        return Ok(ClassificationFilter::Pending);
    }
    match Classification::parse_lenient(trimmed) {
        Some(tier) => Ok(ClassificationFilter::Only(tier)),
        None => bail!("clasificación desconocida '{trimmed}' (all|pendiente|alta|media|baja)"),
    }
}

/// Resolve a lead by exact id or unique id prefix against the store.
pub fn resolve_lead(store: &LeadStore, raw: &str) -> Result<Lead> {
    let snapshot = store.snapshot();
    if let Some(exact) = snapshot.iter().find(|lead| lead.id.as_str() == raw) {
        return Ok(exact.clone());
    }
    let matches: Vec<&Lead> = snapshot
        .iter()
        .filter(|lead| lead.id.as_str().starts_with(raw))
        .collect();
    match matches.as_slice() {
        [] => bail!("lead '{raw}' no existe"),
        [only] => Ok((*only).clone()),
        many => bail!(
            "id '{raw}' es ambiguo ({} coincidencias); usa un prefijo más largo",
            many.len()
        ),
    }
}
