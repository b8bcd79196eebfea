//! `lane create` — submit a new lead.
//!
//! The record only materializes client-side once the remote confirms the
//! insert and returns the stored row; no locally invented id ever shows.

use std::io::Write;

use anyhow::{Context, Result, bail};
use clap::Args;

use leadlane_core::model::NewLead;
use leadlane_core::remote::{LeadBackend as _, VehicleCatalog as _};

use crate::demo::DemoEnv;
use crate::output::{OutputMode, pretty_kv, render_mode};

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Customer name.
    #[arg(long)]
    pub name: String,

    /// Contact phone.
    #[arg(long)]
    pub phone: String,

    /// Vehicle of interest; must exist in the catalog.
    #[arg(long)]
    pub vehicle: String,

    /// Optional free-text note.
    #[arg(long)]
    pub comment: Option<String>,
}

pub fn run_create(args: &CreateArgs, env: &DemoEnv, output: OutputMode) -> Result<()> {
    let draft = NewLead {
        name: args.name.clone(),
        phone: args.phone.clone(),
        vehicle_interest: args.vehicle.clone(),
        comment: args.comment.clone(),
    };
    draft.validate()?;

    // Soft referential check: creation must name a current catalog entry.
    let catalog = env.services.catalog.list().context("loading catalog")?;
    if !catalog.iter().any(|vehicle| vehicle.name == args.vehicle) {
        bail!(
            "'{}' no está en el catálogo de vehículos (usa `lane vehicles list`)",
            args.vehicle
        );
    }

    let lead = env.services.leads.insert(draft).context("creating lead")?;
    render_mode(
        output,
        &lead,
        |lead, w| writeln!(w, "{}", lead.id),
        |lead, w| {
            writeln!(w, "Lead creado")?;
            pretty_kv(w, "id", lead.id.as_str())?;
            pretty_kv(w, "nombre", &lead.name)?;
            pretty_kv(w, "estado", lead.status.as_str())?;
            Ok(())
        },
    )
}
