//! `lane edit` — patch a lead's contact fields through the optimistic
//! apply/confirm-or-revert cycle.

use anyhow::{Result, bail};
use clap::Args;

use leadlane_core::model::LeadPatch;
use leadlane_core::remote::LeadBackend as _;

use crate::demo::DemoEnv;
use crate::output::{OutputMode, render_success};

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Lead id (or unique prefix).
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub vehicle: Option<String>,

    #[arg(long, conflicts_with = "clear_comment")]
    pub comment: Option<String>,

    /// Remove the comment.
    #[arg(long)]
    pub clear_comment: bool,
}

pub fn run_edit(args: &EditArgs, env: &DemoEnv, output: OutputMode) -> Result<()> {
    let mut client = env.connect()?;
    let lead = super::resolve_lead(&client.store, &args.id)?;

    let comment = if args.clear_comment {
        Some(None)
    } else {
        args.comment.clone().map(Some)
    };
    let patch = LeadPatch {
        name: args.name.clone(),
        phone: args.phone.clone(),
        vehicle_interest: args.vehicle.clone(),
        comment,
        status: None,
    };
    if patch.is_empty() {
        bail!("nada que cambiar: indica al menos un campo");
    }

    // Optimistic apply, then the remote write; the token settles the race.
    let token = client.store.apply_optimistic(&lead.id, &patch)?;
    match env.services.leads.update(&lead.id, &patch) {
        Ok(()) => {
            client.store.confirm(&lead.id, token);
            render_success(output, &format!("Lead {} actualizado", lead.id))
        }
        Err(err) => {
            client.store.revert(&lead.id, token);
            Err(leadlane_core::error::SyncError::from(err).into())
        }
    }
}
