//! `lane delete` — optimistic removal with remote reconciliation.

use anyhow::Result;
use clap::Args;

use leadlane_core::remote::LeadBackend as _;

use crate::demo::DemoEnv;
use crate::output::{OutputMode, render_success};

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Lead id (or unique prefix).
    pub id: String,
}

pub fn run_delete(args: &DeleteArgs, env: &DemoEnv, output: OutputMode) -> Result<()> {
    let mut client = env.connect()?;
    let lead = super::resolve_lead(&client.store, &args.id)?;

    // The row disappears immediately; the remote verdict settles it.
    client.store.mark_pending_delete(&lead.id)?;
    match env.services.leads.delete(&lead.id) {
        Ok(()) => {
            client.store.confirm_delete(&lead.id);
            render_success(output, &format!("Lead {} eliminado", lead.id))
        }
        Err(err) => {
            client.store.revert_delete(&lead.id);
            Err(leadlane_core::error::SyncError::from(err).into())
        }
    }
}
