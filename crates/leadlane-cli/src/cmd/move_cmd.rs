//! `lane move` — change a lead's pipeline status (direct selection path).

use anyhow::Result;
use clap::Args;

use leadlane_core::transition::{TransitionController, TransitionOutcome};

use crate::demo::DemoEnv;
use crate::output::{OutputMode, render_success};

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Lead id (or unique prefix).
    pub id: String,

    /// Target status: nuevo, contactado, cerrado, perdido.
    pub status: String,
}

pub fn run_move(args: &MoveArgs, env: &DemoEnv, output: OutputMode) -> Result<()> {
    let mut client = env.connect()?;
    let lead = super::resolve_lead(&client.store, &args.id)?;
    let target = super::parse_status(&args.status)?;

    let policy = env.config.transitions.policy()?;
    let controller = TransitionController::new(policy);
    let outcome =
        controller.set_status(&mut client.store, env.services.leads.as_ref(), &lead.id, target)?;

    match outcome {
        TransitionOutcome::Applied { from, to } => {
            render_success(output, &format!("{}: {from} -> {to}", lead.id))
        }
        TransitionOutcome::Unchanged => {
            render_success(output, &format!("{} ya está en {target}", lead.id))
        }
    }
}
