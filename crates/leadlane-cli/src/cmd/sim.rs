//! `lane sim` — run a deterministic convergence campaign and report the
//! oracle verdict.

use std::io::Write;

use anyhow::{Result, bail};
use clap::Args;
use serde::Serialize;

use leadlane_core::feed::ChangeFeed;
use leadlane_core::remote::LeadBackend;
use leadlane_core::store::LeadStore;
use leadlane_sim::{ActorPool, DeterministicRng, Faults, MemoryBackend, check_all};

use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct SimArgs {
    /// Actor rounds to run.
    #[arg(long, default_value = "40")]
    pub rounds: u32,

    /// Operations per round.
    #[arg(long, default_value = "5")]
    pub ops: usize,
}

#[derive(Serialize)]
struct SimReport {
    seed: u64,
    rounds: u32,
    committed: usize,
    final_leads: usize,
    applied_events: usize,
    passed: bool,
}

/// The campaign seed comes from the global `--seed` flag; identical seeds
/// replay identical campaigns.
pub fn run_sim(args: &SimArgs, seed: u64, output: OutputMode) -> Result<()> {
    let mut rng = DeterministicRng::new(seed);
    let backend = MemoryBackend::seeded(8, &mut rng);
    let mut feed = ChangeFeed::new(backend.subscribe());
    let mut store = LeadStore::new();
    let rows = backend
        .query_all()
        .map_err(leadlane_core::error::SyncError::from)?;
    store.load_snapshot(rows);

    let mut pool = ActorPool::new(DeterministicRng::new(seed ^ 0x5151));
    let mut committed = 0;
    let mut applied = 0;
    for round in 0..args.rounds {
        if round % 9 == 0 {
            backend.set_faults(Faults {
                duplicate_next: true,
                ..Faults::default()
            });
        }
        committed += pool.run_round(&backend, args.ops);
        applied += feed.pump(&mut store).applied;
    }
    applied += feed.pump(&mut store).applied;

    let verdict = check_all(&store, &backend);
    let report = SimReport {
        seed,
        rounds: args.rounds,
        committed,
        final_leads: store.snapshot().len(),
        applied_events: applied,
        passed: verdict.passed,
    };

    render_mode(
        output,
        &report,
        |report, w| {
            writeln!(
                w,
                "seed={} rounds={} committed={} applied={} leads={} passed={}",
                report.seed,
                report.rounds,
                report.committed,
                report.applied_events,
                report.final_leads,
                report.passed
            )
        },
        |report, w| {
            pretty_section(w, "Campaña de simulación")?;
            pretty_kv(w, "seed", report.seed.to_string())?;
            pretty_kv(w, "rondas", report.rounds.to_string())?;
            pretty_kv(w, "commits", report.committed.to_string())?;
            pretty_kv(w, "eventos", report.applied_events.to_string())?;
            pretty_kv(w, "leads", report.final_leads.to_string())?;
            pretty_kv(w, "verdicto", if report.passed { "OK" } else { "DIVERGENCIA" })?;
            Ok(())
        },
    )?;

    if !verdict.passed {
        bail!("la simulación divergió: {:?}", verdict.violations);
    }
    Ok(())
}
