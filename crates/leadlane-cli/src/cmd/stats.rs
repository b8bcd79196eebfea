//! `lane stats` — pipeline summary numbers.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use crate::demo::DemoEnv;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};
use crate::stats::compute;

#[derive(Args, Debug)]
pub struct StatsArgs {}

pub fn run_stats(_args: &StatsArgs, env: &DemoEnv, output: OutputMode) -> Result<()> {
    let client = env.connect()?;
    let stats = compute(&client.store.snapshot());

    render_mode(
        output,
        &stats,
        |stats, w| {
            writeln!(w, "total\t{}", stats.total)?;
            writeln!(w, "alta_prioridad\t{}", stats.high_priority)?;
            writeln!(w, "conversion\t{}", stats.conversion_rate)?;
            for share in &stats.by_vehicle {
                writeln!(w, "vehiculo\t{}\t{}", share.vehicle, share.count)?;
            }
            Ok(())
        },
        |stats, w| {
            pretty_section(w, "Resumen del pipeline")?;
            pretty_kv(w, "total", stats.total.to_string())?;
            pretty_kv(w, "alta prioridad", stats.high_priority.to_string())?;
            pretty_kv(w, "conversión", format!("{}%", stats.conversion_rate))?;
            writeln!(w)?;
            pretty_section(w, "Distribución por vehículo de interés")?;
            for share in &stats.by_vehicle {
                pretty_kv(w, &share.vehicle, share.count.to_string())?;
            }
            Ok(())
        },
    )
}
