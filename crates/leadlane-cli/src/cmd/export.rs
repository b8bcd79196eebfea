//! `lane export` — write the currently projected table to a CSV file.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use leadlane_core::export::{export_filename, render_csv};
use leadlane_core::view::{SortOrder, project_table};

use crate::demo::DemoEnv;
use crate::output::{OutputMode, render_mode};

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Free-text query over name, phone, and vehicle.
    #[arg(short, long, default_value = "")]
    pub query: String,

    /// Filter by status: all, nuevo, contactado, cerrado, perdido.
    #[arg(short, long, default_value = "all")]
    pub status: String,

    /// Filter by classification: all, pendiente, alta, media, baja.
    #[arg(short, long, default_value = "all")]
    pub classification: String,

    /// Output path. Defaults to `leads_<fecha>.csv` in the current
    /// directory.
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Serialize)]
struct ExportOut {
    path: PathBuf,
    rows: usize,
}

pub fn run_export(args: &ExportArgs, env: &DemoEnv, output: OutputMode) -> Result<()> {
    let client = env.connect()?;
    let filter = super::list::filter_from(&args.query, &args.status, &args.classification)?;
    let view = project_table(&client.store, &filter, SortOrder::CreatedDesc);

    let blob = render_csv(&view.leads);
    let path = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(export_filename(chrono::Utc::now().date_naive())));
    std::fs::write(&path, blob).with_context(|| format!("writing {}", path.display()))?;

    let out = ExportOut {
        path,
        rows: view.leads.len(),
    };
    render_mode(
        output,
        &out,
        |out, w| writeln!(w, "{}", out.path.display()),
        |out, w| writeln!(w, "{} lead(s) exportados a {}", out.rows, out.path.display()),
    )
}
