//! `lane board` — the pipeline partitioned into its three columns.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use leadlane_core::model::Lead;
use leadlane_core::view::project_board;

use crate::demo::DemoEnv;
use crate::output::{OutputMode, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct BoardArgs {}

#[derive(Serialize)]
struct BoardOut {
    columns: Vec<ColumnOut>,
}

#[derive(Serialize)]
struct ColumnOut {
    status: String,
    count: usize,
    leads: Vec<Lead>,
}

pub fn run_board(_args: &BoardArgs, env: &DemoEnv, output: OutputMode) -> Result<()> {
    let client = env.connect()?;
    let board = project_board(&client.store);

    let out = BoardOut {
        columns: board
            .columns
            .iter()
            .map(|column| ColumnOut {
                status: column.status.to_string(),
                count: column.leads.len(),
                leads: column.leads.clone(),
            })
            .collect(),
    };

    render_mode(
        output,
        &out,
        |out, w| {
            for column in &out.columns {
                for lead in &column.leads {
                    writeln!(w, "{}\t{}\t{}", column.status, lead.id, lead.name)?;
                }
            }
            Ok(())
        },
        |out, w| {
            for column in &out.columns {
                pretty_section(w, &format!("{} ({})", column.status, column.count))?;
                if column.leads.is_empty() {
                    writeln!(w, "  Sin leads")?;
                } else {
                    for lead in &column.leads {
                        writeln!(
                            w,
                            "  {:<8} {:<22} {:<12} {}",
                            lead.id.as_str(),
                            super::list::truncate(&lead.name, 21),
                            super::list::truncate(&lead.vehicle_interest, 11),
                            lead.classification.map_or("Pendiente", |t| t.as_str()),
                        )?;
                    }
                }
                writeln!(w)?;
            }
            Ok(())
        },
    )
}
