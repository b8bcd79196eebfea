//! `lane list` — filtered, sorted lead table.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use leadlane_core::export::format_date_es;
use leadlane_core::model::Lead;
use leadlane_core::view::{SortOrder, TableFilter, project_table};

use crate::demo::DemoEnv;
use crate::output::{OutputMode, pretty_rule, render_mode};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Free-text query over name, phone, and vehicle.
    #[arg(short, long, default_value = "")]
    pub query: String,

    /// Filter by status: all, nuevo, contactado, cerrado, perdido.
    #[arg(short, long, default_value = "all")]
    pub status: String,

    /// Filter by classification: all, pendiente, alta, media, baja.
    #[arg(short, long, default_value = "all")]
    pub classification: String,

    /// Sort order: recientes (created desc), antiguos, nombre.
    #[arg(long, default_value = "recientes")]
    pub sort: String,

    /// Maximum rows to show.
    #[arg(short = 'n', long, default_value = "50")]
    pub limit: usize,
}

fn parse_sort(raw: &str) -> Result<SortOrder> {
    match raw.trim().to_lowercase().as_str() {
        "recientes" => Ok(SortOrder::CreatedDesc),
        "antiguos" => Ok(SortOrder::CreatedAsc),
        "nombre" => Ok(SortOrder::NameAsc),
        other => anyhow::bail!("orden desconocido '{other}' (recientes|antiguos|nombre)"),
    }
}

/// Build the filter from CLI flags; shared with `lane export`.
pub fn filter_from(query: &str, status: &str, classification: &str) -> Result<TableFilter> {
    Ok(TableFilter {
        query: query.to_string(),
        status: super::parse_status_filter(status)?,
        classification: super::parse_classification_filter(classification)?,
    })
}

pub fn run_list(args: &ListArgs, env: &DemoEnv, output: OutputMode) -> Result<()> {
    let client = env.connect()?;
    let filter = filter_from(&args.query, &args.status, &args.classification)?;
    let view = project_table(&client.store, &filter, parse_sort(&args.sort)?);
    let rows: Vec<Lead> = view.leads.into_iter().take(args.limit).collect();

    render_mode(
        output,
        &rows,
        |rows, w| {
            for lead in rows {
                writeln!(
                    w,
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    lead.id,
                    lead.name,
                    lead.phone,
                    lead.vehicle_interest,
                    lead.classification.map_or("Pendiente", |t| t.as_str()),
                    lead.status
                )?;
            }
            Ok(())
        },
        |rows, w| {
            if rows.is_empty() {
                writeln!(w, "No hay leads registrados.")?;
                return Ok(());
            }
            writeln!(
                w,
                "{:<8} {:<12} {:<22} {:<16} {:<12} {:<11} {}",
                "ID", "FECHA", "NOMBRE", "TELÉFONO", "VEHÍCULO", "CLASIF.", "ESTADO"
            )?;
            pretty_rule(w)?;
            for lead in rows {
                writeln!(
                    w,
                    "{:<8} {:<12} {:<22} {:<16} {:<12} {:<11} {}",
                    lead.id.as_str(),
                    format_date_es(lead.created_at.date_naive()),
                    truncate(&lead.name, 21),
                    truncate(&lead.phone, 15),
                    truncate(&lead.vehicle_interest, 11),
                    lead.classification.map_or("Pendiente", |t| t.as_str()),
                    lead.status
                )?;
            }
            writeln!(w, "{} lead(s)", rows.len())?;
            Ok(())
        },
    )
}

/// Clip a display string, appending an ellipsis when shortened.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let clipped: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{clipped}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_parsing() {
        assert_eq!(parse_sort("recientes").expect("parse"), SortOrder::CreatedDesc);
        assert_eq!(parse_sort("NOMBRE").expect("parse"), SortOrder::NameAsc);
        assert!(parse_sort("rank").is_err());
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate("María de los Ángeles", 8), "María d…");
        assert_eq!(truncate("Ana", 8), "Ana");
    }
}
