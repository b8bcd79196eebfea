//! Table tab: filterable lead list, plus the shared header and status
//! line.

use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, TableState};

use leadlane_core::export::format_date_es;
use leadlane_core::view::{ClassificationFilter, StatusFilter};

use crate::stats::compute;

use super::app::{App, Overlay, Tab};

/// Header: title, pipeline stats, and the active filters.
pub fn render_header(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let snapshot = app.store.snapshot();
    let stats = compute(&snapshot);

    let tab_label = match app.tab {
        Tab::Table => "[Tabla] Tablero",
        Tab::Board => "Tabla [Tablero]",
    };
    let title = Line::from(vec![
        Span::styled(
            "leadlane",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  panel de leads   "),
        Span::styled(tab_label, Style::default().fg(Color::DarkGray)),
    ]);

    let stats_line = Line::from(vec![
        Span::raw(format!("Total {}", stats.total)),
        Span::raw(" · "),
        Span::styled(
            format!("Alta prioridad {}", stats.high_priority),
            Style::default().fg(Color::Green),
        ),
        Span::raw(" · "),
        Span::raw(format!("Conversión {}%", stats.conversion_rate)),
    ]);

    let status = match app.filter.status {
        StatusFilter::All => "todos".to_string(),
        StatusFilter::Only(status) => status.to_string(),
    };
    let classification = match app.filter.classification {
        ClassificationFilter::All => "todas".to_string(),
        ClassificationFilter::Pending => "Pendiente".to_string(),
        ClassificationFilter::Only(tier) => tier.to_string(),
    };
    let filter_line = Line::styled(
        format!(
            "filtro  texto:'{}'  estado:{status}  clasif:{classification}",
            app.filter.query
        ),
        Style::default().fg(Color::DarkGray),
    );

    frame.render_widget(
        Paragraph::new(vec![title, stats_line, filter_line])
            .block(Block::default().borders(Borders::BOTTOM)),
        area,
    );
}

/// The lead table itself.
pub fn render(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let view = app.table_view();

    if view.leads.is_empty() {
        let message = if app.filter.is_empty() {
            "No hay leads registrados. ¡Crea el primero con 'n'!"
        } else {
            "Ningún lead coincide con el filtro."
        };
        frame.render_widget(
            Paragraph::new(message).style(Style::default().fg(Color::DarkGray)),
            area,
        );
        return;
    }

    let header = Row::new(["Fecha", "Nombre", "Teléfono", "Vehículo", "Clasif.", "Estado"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row<'_>> = view
        .leads
        .iter()
        .map(|lead| {
            Row::new([
                format_date_es(lead.created_at.date_naive()),
                lead.name.clone(),
                lead.phone.clone(),
                lead.vehicle_interest.clone(),
                lead.classification
                    .map_or_else(|| "Pendiente".to_string(), |tier| tier.to_string()),
                lead.status.to_string(),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Min(18),
            Constraint::Length(17),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(11),
        ],
    )
    .header(header)
    .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

    let mut state = TableState::default();
    state.select(Some(app.table_sel.min(view.leads.len() - 1)));
    frame.render_stateful_widget(table, area, &mut state);
}

/// Bottom line: search input, transient notice, or key hints.
pub fn render_status_line(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let line = match &app.overlay {
        Overlay::Search(buffer) => Line::from(vec![
            Span::styled("/", Style::default().fg(Color::Yellow)),
            Span::raw(buffer.clone()),
            Span::raw("▏"),
        ]),
        _ => {
            if let Some(notice) = &app.notice {
                Line::styled(notice.clone(), Style::default().fg(Color::Yellow))
            } else {
                let hints = match app.tab {
                    Tab::Table => {
                        "j/k mover · / buscar · s estado · c clasif · n nuevo · e editar · d borrar · 1-4 estado · x exportar · w whatsapp · Tab tablero · q salir"
                    }
                    Tab::Board => {
                        "h/l columna · j/k tarjeta · espacio tomar/soltar · Esc cancelar · Tab tabla · q salir"
                    }
                };
                Line::styled(hints, Style::default().fg(Color::DarkGray))
            }
        }
    };
    frame.render_widget(Paragraph::new(line), area);
}
