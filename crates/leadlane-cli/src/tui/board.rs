//! Board tab: the pipeline as three status columns with keyboard drag.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

use leadlane_core::view::{BoardColumn, project_board};

use super::app::App;

pub fn render(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let board = project_board(&app.store);
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(34),
            Constraint::Percentage(33),
        ])
        .split(area);

    let held = app.controller.dragging().map(|(id, _)| id.clone());
    let hover = app.controller.hover();

    for (idx, column) in board.columns.iter().enumerate() {
        let is_active = idx == app.board_col;
        let is_hover = hover == Some(column.status);

        // Hover feedback is visual only; nothing moves until the drop.
        let border_style = if is_hover {
            Style::default().fg(Color::Yellow)
        } else if is_active {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(format!(" {} ({}) ", column.status, column.leads.len()));

        frame.render_widget(&block, chunks[idx]);
        let inner = block.inner(chunks[idx]);
        render_cards(frame, inner, app, column, is_active, held.as_ref());
    }
}

fn render_cards(
    frame: &mut Frame<'_>,
    area: Rect,
    app: &App,
    column: &BoardColumn,
    is_active: bool,
    held: Option<&leadlane_core::model::LeadId>,
) {
    if column.leads.is_empty() {
        frame.render_widget(
            List::new([ListItem::new(Line::styled(
                "Sin leads",
                Style::default().fg(Color::DarkGray),
            ))]),
            area,
        );
        return;
    }

    let items: Vec<ListItem<'_>> = column
        .leads
        .iter()
        .map(|lead| {
            let is_held = held == Some(&lead.id);
            let marker = if is_held { "⠿ " } else { "  " };
            let tier = lead
                .classification
                .map_or_else(|| "Pendiente".to_string(), |t| t.to_string());
            let style = if is_held {
                Style::default().add_modifier(Modifier::DIM)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::raw(marker.to_string()),
                Span::styled(lead.name.clone(), style.add_modifier(Modifier::BOLD)),
                Span::raw("  "),
                Span::styled(lead.vehicle_interest.clone(), style.fg(Color::Blue)),
                Span::raw("  "),
                Span::styled(tier, style.fg(Color::Magenta)),
            ]))
        })
        .collect();

    let list = List::new(items).highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    );

    let mut state = ListState::default();
    if is_active {
        state.select(Some(app.board_sel.min(column.leads.len() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}
