//! Dashboard application state and key dispatch.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};

use leadlane_core::error::SyncError;
use leadlane_core::export::{export_filename, render_csv};
use leadlane_core::feed::ChangeFeed;
use leadlane_core::link::whatsapp_link;
use leadlane_core::model::{Classification, Lead, Status};
use leadlane_core::remote::{AuthService as _, LeadBackend as _, Services};
use leadlane_core::store::LeadStore;
use leadlane_core::transition::{DropOutcome, TransitionController, TransitionOutcome};
use leadlane_core::view::{
    ClassificationFilter, SortOrder, StatusFilter, TableFilter, TableView, project_board,
    project_table,
};

use crate::demo::DemoEnv;

use super::dialog::{FormAction, LeadForm};
use super::login::LoginForm;
use super::{board, dialog, login, table};

/// Which top-level screen is active.
pub enum Screen {
    Login(LoginForm),
    Dashboard,
}

/// Dashboard tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Table,
    Board,
}

/// Modal state layered over the dashboard.
pub enum Overlay {
    None,
    /// Slash-search input buffer.
    Search(String),
    /// Create or edit form.
    Form(LeadForm),
}

pub struct App {
    pub services: Services,
    pub store: LeadStore,
    pub feed: ChangeFeed,
    pub controller: TransitionController,
    pub screen: Screen,
    pub tab: Tab,
    pub overlay: Overlay,
    pub filter: TableFilter,
    pub table_sel: usize,
    pub board_col: usize,
    pub board_sel: usize,
    /// Transient status-line message (errors, export paths, links).
    pub notice: Option<String>,
    pub disconnected: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(env: &DemoEnv) -> Result<Self> {
        let client = env.connect()?;
        let policy = env.config.transitions.policy()?;
        let screen = if env.services.auth.session().is_some() {
            Screen::Dashboard
        } else {
            Screen::Login(LoginForm::default())
        };
        Ok(Self {
            services: env.services.clone(),
            store: client.store,
            feed: client.feed,
            controller: TransitionController::new(policy),
            screen,
            tab: Tab::Table,
            overlay: Overlay::None,
            filter: TableFilter::default(),
            table_sel: 0,
            board_col: 0,
            board_sel: 0,
            notice: None,
            disconnected: false,
            should_quit: false,
        })
    }

    /// Drain the change feed into the store; note a dropped subscription
    /// once without spamming the status line.
    pub fn drain_feed(&mut self) {
        let stats = self.feed.pump(&mut self.store);
        if stats.disconnected && !self.disconnected {
            self.disconnected = true;
            self.notice =
                Some("Sin conexión con el feed; mostrando datos locales. 'r' para reconectar".to_string());
        }
    }

    /// The table projection the table tab is currently showing.
    #[must_use]
    pub fn table_view(&self) -> TableView {
        project_table(&self.store, &self.filter, SortOrder::CreatedDesc)
    }

    fn report(&mut self, result: Result<String, SyncError>) {
        match result {
            Ok(message) => self.notice = Some(message),
            Err(err) => {
                let hint = err.hint().map(|h| format!(" — {h}")).unwrap_or_default();
                self.notice = Some(format!("[{}] {err}{hint}", err.code()));
            }
        }
    }

    // -- rendering ----------------------------------------------------------

    pub fn render(&mut self, frame: &mut Frame<'_>) {
        match &self.screen {
            Screen::Login(form) => login::render(frame, form),
            Screen::Dashboard => self.render_dashboard(frame),
        }
    }

    fn render_dashboard(&mut self, frame: &mut Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(frame.area());

        table::render_header(frame, chunks[0], self);
        match self.tab {
            Tab::Table => table::render(frame, chunks[1], self),
            Tab::Board => board::render(frame, chunks[1], self),
        }
        table::render_status_line(frame, chunks[2], self);

        if let Overlay::Form(form) = &self.overlay {
            dialog::render(frame, form);
        }
    }

    // -- key dispatch -------------------------------------------------------

    pub fn handle_key(&mut self, key: KeyEvent) {
        match &mut self.screen {
            Screen::Login(form) => {
                match login::handle_key(form, key, self.services.auth.as_ref()) {
                    login::LoginAction::None => {}
                    login::LoginAction::SignedIn(session) => {
                        self.notice = Some(format!("Bienvenido, {}", session.email));
                        self.screen = Screen::Dashboard;
                    }
                    login::LoginAction::Quit => self.should_quit = true,
                }
            }
            Screen::Dashboard => self.handle_dashboard_key(key),
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent) {
        match &mut self.overlay {
            Overlay::Search(buffer) => {
                match key.code {
                    KeyCode::Esc => self.overlay = Overlay::None,
                    KeyCode::Enter => {
                        self.filter.query = buffer.clone();
                        self.table_sel = 0;
                        self.overlay = Overlay::None;
                    }
                    KeyCode::Backspace => {
                        buffer.pop();
                    }
                    KeyCode::Char(c) => buffer.push(c),
                    _ => {}
                }
                return;
            }
            Overlay::Form(form) => {
                match dialog::handle_key(form, key) {
                    FormAction::Continue => {}
                    FormAction::Cancel => self.overlay = Overlay::None,
                    FormAction::Submit => self.submit_form(),
                }
                return;
            }
            Overlay::None => {}
        }

        // Global keys.
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Tab => {
                self.tab = match self.tab {
                    Tab::Table => Tab::Board,
                    Tab::Board => Tab::Table,
                };
                return;
            }
            KeyCode::Char('r') => {
                self.refresh();
                return;
            }
            _ => {}
        }

        match self.tab {
            Tab::Table => self.handle_table_key(key),
            Tab::Board => self.handle_board_key(key),
        }
    }

    // -- table tab ----------------------------------------------------------

    fn selected_lead(&self) -> Option<Lead> {
        let view = self.table_view();
        view.leads.get(self.table_sel.min(view.leads.len().saturating_sub(1))).cloned()
    }

    fn handle_table_key(&mut self, key: KeyEvent) {
        let rows = self.table_view().leads.len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if rows > 0 {
                    self.table_sel = (self.table_sel + 1).min(rows - 1);
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.table_sel = self.table_sel.saturating_sub(1);
            }
            KeyCode::Char('/') => {
                self.overlay = Overlay::Search(self.filter.query.clone());
            }
            KeyCode::Char('s') => {
                self.filter.status = cycle_status_filter(self.filter.status);
                self.table_sel = 0;
            }
            KeyCode::Char('c') => {
                self.filter.classification = cycle_classification_filter(self.filter.classification);
                self.table_sel = 0;
            }
            KeyCode::Char('n') => match LeadForm::create(self.services.catalog.as_ref()) {
                Ok(form) => self.overlay = Overlay::Form(form),
                Err(err) => self.report(Err(err)),
            },
            KeyCode::Char('e') => {
                if let Some(lead) = self.selected_lead() {
                    match LeadForm::edit(self.services.catalog.as_ref(), &lead) {
                        Ok(form) => self.overlay = Overlay::Form(form),
                        Err(err) => self.report(Err(err)),
                    }
                }
            }
            KeyCode::Char('d') => self.delete_selected(),
            KeyCode::Char('x') => self.export_current(),
            KeyCode::Char('w') => {
                if let Some(lead) = self.selected_lead() {
                    let message = whatsapp_link(&lead).map_or_else(
                        || format!("{} no tiene teléfono marcable", lead.name),
                        |url| url.to_string(),
                    );
                    self.notice = Some(message);
                }
            }
            KeyCode::Char(c @ ('1' | '2' | '3' | '4')) => {
                let target = match c {
                    '1' => Status::New,
                    '2' => Status::Contacted,
                    '3' => Status::Closed,
                    _ => Status::Lost,
                };
                self.set_selected_status(target);
            }
            _ => {}
        }
    }

    fn set_selected_status(&mut self, target: Status) {
        let Some(lead) = self.selected_lead() else {
            return;
        };
        let result = self
            .controller
            .set_status(&mut self.store, self.services.leads.as_ref(), &lead.id, target)
            .map(|outcome| match outcome {
                TransitionOutcome::Applied { from, to } => format!("{}: {from} -> {to}", lead.name),
                TransitionOutcome::Unchanged => format!("{} ya está en {target}", lead.name),
            });
        self.report(result);
    }

    fn delete_selected(&mut self) {
        let Some(lead) = self.selected_lead() else {
            return;
        };
        if let Err(err) = self.store.mark_pending_delete(&lead.id) {
            self.report(Err(err));
            return;
        }
        match self.services.leads.delete(&lead.id) {
            Ok(()) => {
                self.store.confirm_delete(&lead.id);
                self.notice = Some(format!("{} eliminado", lead.name));
            }
            Err(err) => {
                self.store.revert_delete(&lead.id);
                self.report(Err(err.into()));
            }
        }
    }

    fn export_current(&mut self) {
        let view = self.table_view();
        let blob = render_csv(&view.leads);
        let path = export_filename(chrono::Utc::now().date_naive());
        self.notice = Some(match std::fs::write(&path, blob) {
            Ok(()) => format!("{} lead(s) exportados a {path}", view.leads.len()),
            Err(err) => format!("No se pudo escribir {path}: {err}"),
        });
    }

    /// Manual refresh — and the explicit recovery action after a feed
    /// drop: resubscribe first, then re-fetch the snapshot.
    fn refresh(&mut self) {
        if self.disconnected {
            self.feed = ChangeFeed::new(self.services.leads.subscribe());
            self.disconnected = false;
        }
        match self.services.leads.query_all() {
            Ok(rows) => {
                self.store.load_snapshot(rows);
                self.notice = Some("Datos actualizados".to_string());
            }
            Err(err) => self.report(Err(err.into())),
        }
    }

    // -- board tab ----------------------------------------------------------

    fn handle_board_key(&mut self, key: KeyEvent) {
        let board = project_board(&self.store);
        let dragging = self.controller.dragging().is_some();
        match key.code {
            KeyCode::Char('h') | KeyCode::Left => {
                self.board_col = self.board_col.saturating_sub(1);
                if dragging {
                    self.controller.drag_over(Status::BOARD[self.board_col]);
                } else {
                    self.board_sel = 0;
                }
            }
            KeyCode::Char('l') | KeyCode::Right => {
                self.board_col = (self.board_col + 1).min(Status::BOARD.len() - 1);
                if dragging {
                    self.controller.drag_over(Status::BOARD[self.board_col]);
                } else {
                    self.board_sel = 0;
                }
            }
            KeyCode::Char('j') | KeyCode::Down => {
                let len = board.columns[self.board_col].leads.len();
                if len > 0 && !dragging {
                    self.board_sel = (self.board_sel + 1).min(len - 1);
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if !dragging {
                    self.board_sel = self.board_sel.saturating_sub(1);
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                if dragging {
                    self.drop_held_card();
                } else {
                    self.pick_up_card(&board);
                }
            }
            KeyCode::Esc => {
                // Cancelled drag: transient state must clear even though
                // nothing was dropped.
                self.controller.drag_end();
            }
            _ => {}
        }
    }

    fn pick_up_card(&mut self, board: &leadlane_core::view::BoardView) {
        let column = &board.columns[self.board_col];
        let Some(card) = column.leads.get(self.board_sel.min(column.leads.len().saturating_sub(1)))
        else {
            return;
        };
        if let Err(err) = self.controller.drag_start(&self.store, &card.id) {
            self.report(Err(err));
        }
    }

    fn drop_held_card(&mut self) {
        let target = Status::BOARD[self.board_col];
        match self
            .controller
            .drop_on(&mut self.store, self.services.leads.as_ref(), target)
        {
            Ok(DropOutcome::Moved { from, to, .. }) => {
                self.notice = Some(format!("Movido de {from} a {to}"));
                self.board_sel = 0;
            }
            // Deliberately silent: dropping a card back onto its own
            // column is not feedback-worthy.
            Ok(DropOutcome::SamePlace | DropOutcome::NoDrag) => {}
            Err(err) => self.report(Err(err)),
        }
    }
}

fn cycle_status_filter(current: StatusFilter) -> StatusFilter {
    match current {
        StatusFilter::All => StatusFilter::Only(Status::New),
        StatusFilter::Only(Status::New) => StatusFilter::Only(Status::Contacted),
        StatusFilter::Only(Status::Contacted) => StatusFilter::Only(Status::Closed),
        StatusFilter::Only(Status::Closed) => StatusFilter::Only(Status::Lost),
        StatusFilter::Only(Status::Lost) => StatusFilter::All,
    }
}

fn cycle_classification_filter(current: ClassificationFilter) -> ClassificationFilter {
    match current {
        ClassificationFilter::All => ClassificationFilter::Pending,
        ClassificationFilter::Pending => ClassificationFilter::Only(Classification::High),
        ClassificationFilter::Only(Classification::High) => {
            ClassificationFilter::Only(Classification::Medium)
        }
        ClassificationFilter::Only(Classification::Medium) => {
            ClassificationFilter::Only(Classification::Low)
        }
        ClassificationFilter::Only(Classification::Low) => ClassificationFilter::All,
    }
}

impl App {
    /// Submit the open form overlay (create or edit).
    fn submit_form(&mut self) {
        let Overlay::Form(form) = std::mem::replace(&mut self.overlay, Overlay::None) else {
            return;
        };
        let target = form.target().cloned();
        match target {
            None => {
                let result = form
                    .into_new_lead()
                    .and_then(|draft| {
                        self.services
                            .leads
                            .insert(draft)
                            .map_err(SyncError::from)
                    })
                    .map(|lead| format!("Lead creado: {}", lead.name));
                self.report(result);
            }
            Some(id) => {
                let result = form.into_patch().and_then(|patch| {
                    let token = self.store.apply_optimistic(&id, &patch)?;
                    match self.services.leads.update(&id, &patch) {
                        Ok(()) => {
                            self.store.confirm(&id, token);
                            Ok("Lead actualizado".to_string())
                        }
                        Err(err) => {
                            self.store.revert(&id, token);
                            Err(err.into())
                        }
                    }
                });
                self.report(result);
            }
        }
    }
}
