//! Root application component
//!
//! The App struct implements the Component trait, acting as the root component
//! that delegates event handling and rendering to child components.
//! It owns the fetch worker and remembers which panel issued each ticket so
//! completions go back to the right owner.

use crate::action::Action;
use crate::component::Component;
use crate::components::{
    calculate_dashboard_layout, calculate_screen_layout, ConfirmDialog, ConnectionForm,
    DataSourcesComponent, HelpDialog, HistoryDialog, Palette, ProfilingDialog,
    RunDetailComponent, RunListComponent, TableGroupForm, TokenDialog,
};
use crate::config::{Config, TokenStore};
use crate::model::{Dashboard, Fetch, Modal, ModalStack, Pane, Screen, Ticket};
use crate::services::{ApiClient, Completion, FetchWorker, Outbound};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Which owner a ticket's completion is delivered to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Dashboard,
    DataSources,
    ConnectionForm,
    TableGroupForm,
    Profiling,
    History,
}

// ═══════════════════════════════════════════════════════════════════════════════
// App Struct
// ═══════════════════════════════════════════════════════════════════════════════

/// Main application state - coordinates between components
pub struct App {
    /// Persisted settings (theme, base URL, timeout)
    pub config: Config,
    /// Where `config` is written back; `None` keeps changes in memory
    config_path: Option<PathBuf>,
    /// Bearer token shared with the API client
    pub tokens: TokenStore,

    pub screen: Screen,
    /// Focused pane on the dashboard screen
    pub pane: Pane,
    pub palette: Palette,

    /// Modal overlay stack
    pub modals: ModalStack,

    /// Background HTTP calls
    worker: FetchWorker,
    routes: HashMap<Ticket, Route>,

    /// Run/table selection and its fetches
    pub dashboard: Dashboard,

    /// Flag to indicate the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Child Components
    // ─────────────────────────────────────────────────────────────────────────
    pub run_list: RunListComponent,
    pub run_detail: RunDetailComponent,
    pub data_sources: DataSourcesComponent,
    pub connection_form: ConnectionForm,
    pub table_group_form: TableGroupForm,
    pub profiling_dialog: Option<ProfilingDialog>,
    pub token_dialog: TokenDialog,
    pub history_dialog: HistoryDialog,
    pub help_dialog: HelpDialog,
}

// ═══════════════════════════════════════════════════════════════════════════════
// App Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl App {
    /// Create a new App instance
    pub fn new(config: Config, config_path: Option<PathBuf>, tokens: TokenStore) -> Result<App> {
        let api = ApiClient::new(&config.base_url, config.request_timeout(), tokens.clone())?;
        let palette = Palette::for_mode(config.theme);

        Ok(App {
            config,
            config_path,
            tokens,
            screen: Screen::default(),
            pane: Pane::default(),
            palette,
            modals: ModalStack::new(),
            worker: FetchWorker::new(api),
            routes: HashMap::new(),
            dashboard: Dashboard::new(),
            should_quit: false,
            status_message: None,
            run_list: RunListComponent::new(),
            run_detail: RunDetailComponent::new(),
            data_sources: DataSourcesComponent::new(),
            connection_form: ConnectionForm::new(),
            table_group_form: TableGroupForm::new(),
            profiling_dialog: None,
            token_dialog: TokenDialog::default(),
            history_dialog: HistoryDialog::default(),
            help_dialog: HelpDialog::default(),
        })
    }

    /// Hand requests to the worker, remembering who asked
    fn dispatch(&mut self, route: Route, outbound: Vec<Outbound>) {
        for request in outbound {
            self.routes.insert(request.ticket, route);
            self.worker.dispatch(request);
        }
    }

    /// Run an action and every follow-up it produces
    fn run_action(&mut self, action: Action) -> Result<()> {
        let mut current = Some(action);
        while let Some(action) = current {
            current = self.update(action)?;
        }
        Ok(())
    }

    /// Deliver one finished call to the panel that issued it
    fn handle_completion(&mut self, completion: Completion) -> Result<()> {
        let Some(route) = self.routes.remove(&completion.ticket) else {
            debug!(ticket = %completion.ticket, "completion without an owner");
            return Ok(());
        };
        match route {
            Route::Dashboard => {
                let follow_up = self.dashboard.complete(completion);
                self.dispatch(Route::Dashboard, follow_up);
                if let Some(message) = self.dashboard.take_refresh_error() {
                    self.status_message =
                        Some(format!("Refresh failed: {} Showing the last loaded runs.", message));
                }
            }
            Route::DataSources => {
                let follow_up = self.data_sources.complete(completion);
                self.dispatch(Route::DataSources, follow_up);
            }
            Route::ConnectionForm => {
                if let Some(action) = self.connection_form.complete(completion) {
                    self.run_action(action)?;
                }
            }
            Route::TableGroupForm => {
                if let Some(action) = self.table_group_form.complete(completion) {
                    self.run_action(action)?;
                }
            }
            Route::Profiling => {
                if let Some(dialog) = self.profiling_dialog.as_mut() {
                    dialog.complete(completion);
                }
            }
            Route::History => self.history_dialog.complete(completion),
        }
        Ok(())
    }

    fn set_pane(&mut self, pane: Pane) {
        self.pane = pane;
        self.run_detail.list_focused = pane == Pane::Tables;
        self.run_detail.detail_focused = pane == Pane::Detail;
    }

    fn show_screen(&mut self, screen: Screen) {
        self.screen = screen;
        self.status_message = None;
        if screen == Screen::DataSources && self.data_sources.connections == Fetch::Idle {
            let outbound = self.data_sources.refresh();
            self.dispatch(Route::DataSources, outbound);
        }
    }

    fn refresh_current_screen(&mut self) {
        match self.screen {
            Screen::Dashboard => {
                let outbound = self.dashboard.refresh();
                self.dispatch(Route::Dashboard, outbound);
            }
            Screen::DataSources => {
                let outbound = self.data_sources.refresh();
                self.dispatch(Route::DataSources, outbound);
            }
        }
    }

    fn save_config(&mut self) {
        let Some(path) = &self.config_path else {
            return;
        };
        if let Err(e) = self.config.save_to(path) {
            warn!(error = %e, "failed to save config");
            self.status_message = Some(format!("Could not save settings: {}", e));
        }
    }

    fn opened_connection_id(&self) -> Option<i64> {
        self.data_sources.opened.as_ref().map(|o| o.id)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Component Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl Component for App {
    fn init(&mut self) -> Result<()> {
        info!(base_url = %self.config.base_url, "mounting dashboard");
        let outbound = self.dashboard.mount();
        self.dispatch(Route::Dashboard, outbound);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(Some(Action::ForceQuit));
        }

        if let Some(modal) = self.modals.top().cloned() {
            return self.handle_modal_key_event(modal, key);
        }

        // Global shortcuts
        let global = match key.code {
            KeyCode::Char('q') => Some(Action::OpenQuitDialog),
            KeyCode::Char('?') => Some(Action::OpenHelp),
            KeyCode::Char('h') => Some(Action::OpenHistory),
            KeyCode::Char('L') => Some(Action::OpenTokenDialog),
            KeyCode::Char('T') => Some(Action::ToggleTheme),
            KeyCode::Char('s') => Some(Action::NextScreen),
            KeyCode::Char('1') if self.screen != Screen::Dashboard => Some(Action::NextScreen),
            KeyCode::Char('2') if self.screen != Screen::DataSources => Some(Action::NextScreen),
            KeyCode::Char('1') | KeyCode::Char('2') => return Ok(None),
            KeyCode::Tab => Some(Action::NextPane),
            KeyCode::BackTab => Some(Action::PrevPane),
            KeyCode::Char('r') => Some(match self.screen {
                Screen::Dashboard => Action::RefreshDashboard,
                Screen::DataSources => Action::RefreshConnections,
            }),
            _ => None,
        };
        if global.is_some() {
            return Ok(global);
        }

        match self.screen {
            Screen::Dashboard => match self.pane {
                Pane::Runs => self.run_list.handle_key_event(key),
                Pane::Tables | Pane::Detail => self.run_detail.handle_key_event(key),
            },
            Screen::DataSources => self.data_sources.handle_key_event(key),
        }
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            // ─────────────────────────────────────────────────────────────────
            // App Lifecycle
            // ─────────────────────────────────────────────────────────────────
            Action::Tick => {
                for completion in self.worker.poll() {
                    self.handle_completion(completion)?;
                }
                self.run_list.follow_selection(&self.dashboard);
                self.run_detail.follow_selection(&self.dashboard);
            }
            Action::ForceQuit => {
                self.should_quit = true;
            }
            Action::Resize(_, _) => {}

            // ─────────────────────────────────────────────────────────────────
            // Navigation
            // ─────────────────────────────────────────────────────────────────
            Action::NextItem | Action::PrevItem | Action::FirstItem | Action::LastItem => {
                match (self.screen, self.pane) {
                    (Screen::Dashboard, Pane::Runs) => match action {
                        Action::NextItem => self.run_list.next(&self.dashboard),
                        Action::PrevItem => self.run_list.previous(&self.dashboard),
                        Action::FirstItem => self.run_list.select_first(&self.dashboard),
                        _ => self.run_list.select_last(&self.dashboard),
                    },
                    (Screen::Dashboard, _) => match action {
                        Action::NextItem => self.run_detail.next(&self.dashboard),
                        Action::PrevItem => self.run_detail.previous(&self.dashboard),
                        Action::FirstItem => self.run_detail.select_first(&self.dashboard),
                        _ => self.run_detail.select_last(&self.dashboard),
                    },
                    (Screen::DataSources, _) => match action {
                        Action::NextItem => self.data_sources.next(),
                        Action::PrevItem => self.data_sources.previous(),
                        _ => {}
                    },
                }
            }
            Action::ActivateItem => {
                let follow_up = match (self.screen, self.pane) {
                    (Screen::Dashboard, Pane::Runs) => self
                        .run_list
                        .highlighted_run_id(&self.dashboard)
                        .map(Action::SelectRun),
                    (Screen::Dashboard, _) => self
                        .run_detail
                        .highlighted_table(&self.dashboard)
                        .map(Action::SelectTable),
                    (Screen::DataSources, _) => self.data_sources.activate(),
                };
                return Ok(follow_up);
            }
            Action::NextPane | Action::PrevPane => match self.screen {
                Screen::Dashboard => {
                    let pane = if action == Action::NextPane {
                        self.pane.next()
                    } else {
                        self.pane.previous()
                    };
                    self.set_pane(pane);
                }
                Screen::DataSources => {
                    if self.data_sources.opened.is_some() {
                        self.data_sources.groups_focused = !self.data_sources.groups_focused;
                    }
                }
            },
            Action::NextScreen => {
                let next = self.screen.next();
                self.show_screen(next);
            }

            // ─────────────────────────────────────────────────────────────────
            // Scrolling
            // ─────────────────────────────────────────────────────────────────
            Action::ScrollUp | Action::ScrollDown | Action::PageUp | Action::PageDown => {
                if self.modals.top() == Some(&Modal::History) {
                    self.history_dialog.update(action)?;
                } else {
                    self.run_detail.update(action)?;
                }
            }

            // ─────────────────────────────────────────────────────────────────
            // Dashboard
            // ─────────────────────────────────────────────────────────────────
            Action::RefreshDashboard => {
                let outbound = self.dashboard.refresh();
                self.dispatch(Route::Dashboard, outbound);
            }
            Action::SelectRun(run_id) => {
                let outbound = self.dashboard.select_run(&run_id);
                self.dispatch(Route::Dashboard, outbound);
                self.run_list.follow_selection(&self.dashboard);
                self.run_detail.follow_selection(&self.dashboard);
            }
            Action::SelectTable(table_name) => {
                let outbound = self.dashboard.select_table(&table_name);
                self.dispatch(Route::Dashboard, outbound);
                self.run_detail.follow_selection(&self.dashboard);
            }
            Action::MoveCardLeft | Action::MoveCardRight => {
                self.run_list.update(action)?;
            }

            // ─────────────────────────────────────────────────────────────────
            // Data Sources
            // ─────────────────────────────────────────────────────────────────
            Action::RefreshConnections => {
                let outbound = self.data_sources.refresh();
                self.dispatch(Route::DataSources, outbound);
            }
            Action::OpenConnection(id) => {
                let outbound = self.data_sources.open_connection(id);
                self.dispatch(Route::DataSources, outbound);
            }
            Action::OpenTableGroup {
                connection_id,
                group_id,
            } => {
                let outbound = self.data_sources.open_table_group(connection_id, &group_id);
                self.dispatch(Route::DataSources, outbound);
            }
            Action::ConnectionSaved {
                connection_id,
                name,
            } => {
                info!(connection_id, "connection saved");
                self.status_message = Some(format!("Saved connection \"{}\"", name));
                let mut outbound = self.data_sources.refresh();
                if self.opened_connection_id() == Some(connection_id) {
                    outbound.extend(self.data_sources.open_connection(connection_id));
                }
                self.dispatch(Route::DataSources, outbound);
            }
            Action::TableGroupCreated { connection_id } => {
                if self.opened_connection_id() == Some(connection_id) {
                    let outbound = self.data_sources.reload_groups();
                    self.dispatch(Route::DataSources, outbound);
                }
            }
            Action::DeleteConnection(id) => {
                self.modals.pop();
                let outbound = self.data_sources.delete_connection(id);
                self.dispatch(Route::DataSources, outbound);
            }
            Action::DeleteTableGroup {
                connection_id,
                group_id,
            } => {
                self.modals.pop();
                let outbound = self.data_sources.delete_table_group(connection_id, &group_id);
                self.dispatch(Route::DataSources, outbound);
            }

            // ─────────────────────────────────────────────────────────────────
            // Forms
            // ─────────────────────────────────────────────────────────────────
            Action::TestConnection => {
                let outbound = self.connection_form.test();
                self.dispatch(Route::ConnectionForm, outbound);
            }
            Action::SaveConnection => {
                let outbound = self.connection_form.save();
                self.dispatch(Route::ConnectionForm, outbound);
            }
            Action::SaveTableGroup => {
                let outbound = self.table_group_form.save();
                self.dispatch(Route::TableGroupForm, outbound);
            }
            Action::TriggerProfiling => {
                if let Some(dialog) = self.profiling_dialog.as_mut() {
                    let outbound = dialog.trigger();
                    self.dispatch(Route::Profiling, outbound);
                }
            }
            Action::SaveToken(token) => {
                let token = Some(token).filter(|t| !t.is_empty());
                let cleared = token.is_none();
                match self.tokens.set(token) {
                    Ok(()) => {
                        self.modals.pop();
                        let message = if cleared { "Token cleared." } else { "Token saved." };
                        self.status_message = Some(message.to_string());
                        self.refresh_current_screen();
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to store token");
                        self.status_message = Some(format!("Could not store token: {}", e));
                    }
                }
            }

            // ─────────────────────────────────────────────────────────────────
            // Modals
            // ─────────────────────────────────────────────────────────────────
            Action::OpenQuitDialog => {
                self.modals.push(Modal::Confirm(ConfirmDialog::quit()));
            }
            Action::OpenHelp => {
                self.help_dialog.scroll_offset = 0;
                self.modals.push(Modal::Help);
            }
            Action::OpenHistory => {
                if !self.modals.contains(&Modal::History) {
                    let outbound = self.history_dialog.open();
                    self.dispatch(Route::History, outbound);
                    self.modals.push(Modal::History);
                }
            }
            Action::OpenTokenDialog => {
                self.token_dialog = TokenDialog::new(self.tokens.is_set());
                self.modals.push(Modal::Token);
            }
            Action::OpenNewConnection => {
                self.connection_form.open_create();
                self.modals.push(Modal::ConnectionForm);
            }
            Action::OpenEditConnection => {
                let target = self
                    .data_sources
                    .opened_record()
                    .or_else(|| self.data_sources.highlighted_connection())
                    .cloned();
                match target {
                    Some(connection) => {
                        self.connection_form.open_edit(&connection);
                        self.modals.push(Modal::ConnectionForm);
                    }
                    None => self.status_message = Some("No connection to edit.".to_string()),
                }
            }
            Action::OpenNewTableGroup => match self.opened_connection_id() {
                Some(connection_id) => {
                    self.table_group_form.open(connection_id);
                    self.modals.push(Modal::TableGroupForm);
                }
                None => {
                    self.status_message =
                        Some("Open a connection (Enter) before adding a table group.".to_string())
                }
            },
            Action::OpenTriggerProfiling => {
                let group = self
                    .data_sources
                    .highlighted_group()
                    .filter(|_| self.data_sources.groups_focused)
                    .cloned();
                match group {
                    Some(group) => {
                        self.profiling_dialog = Some(ProfilingDialog::new(group.connection_id, group));
                        self.modals.push(Modal::TriggerProfiling);
                    }
                    None => {
                        self.status_message =
                            Some("Highlight a table group to run profiling.".to_string())
                    }
                }
            }
            Action::RequestDeleteConnection => {
                if let Some(connection) = self.data_sources.highlighted_connection() {
                    let dialog = ConfirmDialog::delete_connection(
                        connection.connection_id,
                        &connection.connection_name,
                    );
                    self.modals.push(Modal::Confirm(dialog));
                }
            }
            Action::RequestDeleteTableGroup => {
                let dialog = self
                    .data_sources
                    .highlighted_group()
                    .filter(|_| self.data_sources.groups_focused)
                    .map(|g| ConfirmDialog::delete_table_group(g.connection_id, &g.id, &g.table_groups_name));
                match dialog {
                    Some(dialog) => self.modals.push(Modal::Confirm(dialog)),
                    None => {
                        self.status_message =
                            Some("Highlight a table group to delete it.".to_string())
                    }
                }
            }
            Action::LoadProfileResults => {
                let outbound = self.history_dialog.load_results();
                self.dispatch(Route::History, outbound);
            }
            Action::CloseModal => {
                if self.modals.pop() == Some(Modal::TriggerProfiling) {
                    self.profiling_dialog = None;
                }
            }
            Action::ModalUp | Action::ModalDown => {
                self.history_dialog.update(action)?;
            }

            // ─────────────────────────────────────────────────────────────────
            // Session
            // ─────────────────────────────────────────────────────────────────
            Action::ToggleTheme => {
                self.config.theme = self.config.theme.toggled();
                self.palette = Palette::for_mode(self.config.theme);
                info!(theme = self.config.theme.name(), "theme toggled");
                self.save_config();
            }
        }

        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let layout = calculate_screen_layout(area, self.status_message.is_some());

        self.render_tabs(frame, layout.tabs);

        match self.screen {
            Screen::Dashboard => {
                let panes = calculate_dashboard_layout(layout.body);
                self.run_list.draw_with(
                    frame,
                    panes.runs,
                    &self.dashboard,
                    &self.palette,
                    self.pane == Pane::Runs,
                )?;
                self.run_detail.draw_with(
                    frame,
                    panes.tables,
                    panes.detail,
                    &self.dashboard,
                    &self.palette,
                )?;
            }
            Screen::DataSources => {
                self.data_sources.draw_with(frame, layout.body, &self.palette)?;
            }
        }

        if let (Some(status_area), Some(status)) = (layout.status, &self.status_message) {
            let paragraph = Paragraph::new(Span::styled(
                format!(" {} ", status),
                Style::default().fg(self.palette.warning),
            ));
            frame.render_widget(paragraph, status_area);
        }
        self.render_help_bar(frame, layout.help);

        // Overlays, bottom to top
        let open: Vec<Modal> = self.modals.iter().cloned().collect();
        for modal in &open {
            self.draw_modal(frame, area, modal)?;
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helper Methods
// ═══════════════════════════════════════════════════════════════════════════════

impl App {
    fn handle_modal_key_event(&mut self, modal: Modal, key: KeyEvent) -> Result<Option<Action>> {
        match modal {
            Modal::Confirm(mut dialog) => dialog.handle_key_event(key),
            Modal::Help => self.help_dialog.handle_key_event(key),
            Modal::ConnectionForm => self.connection_form.handle_key_event(key),
            Modal::TableGroupForm => self.table_group_form.handle_key_event(key),
            Modal::TriggerProfiling => match self.profiling_dialog.as_mut() {
                Some(dialog) => dialog.handle_key_event(key),
                None => Ok(Some(Action::CloseModal)),
            },
            Modal::Token => self.token_dialog.handle_key_event(key),
            Modal::History => self.history_dialog.handle_key_event(key),
        }
    }

    fn draw_modal(&mut self, frame: &mut Frame, area: Rect, modal: &Modal) -> Result<()> {
        match modal {
            Modal::Confirm(dialog) => dialog.draw_with(frame, area, &self.palette)?,
            Modal::Help => self.help_dialog.draw_with(frame, area, &self.palette)?,
            Modal::ConnectionForm => self.connection_form.draw_with(frame, area, &self.palette)?,
            Modal::TableGroupForm => self.table_group_form.draw_with(frame, area, &self.palette)?,
            Modal::TriggerProfiling => {
                if let Some(dialog) = &self.profiling_dialog {
                    dialog.draw_with(frame, area, &self.palette)?;
                }
            }
            Modal::Token => self.token_dialog.draw_with(frame, area, &self.palette)?,
            Modal::History => self.history_dialog.draw_with(frame, area, &self.palette)?,
        }
        Ok(())
    }

    fn render_tabs(&self, frame: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(30), Constraint::Length(60)])
            .split(area);

        let titles: Vec<String> = Screen::all()
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{} {}", i + 1, s.name()))
            .collect();
        let tabs = Tabs::new(titles)
            .block(
                Block::default()
                    .borders(Borders::BOTTOM)
                    .border_style(self.palette.border(false))
                    .title(" dq-dash ")
                    .title_style(self.palette.title()),
            )
            .select(self.screen.index())
            .style(self.palette.muted())
            .highlight_style(
                Style::default()
                    .fg(self.palette.accent)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, columns[0]);

        let busy = if self.worker.is_busy() { "⟳ " } else { "" };
        let token = if self.tokens.is_set() { "token ✓" } else { "no token" };
        let session = Paragraph::new(Line::from(vec![
            Span::styled(busy, Style::default().fg(self.palette.warning)),
            Span::styled(self.config.base_url.clone(), self.palette.muted()),
            Span::raw("  "),
            Span::styled(token, self.palette.muted()),
            Span::raw("  "),
            Span::styled(self.config.theme.name().to_string(), self.palette.muted()),
            Span::raw(" "),
        ]))
        .alignment(Alignment::Right)
        .block(Block::default().borders(Borders::BOTTOM).border_style(self.palette.border(false)));
        frame.render_widget(session, columns[1]);
    }

    fn render_help_bar(&self, frame: &mut Frame, area: Rect) {
        let key = Style::default()
            .fg(self.palette.accent)
            .add_modifier(Modifier::BOLD);
        let quit = Style::default()
            .fg(self.palette.warning)
            .add_modifier(Modifier::BOLD);

        let mut spans = vec![Span::styled(" q ", quit), Span::raw("Quit ")];
        let hints: &[(&str, &str)] = match self.screen {
            Screen::Dashboard => &[
                (" j/k ", "Move "),
                (" Enter ", "Select "),
                (" Tab ", "Pane "),
                (" [/] ", "Move card "),
                (" r ", "Refresh "),
                (" h ", "History "),
                (" s ", "Data Sources "),
                (" ? ", "Help"),
            ],
            Screen::DataSources => &[
                (" Enter ", "Open "),
                (" a ", "New "),
                (" e ", "Edit "),
                (" x ", "Delete "),
                (" g ", "New group "),
                (" p ", "Profile "),
                (" s ", "Dashboard "),
                (" ? ", "Help"),
            ],
        };
        for (k, label) in hints {
            spans.push(Span::styled(*k, key));
            spans.push(Span::raw(*label));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::profiling::DashboardStats;
    use crate::services::worker::{ApiReply, RequestKind};
    use ratatui::{backend::TestBackend, Terminal};

    fn app() -> App {
        // Nothing listens on port 9; dispatched calls fail in the background
        let config = Config {
            base_url: "http://127.0.0.1:9".to_string(),
            ..Config::default()
        };
        App::new(config, None, TokenStore::in_memory(None)).unwrap()
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn press(app: &mut App, event: KeyEvent) {
        if let Some(action) = app.handle_key_event(event).unwrap() {
            app.run_action(action).unwrap();
        }
    }

    fn tickets_for(app: &App, route: Route) -> Vec<Ticket> {
        let mut tickets: Vec<Ticket> = app
            .routes
            .iter()
            .filter(|(_, r)| **r == route)
            .map(|(t, _)| *t)
            .collect();
        tickets.sort();
        tickets
    }

    #[test]
    fn test_quit_requires_confirmation() {
        let mut app = app();
        press(&mut app, key('q'));
        assert!(!app.should_quit);
        assert!(matches!(app.modals.top(), Some(Modal::Confirm(_))));

        press(&mut app, key('n'));
        assert!(app.modals.is_empty());

        press(&mut app, key('q'));
        press(&mut app, key('y'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_modal_swallows_global_keys() {
        let mut app = app();
        press(&mut app, key('?'));
        assert_eq!(app.modals.top(), Some(&Modal::Help));
        // 's' would switch screens without the modal
        press(&mut app, key('s'));
        assert_eq!(app.screen, Screen::Dashboard);
    }

    #[test]
    fn test_init_routes_overview_to_dashboard() {
        let mut app = app();
        app.init().unwrap();
        let tickets = tickets_for(&app, Route::Dashboard);
        assert_eq!(tickets.len(), 1);
        assert!(app.dashboard.is_loading());
    }

    #[test]
    fn test_shared_request_kinds_go_to_their_owner() {
        let mut app = app();
        press(&mut app, key('2'));
        assert_eq!(app.screen, Screen::DataSources);
        press(&mut app, key('h'));
        assert_eq!(app.modals.top(), Some(&Modal::History));

        // Both panels asked for home stats; each answer lands with its owner.
        // The history dialog issues DashboardStats first, so it holds the lower ticket
        let history_ticket = tickets_for(&app, Route::History)[0];
        assert_eq!(tickets_for(&app, Route::DataSources).len(), 2);
        let stats = DashboardStats {
            connections: 4,
            ..DashboardStats::default()
        };
        app.handle_completion(Completion {
            ticket: history_ticket,
            kind: RequestKind::DashboardStats,
            result: Ok(ApiReply::DashboardStats(stats.clone())),
        })
        .unwrap();
        assert_eq!(app.history_dialog.stats, Fetch::Loaded(stats));
        assert!(app.data_sources.stats.is_loading());
    }

    #[test]
    fn test_failed_refresh_goes_to_status_line() {
        let mut app = app();
        app.init().unwrap();
        let mount = tickets_for(&app, Route::Dashboard)[0];
        app.handle_completion(Completion {
            ticket: mount,
            kind: RequestKind::DashboardOverview,
            result: Ok(ApiReply::DashboardOverview(
                serde_json::from_value(serde_json::json!({ "recentRuns": [] })).unwrap(),
            )),
        })
        .unwrap();

        press(&mut app, key('r'));
        let refresh = tickets_for(&app, Route::Dashboard)[0];
        app.handle_completion(Completion {
            ticket: refresh,
            kind: RequestKind::DashboardOverview,
            result: Err(crate::services::api::ApiError::Status(502)),
        })
        .unwrap();

        assert!(app.dashboard.runs.overview.loaded().is_some());
        let status = app.status_message.clone().unwrap();
        assert!(status.starts_with("Refresh failed: Could not load dashboard data."));
    }

    #[test]
    fn test_unrouted_completion_is_ignored() {
        let mut app = app();
        app.handle_completion(Completion {
            ticket: Ticket::next(),
            kind: RequestKind::DashboardOverview,
            result: Ok(ApiReply::DashboardStats(DashboardStats::default())),
        })
        .unwrap();
        assert_eq!(app.dashboard.runs.overview, Fetch::Idle);
    }

    #[test]
    fn test_pane_focus_cycles_on_dashboard() {
        let mut app = app();
        press(&mut app, KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE));
        assert_eq!(app.pane, Pane::Tables);
        assert!(app.run_detail.list_focused);
        press(&mut app, KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE));
        assert!(app.run_detail.detail_focused);
        press(&mut app, KeyEvent::new(KeyCode::BackTab, KeyModifiers::NONE));
        assert_eq!(app.pane, Pane::Tables);
    }

    #[test]
    fn test_theme_toggle_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut app = app();
        app.config_path = Some(path.clone());
        press(&mut app, key('T'));
        let saved = Config::load_from(&path).unwrap();
        assert_eq!(saved.theme, app.config.theme);
        assert_ne!(saved.theme, Config::default().theme);
    }

    #[test]
    fn test_token_dialog_saves_and_clears() {
        let mut app = app();
        press(&mut app, key('L'));
        assert_eq!(app.modals.top(), Some(&Modal::Token));
        for c in "abc".chars() {
            press(&mut app, key(c));
        }
        press(&mut app, KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(app.tokens.get(), Some("abc".to_string()));
        assert!(app.modals.is_empty());

        press(&mut app, key('L'));
        press(&mut app, KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert!(!app.tokens.is_set());
        assert_eq!(app.status_message.as_deref(), Some("Token cleared."));
    }

    #[test]
    fn test_table_group_needs_opened_connection() {
        let mut app = app();
        press(&mut app, key('2'));
        press(&mut app, key('g'));
        assert!(app.modals.is_empty());
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_history_enter_requests_profile_results() {
        let mut app = app();
        press(&mut app, key('h'));
        let ticket = tickets_for(&app, Route::History)[0];
        app.handle_completion(Completion {
            ticket,
            kind: RequestKind::DashboardStats,
            result: Ok(ApiReply::DashboardStats(
                serde_json::from_value(serde_json::json!({
                    "runs": [{"connection_id": 1, "profiling_id": "r-1",
                              "status": "Complete", "table_groups_id": "g"}]
                }))
                .unwrap(),
            )),
        })
        .unwrap();
        press(&mut app, KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(app.history_dialog.results_run(), Some("r-1"));
        assert!(app.history_dialog.results.is_loading());
    }

    #[test]
    fn test_draw_both_screens() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal
            .draw(|frame| app.draw(frame, frame.area()).unwrap())
            .unwrap();
        press(&mut app, key('s'));
        terminal
            .draw(|frame| app.draw(frame, frame.area()).unwrap())
            .unwrap();
        let rendered: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(rendered.contains("Data Sources"));
        assert!(rendered.contains("127.0.0.1:9"));
    }
}
