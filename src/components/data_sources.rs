//! Data Sources screen - connections, their table groups and home counts
//!
//! Like the dashboard, this screen never performs I/O itself: its operations
//! return the requests to dispatch and `complete` applies the answers.

use crate::action::Action;
use crate::component::Component;
use crate::components::text::truncate;
use crate::components::theme::Palette;
use crate::model::connection::Connection;
use crate::model::fetch::{Fetch, Pending};
use crate::model::profiling::DashboardStats;
use crate::model::table_group::TableGroup;
use crate::services::worker::{ApiReply, ApiRequest, Completion, Outbound, RequestKind};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};
use tracing::{debug, info};

/// The connection opened with `Enter`
#[derive(Debug)]
pub struct OpenedConnection {
    pub id: i64,
    pub record: Fetch<Connection>,
    pub groups: Fetch<Vec<TableGroup>>,
    pub group_detail: Fetch<TableGroup>,
    pending_record: Option<Pending<i64>>,
    pending_groups: Option<Pending<i64>>,
    pending_group_detail: Option<Pending<(i64, String)>>,
}

impl OpenedConnection {
    fn new(id: i64) -> Self {
        Self {
            id,
            record: Fetch::Idle,
            groups: Fetch::Idle,
            group_detail: Fetch::Idle,
            pending_record: None,
            pending_groups: None,
            pending_group_detail: None,
        }
    }
}

/// Outcome line of the last delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

pub struct DataSourcesComponent {
    pub connections: Fetch<Vec<Connection>>,
    pub stats: Fetch<DashboardStats>,
    pub opened: Option<OpenedConnection>,
    pub notice: Option<Notice>,
    pub table_state: TableState,
    pub group_state: ListState,
    /// Whether keys move through table groups instead of connections
    pub groups_focused: bool,
    pending_connections: Option<Pending<()>>,
    pending_stats: Option<Pending<()>>,
    pending_delete: Option<Pending<i64>>,
    pending_group_delete: Option<Pending<(i64, String)>>,
}

impl Default for DataSourcesComponent {
    fn default() -> Self {
        Self::new()
    }
}

fn unexpected(reply: &ApiReply) -> String {
    format!("Unexpected reply: {:?}", reply)
}

impl DataSourcesComponent {
    pub fn new() -> Self {
        Self {
            connections: Fetch::Idle,
            stats: Fetch::Idle,
            opened: None,
            notice: None,
            table_state: TableState::default(),
            group_state: ListState::default(),
            groups_focused: false,
            pending_connections: None,
            pending_stats: None,
            pending_delete: None,
            pending_group_delete: None,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetch the connection list and the home counts
    pub fn refresh(&mut self) -> Vec<Outbound> {
        let connections = Pending::new(());
        let stats = Pending::new(());
        let out = vec![
            Outbound::new(connections.ticket, ApiRequest::ListConnections),
            Outbound::new(stats.ticket, ApiRequest::DashboardStats),
        ];
        self.pending_connections = Some(connections);
        self.pending_stats = Some(stats);
        self.connections = Fetch::Loading;
        self.stats = Fetch::Loading;
        out
    }

    /// Fetch one connection's record and its table groups
    pub fn open_connection(&mut self, id: i64) -> Vec<Outbound> {
        info!(connection_id = id, "opening connection");
        let mut opened = OpenedConnection::new(id);
        let record = Pending::new(id);
        let groups = Pending::new(id);
        let out = vec![
            Outbound::new(record.ticket, ApiRequest::GetConnection { id }),
            Outbound::new(groups.ticket, ApiRequest::ListTableGroups { connection_id: id }),
        ];
        opened.pending_record = Some(record);
        opened.pending_groups = Some(groups);
        opened.record = Fetch::Loading;
        opened.groups = Fetch::Loading;
        self.opened = Some(opened);
        self.group_state.select(None);
        out
    }

    /// Reload the opened connection's table groups
    pub fn reload_groups(&mut self) -> Vec<Outbound> {
        let Some(opened) = self.opened.as_mut() else {
            return Vec::new();
        };
        let pending = Pending::new(opened.id);
        let out = vec![Outbound::new(
            pending.ticket,
            ApiRequest::ListTableGroups {
                connection_id: opened.id,
            },
        )];
        opened.pending_groups = Some(pending);
        opened.groups = Fetch::Loading;
        out
    }

    pub fn open_table_group(&mut self, connection_id: i64, group_id: &str) -> Vec<Outbound> {
        let Some(opened) = self.opened.as_mut().filter(|o| o.id == connection_id) else {
            return Vec::new();
        };
        let pending = Pending::new((connection_id, group_id.to_string()));
        let out = vec![Outbound::new(
            pending.ticket,
            ApiRequest::GetTableGroup {
                connection_id,
                group_id: group_id.to_string(),
            },
        )];
        opened.pending_group_detail = Some(pending);
        opened.group_detail = Fetch::Loading;
        out
    }

    pub fn delete_connection(&mut self, id: i64) -> Vec<Outbound> {
        info!(connection_id = id, "deleting connection");
        let pending = Pending::new(id);
        let out = vec![Outbound::new(pending.ticket, ApiRequest::DeleteConnection { id })];
        self.pending_delete = Some(pending);
        out
    }

    pub fn delete_table_group(&mut self, connection_id: i64, group_id: &str) -> Vec<Outbound> {
        info!(connection_id, group_id, "deleting table group");
        let pending = Pending::new((connection_id, group_id.to_string()));
        let out = vec![Outbound::new(
            pending.ticket,
            ApiRequest::DeleteTableGroup {
                connection_id,
                group_id: group_id.to_string(),
            },
        )];
        self.pending_group_delete = Some(pending);
        out
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Highlight Queries
    // ─────────────────────────────────────────────────────────────────────────

    pub fn highlighted_connection(&self) -> Option<&Connection> {
        let index = self.table_state.selected()?;
        self.connections.loaded()?.get(index)
    }

    pub fn highlighted_group(&self) -> Option<&TableGroup> {
        let index = self.group_state.selected()?;
        self.opened.as_ref()?.groups.loaded()?.get(index)
    }

    /// Connection record of the opened connection, once loaded
    pub fn opened_record(&self) -> Option<&Connection> {
        self.opened.as_ref()?.record.loaded()
    }

    pub fn next(&mut self) {
        if self.groups_focused {
            let len = self.group_count();
            step(&mut self.group_state, len, true);
        } else {
            let len = self.connection_count();
            let mut state = ListState::default().with_selected(self.table_state.selected());
            step(&mut state, len, true);
            self.table_state.select(state.selected());
        }
    }

    pub fn previous(&mut self) {
        if self.groups_focused {
            let len = self.group_count();
            step(&mut self.group_state, len, false);
        } else {
            let len = self.connection_count();
            let mut state = ListState::default().with_selected(self.table_state.selected());
            step(&mut state, len, false);
            self.table_state.select(state.selected());
        }
    }

    fn connection_count(&self) -> usize {
        self.connections.loaded().map(Vec::len).unwrap_or(0)
    }

    fn group_count(&self) -> usize {
        self.opened
            .as_ref()
            .and_then(|o| o.groups.loaded())
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Action for `Enter` on the highlighted row
    pub fn activate(&self) -> Option<Action> {
        if self.groups_focused {
            let group = self.highlighted_group()?;
            Some(Action::OpenTableGroup {
                connection_id: group.connection_id,
                group_id: group.id.clone(),
            })
        } else {
            self.highlighted_connection()
                .map(|c| Action::OpenConnection(c.connection_id))
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Completions
    // ─────────────────────────────────────────────────────────────────────────

    pub fn complete(&mut self, completion: Completion) -> Vec<Outbound> {
        let Completion {
            ticket,
            kind,
            result,
        } = completion;

        match kind {
            RequestKind::ListConnections => {
                if !self.pending_connections.as_ref().is_some_and(|p| p.answers(ticket)) {
                    debug!(%ticket, "discarding stale connection list");
                    return Vec::new();
                }
                self.pending_connections = None;
                self.connections = match result {
                    Ok(ApiReply::Connections(list)) => Fetch::Loaded(list),
                    Ok(other) => Fetch::Failed(unexpected(&other)),
                    Err(e) => Fetch::Failed(e.to_string()),
                };
                let len = self.connection_count();
                match self.table_state.selected() {
                    _ if len == 0 => self.table_state.select(None),
                    Some(i) if i >= len => self.table_state.select(Some(len - 1)),
                    None => self.table_state.select(Some(0)),
                    Some(_) => {}
                }
                Vec::new()
            }
            RequestKind::DashboardStats => {
                if !self.pending_stats.as_ref().is_some_and(|p| p.answers(ticket)) {
                    debug!(%ticket, "discarding stale home stats");
                    return Vec::new();
                }
                self.pending_stats = None;
                self.stats = match result {
                    Ok(ApiReply::DashboardStats(stats)) => Fetch::Loaded(stats),
                    Ok(other) => Fetch::Failed(unexpected(&other)),
                    Err(e) => Fetch::Failed(e.to_string()),
                };
                Vec::new()
            }
            RequestKind::GetConnection => {
                let Some(opened) = self.opened.as_mut() else {
                    return Vec::new();
                };
                if !opened.pending_record.as_ref().is_some_and(|p| p.answers(ticket)) {
                    debug!(%ticket, "discarding stale connection record");
                    return Vec::new();
                }
                opened.pending_record = None;
                opened.record = match result {
                    Ok(ApiReply::Connection(record)) => Fetch::Loaded(record),
                    Ok(other) => Fetch::Failed(unexpected(&other)),
                    Err(e) => Fetch::Failed(e.to_string()),
                };
                Vec::new()
            }
            RequestKind::ListTableGroups => {
                let Some(opened) = self.opened.as_mut() else {
                    return Vec::new();
                };
                if !opened.pending_groups.as_ref().is_some_and(|p| p.answers(ticket)) {
                    debug!(%ticket, "discarding stale table groups");
                    return Vec::new();
                }
                opened.pending_groups = None;
                opened.groups = match result {
                    Ok(ApiReply::TableGroups(groups)) => Fetch::Loaded(groups),
                    Ok(other) => Fetch::Failed(unexpected(&other)),
                    Err(e) => Fetch::Failed(e.to_string()),
                };
                let len = self.group_count();
                self.group_state
                    .select(if len == 0 { None } else { Some(0) });
                Vec::new()
            }
            RequestKind::GetTableGroup => {
                let Some(opened) = self.opened.as_mut() else {
                    return Vec::new();
                };
                if !opened
                    .pending_group_detail
                    .as_ref()
                    .is_some_and(|p| p.answers(ticket))
                {
                    debug!(%ticket, "discarding stale table group detail");
                    return Vec::new();
                }
                opened.pending_group_detail = None;
                opened.group_detail = match result {
                    Ok(ApiReply::TableGroup(group)) => Fetch::Loaded(group),
                    Ok(other) => Fetch::Failed(unexpected(&other)),
                    Err(e) => Fetch::Failed(e.to_string()),
                };
                Vec::new()
            }
            RequestKind::DeleteConnection => {
                let Some(pending) = self.pending_delete.take() else {
                    return Vec::new();
                };
                if !pending.answers(ticket) {
                    self.pending_delete = Some(pending);
                    return Vec::new();
                }
                match result {
                    Ok(reply) => {
                        self.notice = Some(Notice::Info(acknowledged(
                            &reply,
                            "Connection deleted.",
                        )));
                        if self.opened.as_ref().is_some_and(|o| o.id == pending.key) {
                            self.opened = None;
                            self.groups_focused = false;
                        }
                        self.refresh()
                    }
                    Err(e) => {
                        self.notice = Some(Notice::Error(e.user_message("Failed to delete connection.")));
                        Vec::new()
                    }
                }
            }
            RequestKind::DeleteTableGroup => {
                let Some(pending) = self.pending_group_delete.take() else {
                    return Vec::new();
                };
                if !pending.answers(ticket) {
                    self.pending_group_delete = Some(pending);
                    return Vec::new();
                }
                match result {
                    Ok(reply) => {
                        self.notice = Some(Notice::Info(acknowledged(
                            &reply,
                            "Table group deleted.",
                        )));
                        if let Some(opened) = self.opened.as_mut() {
                            if opened
                                .group_detail
                                .loaded()
                                .is_some_and(|g| g.id == pending.key.1)
                            {
                                opened.group_detail = Fetch::Idle;
                            }
                        }
                        self.reload_groups()
                    }
                    Err(e) => {
                        self.notice = Some(Notice::Error(e.user_message("Failed to delete table group.")));
                        Vec::new()
                    }
                }
            }
            _ => Vec::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────────

    pub fn draw_with(&mut self, frame: &mut Frame, area: Rect, palette: &Palette) -> Result<()> {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        self.render_stats(frame, rows[0], palette);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(rows[1]);

        self.render_connections(frame, columns[0], palette);
        self.render_opened(frame, columns[1], palette);
        Ok(())
    }

    fn render_stats(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let label = Style::default().fg(palette.accent).add_modifier(Modifier::BOLD);
        let mut spans = match &self.stats {
            Fetch::Loaded(stats) => vec![
                Span::styled(" Connections: ", label),
                Span::raw(stats.connections.to_string()),
                Span::styled("   Table Groups: ", label),
                Span::raw(stats.table_groups.to_string()),
                Span::styled("   Profiling Runs: ", label),
                Span::raw(stats.profiling_runs.to_string()),
            ],
            Fetch::Failed(message) => vec![Span::styled(
                format!(" Error loading stats: {}", message),
                palette.error(),
            )],
            Fetch::Loading | Fetch::Idle => vec![Span::styled(" Loading stats...", palette.muted())],
        };

        match &self.notice {
            Some(Notice::Info(message)) => {
                spans.push(Span::raw("   "));
                spans.push(Span::styled(message.clone(), Style::default().fg(palette.success)));
            }
            Some(Notice::Error(message)) => {
                spans.push(Span::raw("   "));
                spans.push(Span::styled(message.clone(), palette.error()));
            }
            None => {}
        }

        let paragraph = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(palette.border(false))
                .title(" Data Sources ")
                .title_style(palette.title()),
        );
        frame.render_widget(paragraph, area);
    }

    fn render_connections(&mut self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(palette.border(!self.groups_focused))
            .title(" Connections ")
            .title_style(palette.title());

        let connections = match &self.connections {
            Fetch::Loaded(list) if list.is_empty() => {
                render_note(frame, area, block, "No connections found.", palette.muted());
                return;
            }
            Fetch::Loaded(list) => list,
            Fetch::Failed(message) => {
                render_note(
                    frame,
                    area,
                    block,
                    &format!("Error loading connections. {}", message),
                    palette.error(),
                );
                return;
            }
            Fetch::Loading | Fetch::Idle => {
                render_note(frame, area, block, "Loading connections...", palette.muted());
                return;
            }
        };

        let opened_id = self.opened.as_ref().map(|o| o.id);
        let rows: Vec<Row> = connections
            .iter()
            .map(|c| {
                let marker = if Some(c.connection_id) == opened_id { "▶" } else { " " };
                Row::new(vec![
                    Cell::from(Span::styled(marker, Style::default().fg(palette.accent))),
                    Cell::from(truncate(&c.connection_name, 24)),
                    Cell::from(c.flavor_label()),
                    Cell::from(truncate(&c.project_code, 16)),
                    Cell::from(truncate(c.database(), 16)),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(1),
                Constraint::Min(12),
                Constraint::Length(12),
                Constraint::Length(16),
                Constraint::Length(16),
            ],
        )
        .header(Row::new(vec!["", "Name", "Type", "Project", "Database"]).style(palette.header()))
        .block(block)
        .highlight_style(palette.highlight());

        frame.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn render_opened(&mut self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let Some(opened) = &self.opened else {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(palette.border(false))
                .title(" Connection ")
                .title_style(palette.title());
            render_note(
                frame,
                area,
                block,
                "Press Enter on a connection to see its table groups.",
                palette.muted(),
            );
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6),
                Constraint::Min(4),
                Constraint::Length(8),
            ])
            .split(area);

        let record_block = Block::default()
            .borders(Borders::ALL)
            .border_style(palette.border(false))
            .title(" Connection ")
            .title_style(palette.title());
        match &opened.record {
            Fetch::Loaded(record) => {
                let label = Style::default().fg(palette.accent).add_modifier(Modifier::BOLD);
                let lines = vec![
                    Line::from(vec![
                        Span::styled("Name: ", label),
                        Span::raw(record.connection_name.clone()),
                        Span::raw("  "),
                        Span::styled("Type: ", label),
                        Span::raw(record.flavor_label()),
                    ]),
                    Line::from(vec![
                        Span::styled("Host: ", label),
                        Span::raw(format!("{}:{}", record.host(), record.port())),
                    ]),
                    Line::from(vec![
                        Span::styled("User: ", label),
                        Span::raw(record.project_user.clone()),
                        Span::raw("  "),
                        Span::styled("Database: ", label),
                        Span::raw(record.database().to_string()),
                    ]),
                    Line::from(Span::styled(
                        record.connection_description.clone().unwrap_or_default(),
                        palette.muted(),
                    )),
                ];
                frame.render_widget(Paragraph::new(lines).block(record_block), chunks[0]);
            }
            Fetch::Failed(message) => render_note(
                frame,
                chunks[0],
                record_block,
                &format!("Error loading connection: {}", message),
                palette.error(),
            ),
            Fetch::Loading | Fetch::Idle => {
                render_note(frame, chunks[0], record_block, "Loading...", palette.muted())
            }
        }

        let groups_block = Block::default()
            .borders(Borders::ALL)
            .border_style(palette.border(self.groups_focused))
            .title(" Table Groups ")
            .title_style(palette.title());
        match &opened.groups {
            Fetch::Loaded(groups) if groups.is_empty() => render_note(
                frame,
                chunks[1],
                groups_block,
                "No table groups yet. Press g to create one.",
                palette.muted(),
            ),
            Fetch::Loaded(groups) => {
                let items: Vec<ListItem> = groups
                    .iter()
                    .map(|g| {
                        ListItem::new(Line::from(vec![
                            Span::styled(g.table_groups_name.clone(), Style::default().fg(palette.text)),
                            Span::styled(format!("  {}", g.scope()), palette.muted()),
                        ]))
                    })
                    .collect();
                let list = List::new(items)
                    .block(groups_block)
                    .highlight_style(palette.highlight());
                frame.render_stateful_widget(list, chunks[1], &mut self.group_state);
            }
            Fetch::Failed(message) => render_note(
                frame,
                chunks[1],
                groups_block,
                &format!("Error loading table groups: {}", message),
                palette.error(),
            ),
            Fetch::Loading | Fetch::Idle => {
                render_note(frame, chunks[1], groups_block, "Loading...", palette.muted())
            }
        }

        let detail_block = Block::default()
            .borders(Borders::ALL)
            .border_style(palette.border(false))
            .title(" Table Group ")
            .title_style(palette.title());
        match &opened.group_detail {
            Fetch::Loaded(group) => {
                frame.render_widget(
                    Paragraph::new(group_lines(group, palette))
                        .wrap(Wrap { trim: true })
                        .block(detail_block),
                    chunks[2],
                );
            }
            Fetch::Failed(message) => render_note(
                frame,
                chunks[2],
                detail_block,
                &format!("Error loading table group: {}", message),
                palette.error(),
            ),
            Fetch::Loading => render_note(frame, chunks[2], detail_block, "Loading...", palette.muted()),
            Fetch::Idle => render_note(
                frame,
                chunks[2],
                detail_block,
                "Press Enter on a table group for details.",
                palette.muted(),
            ),
        }
    }
}

impl Component for DataSourcesComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => Some(Action::NextItem),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::PrevItem),
            KeyCode::Enter => Some(Action::ActivateItem),
            KeyCode::Right | KeyCode::Char('l') if self.opened.is_some() => {
                self.groups_focused = true;
                None
            }
            KeyCode::Left | KeyCode::Esc if self.groups_focused => {
                self.groups_focused = false;
                None
            }
            KeyCode::Char('a') => Some(Action::OpenNewConnection),
            KeyCode::Char('e') => Some(Action::OpenEditConnection),
            KeyCode::Char('x') => Some(Action::RequestDeleteConnection),
            KeyCode::Char('g') => Some(Action::OpenNewTableGroup),
            KeyCode::Char('X') => Some(Action::RequestDeleteTableGroup),
            KeyCode::Char('p') => Some(Action::OpenTriggerProfiling),
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let palette = Palette::for_mode(Default::default());
        self.draw_with(frame, area, &palette)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helper functions
// ─────────────────────────────────────────────────────────────────────────────

fn step(state: &mut ListState, len: usize, forward: bool) {
    if len == 0 {
        state.select(None);
        return;
    }
    let index = match (state.selected(), forward) {
        (Some(i), true) if i + 1 < len => i + 1,
        (_, true) => 0,
        (Some(i), false) if i > 0 && i < len => i - 1,
        (_, false) => len - 1,
    };
    state.select(Some(index));
}

fn acknowledged(reply: &ApiReply, fallback: &str) -> String {
    match reply {
        ApiReply::Acknowledged(response) => response
            .message
            .clone()
            .unwrap_or_else(|| fallback.to_string()),
        _ => fallback.to_string(),
    }
}

fn render_note(frame: &mut Frame, area: Rect, block: Block, message: &str, style: Style) {
    let paragraph = Paragraph::new(Span::styled(message.to_string(), style))
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(paragraph, area);
}

fn group_lines(group: &TableGroup, palette: &Palette) -> Vec<Line<'static>> {
    let label = Style::default().fg(palette.accent).add_modifier(Modifier::BOLD);
    let field = |name: &str, value: String| {
        Line::from(vec![Span::styled(format!("{}: ", name), label), Span::raw(value)])
    };
    let or_dash = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    vec![
        field("Name", group.table_groups_name.clone()),
        field("Schema", or_dash(&group.table_group_schema)),
        field("Scope", group.scope()),
        field(
            "Sampling",
            if group.uses_sampling() {
                format!(
                    "{}% (min {})",
                    group.profile_sample_percent.unwrap_or_default(),
                    group.profile_sample_min_count.unwrap_or_default()
                )
            } else {
                "off".to_string()
            },
        ),
        field(
            "Last Run",
            or_dash(&group.last_complete_profile_run_id),
        ),
        field("Description", or_dash(&group.description)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::connection::MessageResponse;
    use crate::services::api::ApiError;
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::json;

    fn answer(out: &Outbound, result: Result<ApiReply, ApiError>) -> Completion {
        Completion {
            ticket: out.ticket,
            kind: out.request.kind(),
            result,
        }
    }

    fn prod_connection() -> Connection {
        serde_json::from_value(json!({
            "connection_id": 7,
            "connection_name": "Prod",
            "sql_flavor": "PostgreSQL",
            "project_db": "sales"
        }))
        .unwrap()
    }

    fn group(id: &str) -> TableGroup {
        serde_json::from_value(json!({
            "id": id,
            "connection_id": 7,
            "table_groups_name": format!("group {}", id)
        }))
        .unwrap()
    }

    fn loaded() -> DataSourcesComponent {
        let mut screen = DataSourcesComponent::new();
        let out = screen.refresh();
        screen.complete(answer(&out[0], Ok(ApiReply::Connections(vec![prod_connection()]))));
        screen
    }

    fn render(screen: &mut DataSourcesComponent) -> String {
        let palette = Palette::for_mode(Default::default());
        let mut terminal = Terminal::new(TestBackend::new(140, 30)).unwrap();
        terminal
            .draw(|frame| {
                screen.draw_with(frame, frame.area(), &palette).unwrap();
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_refresh_requests_connections_and_stats() {
        let mut screen = DataSourcesComponent::new();
        let out = screen.refresh();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].request, ApiRequest::ListConnections);
        assert_eq!(out[1].request, ApiRequest::DashboardStats);
        assert!(screen.connections.is_loading());
    }

    #[test]
    fn test_connection_row_and_enter_opens_it() {
        let mut screen = loaded();
        let text = render(&mut screen);
        assert!(text.contains("Prod"));
        assert!(text.contains("PostgreSQL"));
        assert!(text.contains("sales"));

        assert_eq!(screen.activate(), Some(Action::OpenConnection(7)));

        let out = screen.open_connection(7);
        assert_eq!(out[0].request, ApiRequest::GetConnection { id: 7 });
        assert_eq!(out[1].request, ApiRequest::ListTableGroups { connection_id: 7 });
    }

    #[test]
    fn test_empty_and_error_states_differ() {
        let mut empty = DataSourcesComponent::new();
        let out = empty.refresh();
        empty.complete(answer(&out[0], Ok(ApiReply::Connections(Vec::new()))));
        assert!(render(&mut empty).contains("No connections found."));

        let mut failed = DataSourcesComponent::new();
        let out = failed.refresh();
        failed.complete(answer(&out[0], Err(ApiError::Transport("refused".to_string()))));
        assert!(render(&mut failed).contains("Error loading connections."));
    }

    #[test]
    fn test_stale_group_list_is_discarded() {
        let mut screen = loaded();
        let first = screen.open_connection(7);
        let second = screen.reload_groups();

        screen.complete(answer(&first[1], Ok(ApiReply::TableGroups(vec![group("old")]))));
        assert!(screen.opened.as_ref().unwrap().groups.is_loading());

        screen.complete(answer(&second[0], Ok(ApiReply::TableGroups(vec![group("a"), group("b")]))));
        assert_eq!(screen.opened.as_ref().unwrap().groups.loaded().unwrap().len(), 2);
        assert_eq!(screen.group_state.selected(), Some(0));

        screen.groups_focused = true;
        screen.next();
        assert_eq!(screen.highlighted_group().unwrap().id, "b");
        assert_eq!(
            screen.activate(),
            Some(Action::OpenTableGroup {
                connection_id: 7,
                group_id: "b".to_string()
            })
        );
    }

    #[test]
    fn test_delete_connection_closes_it_and_refreshes() {
        let mut screen = loaded();
        screen.open_connection(7);
        let out = screen.delete_connection(7);
        let follow_up = screen.complete(answer(
            &out[0],
            Ok(ApiReply::Acknowledged(MessageResponse {
                status: Some("success".to_string()),
                message: Some("Connection deleted".to_string()),
            })),
        ));

        assert!(screen.opened.is_none());
        assert_eq!(screen.notice, Some(Notice::Info("Connection deleted".to_string())));
        assert_eq!(follow_up.len(), 2);
        assert_eq!(follow_up[0].request, ApiRequest::ListConnections);
    }

    #[test]
    fn test_failed_group_delete_keeps_groups() {
        let mut screen = loaded();
        let opened = screen.open_connection(7);
        screen.complete(answer(&opened[1], Ok(ApiReply::TableGroups(vec![group("a")]))));

        let out = screen.delete_table_group(7, "a");
        let follow_up = screen.complete(answer(
            &out[0],
            Err(ApiError::Backend {
                status: 409,
                message: "Table group has runs".to_string(),
            }),
        ));
        assert!(follow_up.is_empty());
        assert_eq!(screen.notice, Some(Notice::Error("Table group has runs".to_string())));
        assert!(screen.opened.as_ref().unwrap().groups.loaded().is_some());
    }

    #[test]
    fn test_navigation_wraps() {
        let mut screen = DataSourcesComponent::new();
        let out = screen.refresh();
        let mut second = prod_connection();
        second.connection_id = 8;
        screen.complete(answer(
            &out[0],
            Ok(ApiReply::Connections(vec![prod_connection(), second])),
        ));
        assert_eq!(screen.table_state.selected(), Some(0));
        screen.next();
        screen.next();
        assert_eq!(screen.table_state.selected(), Some(0));
        screen.previous();
        assert_eq!(screen.highlighted_connection().unwrap().connection_id, 8);
    }
}
