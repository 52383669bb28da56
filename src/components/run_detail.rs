//! Run detail panel - the selected run's tables and the selected table's
//! profile (DQ trend, column types, value distribution)

use crate::action::Action;
use crate::component::Component;
use crate::components::charts::draw_dq_trend;
use crate::components::text::truncate;
use crate::components::theme::Palette;
use crate::model::dashboard::Dashboard;
use crate::model::fetch::Fetch;
use crate::model::profiling::{format_count, format_percent, DqTrend, TableDetail};
use crate::model::timestamp;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, List, ListItem, ListState, Paragraph, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Wrap,
    },
    Frame,
};

const NO_RUN_SELECTED: &str = "Select a run from the left panel to see details.";
const NO_TABLES: &str = "No tables found for this run.";
const NO_TABLE_SELECTED: &str = "Select a table from the list.";
const LOADING_DETAIL: &str = "Loading Table Details...";
const NOT_ENOUGH_TREND: &str = "Not enough historical data to show DQ score trend for this table.";

pub struct RunDetailComponent {
    pub list_state: ListState,
    pub detail_scroll: usize,
    /// Whether keys scroll the detail instead of moving the table highlight
    pub detail_focused: bool,
    /// Whether the table list pane has focus
    pub list_focused: bool,
    synced: Option<(String, Option<String>)>,
}

impl Default for RunDetailComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl RunDetailComponent {
    pub fn new() -> Self {
        Self {
            list_state: ListState::default(),
            detail_scroll: 0,
            detail_focused: false,
            list_focused: false,
            synced: None,
        }
    }

    fn table_names(dashboard: &Dashboard) -> &[String] {
        dashboard
            .detail
            .table_names
            .loaded()
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn next(&mut self, dashboard: &Dashboard) {
        let len = Self::table_names(dashboard).len();
        if len == 0 {
            return;
        }
        let next = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(next));
    }

    pub fn previous(&mut self, dashboard: &Dashboard) {
        let len = Self::table_names(dashboard).len();
        if len == 0 {
            return;
        }
        let prev = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(prev));
    }

    pub fn select_first(&mut self, dashboard: &Dashboard) {
        if !Self::table_names(dashboard).is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self, dashboard: &Dashboard) {
        let len = Self::table_names(dashboard).len();
        if len > 0 {
            self.list_state.select(Some(len - 1));
        }
    }

    pub fn highlighted_table(&self, dashboard: &Dashboard) -> Option<String> {
        let index = self.list_state.selected()?;
        Self::table_names(dashboard).get(index).cloned()
    }

    /// Move the highlight onto the selected table, and reset the detail
    /// scroll, whenever the (run, table) selection changed
    pub fn follow_selection(&mut self, dashboard: &Dashboard) {
        let selection = dashboard.selection();
        let current = selection
            .run_id()
            .map(|run| (run.to_string(), selection.table_name().map(str::to_string)));
        if current == self.synced {
            return;
        }
        self.detail_scroll = 0;
        let index = selection
            .table_name()
            .and_then(|name| Self::table_names(dashboard).iter().position(|n| n == name));
        self.list_state.select(index);
        self.synced = current;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────────

    pub fn draw_with(
        &mut self,
        frame: &mut Frame,
        tables_area: Rect,
        detail_area: Rect,
        dashboard: &Dashboard,
        palette: &Palette,
    ) -> Result<()> {
        self.render_table_list(frame, tables_area, dashboard, palette);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(palette.border(self.detail_focused))
            .title(" Table Details ")
            .title_style(palette.title());

        if dashboard.selection().run_id().is_none() {
            render_note(frame, detail_area, block, NO_RUN_SELECTED, palette.muted());
            return Ok(());
        }

        match &dashboard.detail.table_names {
            Fetch::Loaded(names) if names.is_empty() => {
                render_note(frame, detail_area, block, NO_TABLES, palette.muted());
                return Ok(());
            }
            Fetch::Failed(_) => {
                render_note(frame, detail_area, block, NO_TABLE_SELECTED, palette.muted());
                return Ok(());
            }
            _ => {}
        }

        match &dashboard.detail.detail {
            Fetch::Idle => {
                render_note(frame, detail_area, block, NO_TABLE_SELECTED, palette.muted())
            }
            Fetch::Loading => {
                render_note(frame, detail_area, block, LOADING_DETAIL, palette.muted())
            }
            Fetch::Failed(message) => render_note(
                frame,
                detail_area,
                block,
                &format!("Error loading table details: {}", message),
                palette.error(),
            ),
            Fetch::Loaded(detail) => self.render_detail(frame, detail_area, block, detail, palette),
        }
        Ok(())
    }

    fn render_table_list(&mut self, frame: &mut Frame, area: Rect, dashboard: &Dashboard, palette: &Palette) {
        let focused = self.list_focused;
        let count = dashboard
            .detail
            .table_names
            .loaded()
            .filter(|names| !names.is_empty())
            .map(Vec::len);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(palette.border(focused))
            .title(match count {
                Some(n) => format!(" Tables ({}) ", n),
                None => " Tables ".to_string(),
            })
            .title_style(palette.title());

        if dashboard.selection().run_id().is_none() {
            render_note(frame, area, block, NO_RUN_SELECTED, palette.muted());
            return;
        }

        let names = match &dashboard.detail.table_names {
            Fetch::Idle | Fetch::Loading => {
                render_note(frame, area, block, "Loading tables...", palette.muted());
                return;
            }
            Fetch::Failed(message) => {
                render_note(
                    frame,
                    area,
                    block,
                    &format!("Error loading tables: {}", message),
                    palette.error(),
                );
                return;
            }
            Fetch::Loaded(names) if names.is_empty() => {
                render_note(frame, area, block, NO_TABLES, palette.muted());
                return;
            }
            Fetch::Loaded(names) => names,
        };

        let selected = dashboard.selection().table_name();
        let width = area.width.saturating_sub(4) as usize;
        let items: Vec<ListItem> = names
            .iter()
            .map(|name| {
                let style = if Some(name.as_str()) == selected {
                    Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(palette.text)
                };
                ListItem::new(Line::from(Span::styled(truncate(name, width), style)))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(palette.highlight());

        frame.render_stateful_widget(list, area, &mut self.list_state);
    }

    fn render_detail(
        &self,
        frame: &mut Frame,
        area: Rect,
        block: Block,
        detail: &TableDetail,
        palette: &Palette,
    ) {
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let trend = detail.dq_trend();
        let trend_height = match trend {
            DqTrend::Series(_) => 12,
            DqTrend::NotEnoughData => 1,
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(trend_height),
                Constraint::Min(0),
            ])
            .split(inner);

        frame.render_widget(Paragraph::new(detail_header(detail, palette)), chunks[0]);

        match &trend {
            DqTrend::Series(points) => draw_dq_trend(frame, chunks[1], points, palette),
            DqTrend::NotEnoughData => {
                frame.render_widget(
                    Paragraph::new(Span::styled(NOT_ENOUGH_TREND, palette.muted())),
                    chunks[1],
                );
            }
        }

        let lines = detail_sections(detail, palette);
        let total = lines.len();
        let visible_height = chunks[2].height as usize;
        let scroll = self.detail_scroll.min(total.saturating_sub(visible_height));

        let body = Paragraph::new(lines).scroll((scroll as u16, 0));
        frame.render_widget(body, chunks[2]);

        if total > visible_height {
            let mut scrollbar_state =
                ScrollbarState::new(total.saturating_sub(visible_height)).position(scroll);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                chunks[2],
                &mut scrollbar_state,
            );
        }
    }
}

impl Component for RunDetailComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down if self.detail_focused => Some(Action::ScrollDown),
            KeyCode::Char('k') | KeyCode::Up if self.detail_focused => Some(Action::ScrollUp),
            KeyCode::Char('j') | KeyCode::Down => Some(Action::NextItem),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::PrevItem),
            KeyCode::Home => Some(Action::FirstItem),
            KeyCode::End | KeyCode::Char('G') => Some(Action::LastItem),
            KeyCode::Enter if !self.detail_focused => Some(Action::ActivateItem),
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::PageDown)
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::PageUp)
            }
            KeyCode::PageDown => Some(Action::PageDown),
            KeyCode::PageUp => Some(Action::PageUp),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::ScrollUp => self.detail_scroll = self.detail_scroll.saturating_sub(1),
            Action::ScrollDown => self.detail_scroll = self.detail_scroll.saturating_add(1),
            Action::PageUp => self.detail_scroll = self.detail_scroll.saturating_sub(10),
            Action::PageDown => self.detail_scroll = self.detail_scroll.saturating_add(10),
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, _frame: &mut Frame, _area: Rect) -> Result<()> {
        // Needs the dashboard state, so the App calls draw_with
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helper functions
// ─────────────────────────────────────────────────────────────────────────────

fn render_note(frame: &mut Frame, area: Rect, block: Block, message: &str, style: Style) {
    let paragraph = Paragraph::new(Span::styled(message.to_string(), style))
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(paragraph, area);
}

fn detail_header(detail: &TableDetail, palette: &Palette) -> Vec<Line<'static>> {
    let label = Style::default().fg(palette.accent).add_modifier(Modifier::BOLD);
    vec![
        Line::from(vec![
            Span::styled("Details for: ", label),
            Span::styled(detail.table_name.clone(), palette.header()),
        ]),
        Line::from(vec![
            Span::styled("Last Profiled: ", label),
            Span::raw(timestamp::format_optional(detail.profiling_time.as_ref())),
            Span::raw(" | "),
            Span::styled("Status: ", label),
            Span::styled(
                detail.status.clone(),
                Style::default().fg(palette.status_color(&detail.status)),
            ),
        ]),
        Line::from(vec![
            Span::styled("Profiling Score: ", label),
            Span::raw(format_percent(detail.profiling_score)),
            Span::raw(" | "),
            Span::styled("Distinct: ", label),
            Span::raw(format_percent(detail.distinct_value_percentage)),
            Span::raw(" | "),
            Span::styled("Completeness: ", label),
            Span::raw(format_percent(detail.completeness_percentage)),
        ]),
    ]
}

fn detail_sections(detail: &TableDetail, palette: &Palette) -> Vec<Line<'static>> {
    let section = Style::default().fg(palette.accent).add_modifier(Modifier::BOLD);
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Column Data Types", section)));
    if detail.column_data_types.is_empty() {
        lines.push(Line::from(Span::styled(
            "No column data types found.",
            palette.muted(),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            format!("{:<28} {:<20} {}", "Column", "Type", "General"),
            palette.header(),
        )));
        for column in &detail.column_data_types {
            lines.push(Line::from(format!(
                "{:<28} {:<20} {}",
                truncate(&column.column_name, 28),
                truncate(&column.column_type, 20),
                column.general_type.as_deref().unwrap_or("-"),
            )));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Data Distribution", section)));
    if detail.data_distribution.is_empty() {
        lines.push(Line::from(Span::styled(
            "No data distribution details found.",
            palette.muted(),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            format!(
                "{:<28} {:<14} {:>10} {:>10} {:>10}",
                "Column", "Type", "Distinct", "Missing", "Empty"
            ),
            palette.header(),
        )));
        for entry in &detail.data_distribution {
            lines.push(Line::from(format!(
                "{:<28} {:<14} {:>10} {:>10} {:>10}",
                truncate(&entry.column, 28),
                truncate(&entry.data_type, 14),
                format_count(entry.distinct_values),
                format_count(entry.missing_values),
                format_count(entry.empty_values),
            )));
        }
    }

    lines
}
