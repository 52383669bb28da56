//! Run list panel - summary cards, score gauges and recent profiling runs
//!
//! Highlight movement is local to this panel; `Enter` asks the App to make
//! the highlighted run the selected one.

use crate::action::Action;
use crate::component::Component;
use crate::components::charts::draw_gauge;
use crate::components::text::truncate;
use crate::components::theme::Palette;
use crate::model::dashboard::Dashboard;
use crate::model::fetch::Fetch;
use crate::model::profiling::{format_count, RunSummaryStats};
use crate::model::timestamp;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Summary Cards
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryCard {
    Tables,
    Columns,
    RowCount,
    MissingValues,
}

impl SummaryCard {
    pub fn all() -> Vec<SummaryCard> {
        vec![
            SummaryCard::Tables,
            SummaryCard::Columns,
            SummaryCard::RowCount,
            SummaryCard::MissingValues,
        ]
    }

    pub fn title(&self) -> &str {
        match self {
            SummaryCard::Tables => "Tables",
            SummaryCard::Columns => "Columns",
            SummaryCard::RowCount => "Row Count",
            SummaryCard::MissingValues => "Missing Values",
        }
    }

    pub fn value(&self, stats: &RunSummaryStats) -> String {
        let raw = match self {
            SummaryCard::Tables => stats.tables,
            SummaryCard::Columns => stats.columns,
            SummaryCard::RowCount => stats.row_count,
            SummaryCard::MissingValues => stats.missing_values,
        };
        format_count(raw)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Run List Component
// ═══════════════════════════════════════════════════════════════════════════════

pub struct RunListComponent {
    pub table_state: TableState,
    cards: Vec<SummaryCard>,
    focused_card: usize,
    /// Run id the highlight was last moved to by a selection change
    synced_run: Option<String>,
}

impl Default for RunListComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl RunListComponent {
    pub fn new() -> Self {
        Self {
            table_state: TableState::default(),
            cards: SummaryCard::all(),
            focused_card: 0,
            synced_run: None,
        }
    }

    pub fn cards(&self) -> &[SummaryCard] {
        &self.cards
    }

    pub fn focused_card(&self) -> SummaryCard {
        self.cards[self.focused_card]
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Card Ordering
    // ─────────────────────────────────────────────────────────────────────────

    pub fn focus_next_card(&mut self) {
        self.focused_card = (self.focused_card + 1) % self.cards.len();
    }

    pub fn focus_previous_card(&mut self) {
        self.focused_card = (self.focused_card + self.cards.len() - 1) % self.cards.len();
    }

    /// Swap the focused card with its left neighbour; focus moves with it
    pub fn move_card_left(&mut self) {
        if self.focused_card > 0 {
            self.cards.swap(self.focused_card, self.focused_card - 1);
            self.focused_card -= 1;
        }
    }

    pub fn move_card_right(&mut self) {
        if self.focused_card + 1 < self.cards.len() {
            self.cards.swap(self.focused_card, self.focused_card + 1);
            self.focused_card += 1;
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Highlight Navigation
    // ─────────────────────────────────────────────────────────────────────────

    fn run_ids(dashboard: &Dashboard) -> Vec<String> {
        dashboard
            .runs
            .overview
            .loaded()
            .map(|o| {
                o.runs_newest_first()
                    .into_iter()
                    .map(|r| r.profiling_id.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn next(&mut self, dashboard: &Dashboard) {
        let len = Self::run_ids(dashboard).len();
        if len == 0 {
            return;
        }
        let next = match self.table_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.table_state.select(Some(next));
    }

    pub fn previous(&mut self, dashboard: &Dashboard) {
        let len = Self::run_ids(dashboard).len();
        if len == 0 {
            return;
        }
        let prev = match self.table_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(prev));
    }

    pub fn select_first(&mut self, dashboard: &Dashboard) {
        if !Self::run_ids(dashboard).is_empty() {
            self.table_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self, dashboard: &Dashboard) {
        let len = Self::run_ids(dashboard).len();
        if len > 0 {
            self.table_state.select(Some(len - 1));
        }
    }

    pub fn highlighted_run_id(&self, dashboard: &Dashboard) -> Option<String> {
        let index = self.table_state.selected()?;
        Self::run_ids(dashboard).into_iter().nth(index)
    }

    /// Move the highlight onto the selected run when the selection changed
    /// since the last call
    pub fn follow_selection(&mut self, dashboard: &Dashboard) {
        let selected = dashboard.selection().run_id().map(str::to_string);
        if selected == self.synced_run {
            return;
        }
        if let Some(run_id) = &selected {
            if let Some(index) = Self::run_ids(dashboard).iter().position(|id| id == run_id) {
                self.table_state.select(Some(index));
            }
        }
        self.synced_run = selected;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────────

    pub fn draw_with(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        dashboard: &Dashboard,
        palette: &Palette,
        focused: bool,
    ) -> Result<()> {
        let overview = match &dashboard.runs.overview {
            Fetch::Loaded(overview) => overview,
            Fetch::Failed(message) => {
                render_message(
                    frame,
                    area,
                    &format!("Error loading dashboard: {}", message),
                    palette.error(),
                    palette,
                    focused,
                );
                return Ok(());
            }
            Fetch::Loading | Fetch::Idle => {
                render_message(
                    frame,
                    area,
                    "Loading dashboard...",
                    palette.muted(),
                    palette,
                    focused,
                );
                return Ok(());
            }
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(area);

        self.render_cards(frame, chunks[0], &overview.summary, palette);
        render_gauges(frame, chunks[1], &overview.summary, palette);

        let runs = overview.runs_newest_first();
        let selected_run = dashboard.selection().run_id();

        if runs.is_empty() {
            render_message(
                frame,
                chunks[2],
                "No profiling runs yet.",
                palette.muted(),
                palette,
                focused,
            );
            return Ok(());
        }

        let rows: Vec<Row> = runs
            .iter()
            .map(|run| {
                let marker = if Some(run.profiling_id.as_str()) == selected_run {
                    "●"
                } else {
                    " "
                };
                Row::new(vec![
                    Cell::from(Span::styled(marker, Style::default().fg(palette.accent))),
                    Cell::from(truncate(&run.profiling_id, 14)),
                    Cell::from(timestamp::format_optional(run.profiling_time.as_ref())),
                    Cell::from(Span::styled(
                        run.status.clone(),
                        Style::default().fg(palette.status_color(&run.status)),
                    )),
                    Cell::from(run.tables.to_string()),
                ])
            })
            .collect();

        let header = Row::new(vec!["", "Run", "Profiled", "Status", "Tables"]).style(palette.header());

        let table = Table::new(
            rows,
            [
                Constraint::Length(1),
                Constraint::Length(14),
                Constraint::Length(22),
                Constraint::Length(10),
                Constraint::Min(6),
            ],
        )
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(palette.border(focused))
                .title(format!(" Recent Runs ({}) ", runs.len()))
                .title_style(palette.title()),
        )
        .highlight_style(palette.highlight().add_modifier(Modifier::BOLD));

        frame.render_stateful_widget(table, chunks[2], &mut self.table_state);
        Ok(())
    }

    fn render_cards(&self, frame: &mut Frame, area: Rect, stats: &RunSummaryStats, palette: &Palette) {
        let constraints: Vec<Constraint> = self
            .cards
            .iter()
            .map(|_| Constraint::Ratio(1, self.cards.len() as u32))
            .collect();
        let slots = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(area);

        for (i, card) in self.cards.iter().enumerate() {
            let focused = i == self.focused_card;
            let paragraph = Paragraph::new(Line::from(Span::styled(
                card.value(stats),
                Style::default().fg(palette.text).add_modifier(Modifier::BOLD),
            )))
            .alignment(ratatui::layout::Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(palette.border(focused))
                    .title(format!(" {} ", card.title()))
                    .title_style(if focused {
                        palette.title()
                    } else {
                        palette.muted()
                    }),
            );
            frame.render_widget(paragraph, slots[i]);
        }
    }
}

impl Component for RunListComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => Some(Action::NextItem),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::PrevItem),
            KeyCode::Home => Some(Action::FirstItem),
            KeyCode::End | KeyCode::Char('G') => Some(Action::LastItem),
            KeyCode::Enter => Some(Action::ActivateItem),
            KeyCode::Char('[') => Some(Action::MoveCardLeft),
            KeyCode::Char(']') => Some(Action::MoveCardRight),
            KeyCode::Left => {
                self.focus_previous_card();
                None
            }
            KeyCode::Right => {
                self.focus_next_card();
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::MoveCardLeft => self.move_card_left(),
            Action::MoveCardRight => self.move_card_right(),
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

fn render_gauges(frame: &mut Frame, area: Rect, stats: &RunSummaryStats, palette: &Palette) {
    let slots = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    draw_gauge(
        frame,
        slots[0],
        "Data Quality Score",
        stats.dq_score.map(|s| s * 100.0),
        palette,
    );
    draw_gauge(frame, slots[1], "CDE Score", stats.completeness_percentage, palette);
    draw_gauge(
        frame,
        slots[2],
        "Distinctness",
        stats.distinct_values_percentage,
        palette,
    );
}

fn render_message(
    frame: &mut Frame,
    area: Rect,
    message: &str,
    style: Style,
    palette: &Palette,
    focused: bool,
) {
    let paragraph = Paragraph::new(Span::styled(message.to_string(), style))
        .wrap(ratatui::widgets::Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(palette.border(focused))
                .title(" Recent Runs ")
                .title_style(palette.title()),
        );
    frame.render_widget(paragraph, area);
}
