//! History dialog component
//!
//! Lists profiling runs from the home stats, with the latest run summary on
//! top and column-level profile results for the highlighted run.

use crate::action::Action;
use crate::component::Component;
use crate::components::text::truncate;
use crate::components::theme::Palette;
use crate::model::fetch::{Fetch, Pending};
use crate::model::profiling::{DashboardStats, LatestProfilingRun, ProfileResult, RunInfo};
use crate::model::timestamp;
use crate::services::worker::{ApiReply, ApiRequest, Completion, Outbound, RequestKind};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Clear, List, ListItem, ListState, Paragraph, Scrollbar,
        ScrollbarOrientation, ScrollbarState,
    },
    Frame,
};
use tracing::debug;

/// Run history overlay
pub struct HistoryDialog {
    pub stats: Fetch<DashboardStats>,
    pub latest: Fetch<LatestProfilingRun>,
    pub results: Fetch<Vec<ProfileResult>>,
    pub selected_index: usize,
    pub detail_scroll: usize,
    pending_stats: Option<Pending<()>>,
    pending_latest: Option<Pending<()>>,
    pending_results: Option<Pending<String>>,
}

impl Default for HistoryDialog {
    fn default() -> Self {
        Self {
            stats: Fetch::Idle,
            latest: Fetch::Idle,
            results: Fetch::Idle,
            selected_index: 0,
            detail_scroll: 0,
            pending_stats: None,
            pending_latest: None,
            pending_results: None,
        }
    }
}

impl HistoryDialog {
    /// Reset and fetch the run list plus the latest run summary
    pub fn open(&mut self) -> Vec<Outbound> {
        *self = Self::default();
        let stats = Pending::new(());
        let latest = Pending::new(());
        let outbound = vec![
            Outbound::new(stats.ticket, ApiRequest::DashboardStats),
            Outbound::new(latest.ticket, ApiRequest::LatestProfilingRun),
        ];
        self.stats = Fetch::Loading;
        self.latest = Fetch::Loading;
        self.pending_stats = Some(stats);
        self.pending_latest = Some(latest);
        outbound
    }

    fn runs(&self) -> &[RunInfo] {
        self.stats.loaded().map(|s| s.runs.as_slice()).unwrap_or(&[])
    }

    pub fn selected_run(&self) -> Option<&RunInfo> {
        self.runs().get(self.selected_index)
    }

    /// Fetch column-level results for the highlighted run
    pub fn load_results(&mut self) -> Vec<Outbound> {
        let Some(run) = self.selected_run() else {
            return Vec::new();
        };
        let request = ApiRequest::ProfileResults {
            connection_id: run.connection_id,
            group_id: run.table_groups_id.clone(),
            run_id: run.profiling_id.clone(),
        };
        let pending = Pending::new(run.profiling_id.clone());
        let ticket = pending.ticket;
        self.pending_results = Some(pending);
        self.results = Fetch::Loading;
        self.detail_scroll = 0;
        vec![Outbound::new(ticket, request)]
    }

    /// Run id the loaded (or loading) results belong to
    pub fn results_run(&self) -> Option<&str> {
        self.pending_results.as_ref().map(|p| p.key.as_str())
    }

    pub fn complete(&mut self, completion: Completion) {
        let Completion {
            ticket,
            kind,
            result,
        } = completion;
        match kind {
            RequestKind::DashboardStats => {
                if !self.pending_stats.as_ref().is_some_and(|p| p.answers(ticket)) {
                    debug!(%ticket, "discarding stale history stats");
                    return;
                }
                self.stats = match result {
                    Ok(ApiReply::DashboardStats(stats)) => Fetch::Loaded(stats),
                    Ok(_) => Fetch::Failed("unexpected response".to_string()),
                    Err(e) => Fetch::Failed(e.to_string()),
                };
                let count = self.runs().len();
                self.selected_index = self.selected_index.min(count.saturating_sub(1));
            }
            RequestKind::LatestProfilingRun => {
                if !self.pending_latest.as_ref().is_some_and(|p| p.answers(ticket)) {
                    return;
                }
                self.latest = match result {
                    Ok(ApiReply::LatestProfilingRun(latest)) => Fetch::Loaded(latest),
                    Ok(_) => Fetch::Failed("unexpected response".to_string()),
                    Err(e) => Fetch::Failed(e.to_string()),
                };
            }
            RequestKind::ProfileResults => {
                if !self.pending_results.as_ref().is_some_and(|p| p.answers(ticket)) {
                    debug!(%ticket, "discarding stale profile results");
                    return;
                }
                self.results = match result {
                    Ok(ApiReply::ProfileResults(rows)) => Fetch::Loaded(rows),
                    Ok(_) => Fetch::Failed("unexpected response".to_string()),
                    Err(e) => Fetch::Failed(e.to_string()),
                };
            }
            _ => {}
        }
    }

    pub fn draw_with(&self, frame: &mut Frame, area: Rect, palette: &Palette) -> Result<()> {
        frame.render_widget(Clear, area);

        let margin = 2;
        let overlay_area = Rect::new(
            area.x + margin,
            area.y + margin,
            area.width.saturating_sub(margin * 2),
            area.height.saturating_sub(margin * 2),
        );

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(1),
                Constraint::Length(3),
            ])
            .split(overlay_area);

        self.render_latest(frame, main_chunks[0], palette);

        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
            .split(main_chunks[1]);

        self.render_runs(frame, content_chunks[0], palette);
        self.render_detail(frame, content_chunks[1], palette);

        // Help bar
        let key = Style::default().fg(palette.accent).add_modifier(Modifier::BOLD);
        let help = Paragraph::new(Line::from(vec![
            Span::styled(" Esc/h ", Style::default().fg(palette.warning).add_modifier(Modifier::BOLD)),
            Span::raw("Close  "),
            Span::styled(" ↑/↓ ", key),
            Span::raw("Select  "),
            Span::styled(" Enter ", key),
            Span::raw("Profile results  "),
            Span::styled(" j/k ", key),
            Span::raw("Scroll"),
        ]))
        .alignment(Alignment::Left)
        .block(Block::default().borders(Borders::ALL).border_style(palette.border(false)));
        frame.render_widget(help, main_chunks[2]);

        Ok(())
    }

    fn render_latest(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let label = Style::default().fg(palette.accent).add_modifier(Modifier::BOLD);
        let lines = match &self.latest {
            Fetch::Loaded(latest) => {
                let run = &latest.latest_run;
                let status = run.status.clone().unwrap_or_else(|| "-".to_string());
                vec![
                    Line::from(vec![
                        Span::styled("Run: ", label),
                        Span::raw(run.id.clone()),
                        Span::raw("  "),
                        Span::styled("Status: ", label),
                        Span::styled(status.clone(), Style::default().fg(palette.status_color(&status))),
                        Span::raw("  "),
                        Span::styled("Started: ", label),
                        Span::raw(timestamp::format_optional(run.profiling_starttime.as_ref())),
                    ]),
                    Line::from(vec![
                        Span::styled("Tables: ", label),
                        Span::raw(optional_count(run.table_ct)),
                        Span::raw("  "),
                        Span::styled("Columns: ", label),
                        Span::raw(optional_count(run.column_ct)),
                        Span::raw("  "),
                        Span::styled("Anomalies: ", label),
                        Span::raw(optional_count(run.anomaly_ct)),
                        Span::raw("  "),
                        Span::styled("DQ: ", label),
                        Span::raw(
                            run.dq_score_profiling
                                .map(|s| format!("{:.1}%", s * 100.0))
                                .unwrap_or_else(|| "N/A".to_string()),
                        ),
                    ]),
                ]
            }
            Fetch::Failed(message) => vec![Line::from(Span::styled(
                format!("Error loading latest run: {}", message),
                palette.error(),
            ))],
            Fetch::Loading => vec![Line::from(Span::styled("Loading latest run...", palette.muted()))],
            Fetch::Idle => vec![],
        };

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(palette.border(false))
                .title(" Latest Run ")
                .title_style(palette.title()),
        );
        frame.render_widget(paragraph, area);
    }

    fn render_runs(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(palette.border(true))
            .title(" Run History ")
            .title_style(palette.title());

        let runs = match &self.stats {
            Fetch::Loaded(stats) if !stats.runs.is_empty() => &stats.runs,
            Fetch::Loaded(_) => {
                let paragraph = Paragraph::new("No profiling runs yet.")
                    .style(palette.muted())
                    .block(block);
                frame.render_widget(paragraph, area);
                return;
            }
            Fetch::Failed(message) => {
                let paragraph = Paragraph::new(format!("Error loading runs: {}", message))
                    .style(palette.error())
                    .block(block);
                frame.render_widget(paragraph, area);
                return;
            }
            _ => {
                let paragraph = Paragraph::new("Loading runs...").style(palette.muted()).block(block);
                frame.render_widget(paragraph, area);
                return;
            }
        };

        let items: Vec<ListItem> = runs
            .iter()
            .map(|run| {
                let color = palette.status_color(&run.status);
                ListItem::new(Line::from(vec![
                    Span::styled("● ", Style::default().fg(color)),
                    Span::styled(
                        format!("{} ", timestamp::format_optional(run.created_at.as_ref())),
                        palette.muted(),
                    ),
                    Span::styled(run.profiling_id.clone(), Style::default().fg(palette.text)),
                ]))
            })
            .collect();

        let list = List::new(items).block(block).highlight_style(palette.highlight());
        let mut state = ListState::default().with_selected(Some(self.selected_index));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let lines = match self.selected_run() {
            Some(run) => self.detail_lines(run, palette),
            None => vec![Line::from(Span::styled("Select a run.", palette.muted()))],
        };
        let total = lines.len();
        let visible_height = area.height.saturating_sub(2) as usize;
        let scroll = self.detail_scroll.min(total.saturating_sub(visible_height));

        let detail = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(palette.border(false))
                    .title(" Details ")
                    .title_style(palette.title()),
            )
            .scroll((scroll as u16, 0));
        frame.render_widget(detail, area);

        if total > visible_height {
            let mut scrollbar_state =
                ScrollbarState::new(total.saturating_sub(visible_height)).position(scroll);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                area.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }
    }

    fn detail_lines(&self, run: &RunInfo, palette: &Palette) -> Vec<Line<'static>> {
        let label = Style::default().fg(palette.accent).add_modifier(Modifier::BOLD);
        let mut lines = vec![
            Line::from(vec![Span::styled("Run: ", label), Span::raw(run.profiling_id.clone())]),
            Line::from(vec![
                Span::styled("Status: ", label),
                Span::styled(run.status.clone(), Style::default().fg(palette.status_color(&run.status))),
            ]),
            Line::from(vec![
                Span::styled("Created: ", label),
                Span::raw(timestamp::format_optional(run.created_at.as_ref())),
            ]),
            Line::from(vec![
                Span::styled("Connection: ", label),
                Span::raw(run.connection_id.to_string()),
                Span::raw("  "),
                Span::styled("Table group: ", label),
                Span::raw(run.table_groups_id.clone()),
            ]),
            Line::from(""),
            Line::from(Span::styled("─".repeat(60), palette.muted())),
        ];

        // Results are only shown for the run they were requested for
        if self.results_run() != Some(run.profiling_id.as_str()) {
            lines.push(Line::from(Span::styled(
                "Press Enter to load profile results.",
                palette.muted(),
            )));
            return lines;
        }

        match &self.results {
            Fetch::Loading => lines.push(Line::from(Span::styled(
                "Loading profile results...",
                palette.muted(),
            ))),
            Fetch::Failed(message) => lines.push(Line::from(Span::styled(
                format!("Error loading profile results: {}", message),
                palette.error(),
            ))),
            Fetch::Loaded(rows) if rows.is_empty() => lines.push(Line::from(Span::styled(
                "No profile results for this run.",
                palette.muted(),
            ))),
            Fetch::Loaded(rows) => {
                lines.push(Line::from(Span::styled(
                    format!(
                        "{:<32} {:<14} {:>10} {:>10} {:>8}",
                        "Column", "Type", "Records", "Distinct", "Nulls"
                    ),
                    palette.header(),
                )));
                lines.extend(rows.iter().map(|row| result_line(row, palette)));
            }
            Fetch::Idle => {}
        }
        lines
    }
}

fn optional_count(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn result_line(row: &ProfileResult, palette: &Palette) -> Line<'static> {
    let column = match (&row.table_name, &row.column_name) {
        (Some(table), Some(column)) => format!("{}.{}", table, column),
        (None, Some(column)) => column.clone(),
        _ => row.id.clone(),
    };
    let kind = row
        .general_type
        .clone()
        .or_else(|| row.column_type.clone())
        .unwrap_or_else(|| "-".to_string());
    let mut spans = vec![Span::styled(
        format!(
            "{:<32} {:<14} {:>10} {:>10} {:>8}",
            truncate(&column, 32),
            truncate(&kind, 14),
            optional_count(row.record_ct),
            optional_count(row.distinct_value_ct),
            optional_count(row.null_value_ct),
        ),
        Style::default().fg(palette.text),
    )];
    if row.pii_flag.as_deref().is_some_and(|f| !f.is_empty()) {
        spans.push(Span::styled("  PII", Style::default().fg(palette.warning)));
    }
    Line::from(spans)
}

impl Component for HistoryDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Up => Some(Action::ModalUp),
            KeyCode::Down => Some(Action::ModalDown),
            KeyCode::Char('j') => Some(Action::ScrollDown),
            KeyCode::Char('k') => Some(Action::ScrollUp),
            KeyCode::PageUp => Some(Action::PageUp),
            KeyCode::PageDown => Some(Action::PageDown),
            KeyCode::Esc | KeyCode::Char('h') => Some(Action::CloseModal),
            KeyCode::Enter => Some(Action::LoadProfileResults),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::ModalUp => {
                if self.selected_index > 0 {
                    self.selected_index -= 1;
                    self.detail_scroll = 0;
                }
            }
            Action::ModalDown => {
                if self.selected_index + 1 < self.runs().len() {
                    self.selected_index += 1;
                    self.detail_scroll = 0;
                }
            }
            Action::ScrollUp => {
                self.detail_scroll = self.detail_scroll.saturating_sub(1);
            }
            Action::ScrollDown => {
                self.detail_scroll = self.detail_scroll.saturating_add(1);
            }
            Action::PageUp => {
                self.detail_scroll = self.detail_scroll.saturating_sub(10);
            }
            Action::PageDown => {
                self.detail_scroll = self.detail_scroll.saturating_add(10);
            }
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        self.draw_with(frame, area, &Palette::for_mode(Default::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fetch::Ticket;
    use crate::services::api::ApiError;
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::json;

    fn stats() -> DashboardStats {
        serde_json::from_value(json!({
            "connections": 2,
            "table_groups": 3,
            "profiling_runs": 2,
            "runs": [
                {"connection_id": 7, "profiling_id": "run-a", "status": "Complete",
                 "table_groups_id": "g-1", "created_at": "2024-03-01T10:00:00"},
                {"connection_id": 7, "profiling_id": "run-b", "status": "Error",
                 "table_groups_id": "g-2", "created_at": "2024-03-02T10:00:00"}
            ]
        }))
        .unwrap()
    }

    fn opened() -> HistoryDialog {
        let mut dialog = HistoryDialog::default();
        let outbound = dialog.open();
        let stats_ticket = outbound
            .iter()
            .find(|o| o.request == ApiRequest::DashboardStats)
            .unwrap()
            .ticket;
        dialog.complete(Completion {
            ticket: stats_ticket,
            kind: RequestKind::DashboardStats,
            result: Ok(ApiReply::DashboardStats(stats())),
        });
        dialog
    }

    fn render(dialog: &HistoryDialog) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal
            .draw(|frame| {
                let palette = Palette::for_mode(Default::default());
                dialog.draw_with(frame, frame.area(), &palette).unwrap();
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
    fn test_open_requests_stats_and_latest() {
        let mut dialog = HistoryDialog::default();
        let requests: Vec<ApiRequest> = dialog.open().into_iter().map(|o| o.request).collect();
        assert_eq!(
            requests,
            vec![ApiRequest::DashboardStats, ApiRequest::LatestProfilingRun]
        );
        assert!(dialog.stats.is_loading());
    }

    #[test]
    fn test_selection_is_bounded() {
        let mut dialog = opened();
        dialog.update(Action::ModalDown).unwrap();
        dialog.update(Action::ModalDown).unwrap();
        assert_eq!(dialog.selected_run().unwrap().profiling_id, "run-b");
        dialog.update(Action::ModalUp).unwrap();
        assert_eq!(dialog.selected_index, 0);
    }

    #[test]
    fn test_load_results_for_highlighted_run() {
        let mut dialog = opened();
        dialog.update(Action::ModalDown).unwrap();
        let outbound = dialog.load_results();
        assert_eq!(
            outbound[0].request,
            ApiRequest::ProfileResults {
                connection_id: 7,
                group_id: "g-2".to_string(),
                run_id: "run-b".to_string()
            }
        );
        assert_eq!(dialog.results_run(), Some("run-b"));

        // An older request finishing late is ignored
        dialog.complete(Completion {
            ticket: Ticket::next(),
            kind: RequestKind::ProfileResults,
            result: Ok(ApiReply::ProfileResults(vec![])),
        });
        assert!(dialog.results.is_loading());

        let row: ProfileResult = serde_json::from_value(json!({
            "id": "pr-1",
            "table_name": "orders",
            "column_name": "amount",
            "general_type": "N",
            "record_ct": 120,
            "distinct_value_ct": 40,
            "null_value_ct": 3
        }))
        .unwrap();
        dialog.complete(Completion {
            ticket: outbound[0].ticket,
            kind: RequestKind::ProfileResults,
            result: Ok(ApiReply::ProfileResults(vec![row])),
        });
        let rendered = render(&dialog);
        assert!(rendered.contains("orders.amount"));
        assert!(rendered.contains("run-b"));
    }

    #[test]
    fn test_latest_run_failure_is_shown() {
        let mut dialog = HistoryDialog::default();
        let outbound = dialog.open();
        dialog.complete(Completion {
            ticket: outbound[1].ticket,
            kind: RequestKind::LatestProfilingRun,
            result: Err(ApiError::Backend {
                status: 404,
                message: "No profiling runs found".to_string(),
            }),
        });
        let rendered = render(&dialog);
        assert!(rendered.contains("Error loading latest run: No profiling runs found"));
        assert!(rendered.contains("Loading runs..."));
    }
}
