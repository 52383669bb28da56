//! Trigger profiling for one table group

use crate::action::Action;
use crate::component::Component;
use crate::components::form::StatusMessage;
use crate::components::layout::centered_popup;
use crate::components::text::truncate;
use crate::components::theme::Palette;
use crate::model::fetch::Pending;
use crate::model::table_group::{TableGroup, TriggerProfiling};
use crate::services::worker::{ApiReply, ApiRequest, Completion, Outbound, RequestKind};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use tracing::{debug, info};

pub struct ProfilingDialog {
    pub connection_id: i64,
    pub group: TableGroup,
    pub status: Option<StatusMessage>,
    pending: Option<Pending<String>>,
}

impl ProfilingDialog {
    pub fn new(connection_id: i64, group: TableGroup) -> Self {
        Self {
            connection_id,
            group,
            status: None,
            pending: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Ask the backend to start a profiling run. Ignored while one request is
    /// still outstanding.
    pub fn trigger(&mut self) -> Vec<Outbound> {
        if self.pending.is_some() {
            return Vec::new();
        }
        let pending = Pending::new(self.group.id.clone());
        let ticket = pending.ticket;
        self.pending = Some(pending);
        self.status = Some(StatusMessage::Info("Starting profiling...".to_string()));
        info!(group_id = %self.group.id, "triggering profiling");
        vec![Outbound::new(
            ticket,
            ApiRequest::TriggerProfiling(TriggerProfiling {
                connection_id: self.connection_id,
                table_group_id: self.group.id.clone(),
            }),
        )]
    }

    pub fn complete(&mut self, completion: Completion) {
        if completion.kind != RequestKind::TriggerProfiling {
            return;
        }
        let Some(pending) = self.pending.take() else {
            return;
        };
        if !pending.answers(completion.ticket) {
            debug!(ticket = %completion.ticket, "discarding stale profiling trigger");
            self.pending = Some(pending);
            return;
        }

        self.status = Some(match completion.result {
            Ok(ApiReply::Acknowledged(response)) => StatusMessage::Success(
                response
                    .message
                    .unwrap_or_else(|| "Profiling started.".to_string()),
            ),
            Ok(_) => StatusMessage::Success("Profiling started.".to_string()),
            Err(e) => StatusMessage::Error(e.user_message("Failed to start profiling.")),
        });
    }

    pub fn draw_with(&self, frame: &mut Frame, area: Rect, palette: &Palette) -> Result<()> {
        let popup_area = centered_popup(area, 64, 12);
        frame.render_widget(Clear, popup_area);
        let width = popup_area.width.saturating_sub(4) as usize;

        let label = Style::default().fg(palette.accent).add_modifier(Modifier::BOLD);
        let text = Style::default().fg(palette.text);
        let sampling = if self.group.uses_sampling() { "Yes" } else { "No" };

        let mut content = vec![
            Line::from(vec![
                Span::styled("Table group: ", label),
                Span::styled(truncate(&self.group.table_groups_name, width.saturating_sub(13)), text),
            ]),
            Line::from(vec![
                Span::styled("Schema:      ", label),
                Span::styled(
                    self.group.table_group_schema.clone().unwrap_or_else(|| "-".to_string()),
                    text,
                ),
            ]),
            Line::from(vec![
                Span::styled("Scope:       ", label),
                Span::styled(truncate(&self.group.scope(), width.saturating_sub(13)), text),
            ]),
            Line::from(vec![
                Span::styled("Sampling:    ", label),
                Span::styled(sampling, text),
            ]),
            Line::from(""),
        ];

        match &self.status {
            Some(StatusMessage::Success(m)) => content.push(Line::from(Span::styled(
                m.clone(),
                Style::default().fg(palette.success),
            ))),
            Some(StatusMessage::Error(m)) => {
                content.push(Line::from(Span::styled(m.clone(), palette.error())))
            }
            Some(StatusMessage::Info(m)) => {
                content.push(Line::from(Span::styled(m.clone(), palette.muted())))
            }
            None => content.push(Line::from(Span::styled(
                "Run profiling for this table group?",
                text,
            ))),
        }
        content.push(Line::from(""));
        content.push(Line::from(Span::styled("Enter run  Esc close", palette.muted())));

        let paragraph = Paragraph::new(content)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(palette.border(true))
                    .title(" Run Profiling ")
                    .title_style(palette.title()),
            );
        frame.render_widget(paragraph, popup_area);
        Ok(())
    }
}

impl Component for ProfilingDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Enter => Some(Action::TriggerProfiling),
            KeyCode::Esc | KeyCode::Char('q') => Some(Action::CloseModal),
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        self.draw_with(frame, area, &Palette::for_mode(Default::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::connection::MessageResponse;
    use crate::model::fetch::Ticket;
    use crate::services::api::ApiError;
    use serde_json::json;

    fn dialog() -> ProfilingDialog {
        let group: TableGroup = serde_json::from_value(json!({
            "id": "g-1",
            "connection_id": 7,
            "table_groups_name": "core"
        }))
        .unwrap();
        ProfilingDialog::new(7, group)
    }

    #[test]
    fn test_trigger_sends_ids_once() {
        let mut dialog = dialog();
        let outbound = dialog.trigger();
        assert_eq!(outbound.len(), 1);
        assert_eq!(
            outbound[0].request,
            ApiRequest::TriggerProfiling(TriggerProfiling {
                connection_id: 7,
                table_group_id: "g-1".to_string()
            })
        );
        assert!(dialog.is_busy());
        assert!(dialog.trigger().is_empty());
    }

    #[test]
    fn test_backend_message_is_shown() {
        let mut dialog = dialog();
        let ticket = dialog.trigger()[0].ticket;
        dialog.complete(Completion {
            ticket,
            kind: RequestKind::TriggerProfiling,
            result: Ok(ApiReply::Acknowledged(MessageResponse {
                status: Some("success".to_string()),
                message: Some("Profiling run started for core".to_string()),
            })),
        });
        assert_eq!(
            dialog.status,
            Some(StatusMessage::Success("Profiling run started for core".to_string()))
        );
        assert!(!dialog.is_busy());
    }

    #[test]
    fn test_stale_and_failed_completions() {
        let mut dialog = dialog();
        let ticket = dialog.trigger()[0].ticket;
        dialog.complete(Completion {
            ticket: Ticket::next(),
            kind: RequestKind::TriggerProfiling,
            result: Err(ApiError::Status(500)),
        });
        assert!(dialog.is_busy());

        dialog.complete(Completion {
            ticket,
            kind: RequestKind::TriggerProfiling,
            result: Err(ApiError::Backend {
                status: 404,
                message: "Table group not found".to_string(),
            }),
        });
        assert_eq!(
            dialog.status,
            Some(StatusMessage::Error("Table group not found".to_string()))
        );
    }
}
