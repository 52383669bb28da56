//! Table group form dialog
//!
//! Only the name is required. Blank optional fields fall back to the
//! defaults carried by `NewTableGroup::named`.

use crate::action::Action;
use crate::component::Component;
use crate::components::form::{FormField, FormState, StatusMessage};
use crate::components::layout::centered_popup;
use crate::components::theme::Palette;
use crate::model::fetch::Pending;
use crate::model::table_group::{
    parse_table_list, NewTableGroup, DEFAULT_ID_COLUMN_MASK, DEFAULT_PAIR_RULE_PCT,
    DEFAULT_SAMPLE_MIN_COUNT, DEFAULT_SAMPLE_PERCENT, DEFAULT_SK_COLUMN_MASK,
};
use crate::services::worker::{ApiReply, ApiRequest, Completion, Outbound, RequestKind};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use tracing::{debug, info};

const NAME: usize = 0;
const SCHEMA: usize = 1;
const TABLES: usize = 2;
const INCLUDE_MASK: usize = 3;
const EXCLUDE_MASK: usize = 4;
const ID_MASK: usize = 5;
const SK_MASK: usize = 6;
const USE_SAMPLING: usize = 7;
const SAMPLE_PERCENT: usize = 8;
const SAMPLE_MIN_COUNT: usize = 9;
const MIN_AGE_DAYS: usize = 10;
const FLAG_CDES: usize = 11;
const PAIR_RULES: usize = 12;
const PAIR_RULE_PCT: usize = 13;
const DESCRIPTION: usize = 14;

fn yes_no(default_yes: bool) -> Vec<String> {
    if default_yes {
        vec!["Y".to_string(), "N".to_string()]
    } else {
        vec!["N".to_string(), "Y".to_string()]
    }
}

fn blank_fields() -> Vec<FormField> {
    vec![
        FormField::text("Name", true),
        FormField::text("Schema", false),
        FormField::text("Tables (comma-separated)", false),
        FormField::text("Include Mask", false),
        FormField::text("Exclude Mask", false),
        FormField::text("ID Column Mask", false),
        FormField::text("SK Column Mask", false),
        FormField::choice("Use Sampling", yes_no(false)),
        FormField::number("Sample Percent", false),
        FormField::number("Sample Min Count", false),
        FormField::number("Min Profiling Age (days)", false),
        FormField::choice("Flag CDEs", yes_no(true)),
        FormField::choice("Pair Rules", yes_no(false)),
        FormField::text("Pair Rule %", false),
        FormField::text("Description", false),
    ]
}

pub struct TableGroupForm {
    pub form: FormState,
    pub connection_id: Option<i64>,
    pending: Option<Pending<i64>>,
}

impl Default for TableGroupForm {
    fn default() -> Self {
        Self::new()
    }
}

impl TableGroupForm {
    pub fn new() -> Self {
        Self {
            form: FormState::new(blank_fields()),
            connection_id: None,
            pending: None,
        }
    }

    pub fn open(&mut self, connection_id: i64) {
        *self = Self::new();
        self.connection_id = Some(connection_id);
    }

    /// Build the payload, filling blanks with the client-side defaults
    pub fn payload(&self) -> Result<NewTableGroup, String> {
        let name = self.form.value(NAME).trim();
        if name.is_empty() {
            return Err("Please fill in: Name".to_string());
        }

        let integer = |index: usize, default: i64| -> Result<i64, String> {
            match self.form.optional(index) {
                Some(raw) => raw
                    .parse::<i64>()
                    .map_err(|_| format!("{} must be a whole number.", self.form.fields[index].label)),
                None => Ok(default),
            }
        };

        let mut group = NewTableGroup::named(name);
        group.table_group_schema = self.form.optional(SCHEMA);
        group.explicit_table_list = parse_table_list(self.form.value(TABLES));
        group.profiling_include_mask = self.form.optional(INCLUDE_MASK);
        group.profiling_exclude_mask = self.form.optional(EXCLUDE_MASK);
        group.profile_id_column_mask = self
            .form
            .optional(ID_MASK)
            .unwrap_or_else(|| DEFAULT_ID_COLUMN_MASK.to_string());
        group.profile_sk_column_mask = self
            .form
            .optional(SK_MASK)
            .unwrap_or_else(|| DEFAULT_SK_COLUMN_MASK.to_string());
        group.profile_use_sampling = self.form.value(USE_SAMPLING).to_string();
        group.profile_sample_percent = integer(SAMPLE_PERCENT, DEFAULT_SAMPLE_PERCENT)?;
        group.profile_sample_min_count = integer(SAMPLE_MIN_COUNT, DEFAULT_SAMPLE_MIN_COUNT)?;
        group.min_profiling_age_days = integer(MIN_AGE_DAYS, 0)?;
        group.profile_flag_cdes = self.form.value(FLAG_CDES) == "Y";
        group.profile_do_pair_rules = self.form.value(PAIR_RULES).to_string();
        group.profile_pair_rule_pct = match self.form.optional(PAIR_RULE_PCT) {
            Some(raw) => raw
                .parse::<f64>()
                .map_err(|_| "Pair Rule % must be a number.".to_string())?,
            None => DEFAULT_PAIR_RULE_PCT,
        };
        group.description = self.form.optional(DESCRIPTION);
        Ok(group)
    }

    pub fn save(&mut self) -> Vec<Outbound> {
        let Some(connection_id) = self.connection_id else {
            return Vec::new();
        };
        let group = match self.payload() {
            Ok(group) => group,
            Err(message) => {
                self.form.status = Some(StatusMessage::Error(message));
                return Vec::new();
            }
        };
        let pending = Pending::new(connection_id);
        let out = vec![Outbound::new(
            pending.ticket,
            ApiRequest::CreateTableGroup {
                connection_id,
                group,
            },
        )];
        self.pending = Some(pending);
        self.form.status = Some(StatusMessage::Info("Creating table group...".to_string()));
        out
    }

    pub fn complete(&mut self, completion: Completion) -> Option<Action> {
        if completion.kind != RequestKind::CreateTableGroup {
            return None;
        }
        let Some(pending) = self.pending.take() else {
            return None;
        };
        if !pending.answers(completion.ticket) {
            debug!(ticket = %completion.ticket, "discarding stale table group save");
            self.pending = Some(pending);
            return None;
        }

        match completion.result {
            Ok(ApiReply::TableGroup(group)) => {
                info!(group_id = %group.id, "table group created");
                self.form.clear();
                self.form.status = Some(StatusMessage::Success(
                    "Table group created successfully!".to_string(),
                ));
                Some(Action::TableGroupCreated {
                    connection_id: pending.key,
                })
            }
            Ok(_) => {
                self.form.status = Some(StatusMessage::Error(
                    "Failed to create table group.".to_string(),
                ));
                None
            }
            Err(e) => {
                self.form.status = Some(StatusMessage::Error(
                    e.user_message("Failed to create table group."),
                ));
                None
            }
        }
    }
}

impl Component for TableGroupForm {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(match key.code {
                KeyCode::Char('s') => Some(Action::SaveTableGroup),
                _ => None,
            });
        }
        match key.code {
            KeyCode::Esc => Ok(Some(Action::CloseModal)),
            KeyCode::Enter => {
                self.form.focus_next();
                Ok(None)
            }
            _ => {
                self.form.handle_edit_key(key);
                Ok(None)
            }
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let palette = Palette::for_mode(Default::default());
        self.draw_with(frame, area, &palette)
    }
}

impl TableGroupForm {
    pub fn draw_with(&self, frame: &mut Frame, area: Rect, palette: &Palette) -> Result<()> {
        let popup_area = centered_popup(area, 76, 23);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.accent))
            .title(" New Table Group ")
            .title_style(palette.title());
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        frame.render_widget(Paragraph::new(self.form.lines(palette)), chunks[0]);

        let key_style = Style::default().fg(palette.accent).add_modifier(Modifier::BOLD);
        let help = Line::from(vec![
            Span::styled(" Tab ", key_style),
            Span::raw("Next  "),
            Span::styled(" ←/→ ", key_style),
            Span::raw("Toggle  "),
            Span::styled(" Ctrl-S ", key_style),
            Span::raw("Create  "),
            Span::styled(" Esc ", key_style),
            Span::raw("Close"),
        ]);
        frame.render_widget(Paragraph::new(help), chunks[1]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::table_group::TableGroup;
    use crate::services::api::ApiError;
    use serde_json::json;

    #[test]
    fn test_defaults_fill_blank_fields() {
        let mut form = TableGroupForm::new();
        form.open(7);
        form.form.set_value(NAME, "core tables");

        let group = form.payload().unwrap();
        assert_eq!(group, NewTableGroup::named("core tables"));

        let body = serde_json::to_value(&group).unwrap();
        assert_eq!(body["profile_id_column_mask"], "%id");
        assert_eq!(body["profile_sk_column_mask"], "%_sk");
        assert_eq!(body["profile_use_sampling"], "N");
        assert_eq!(body["profile_sample_percent"], 30);
        assert_eq!(body["profile_sample_min_count"], 100000);
        assert_eq!(body["min_profiling_age_days"], 0);
        assert_eq!(body["profile_flag_cdes"], true);
        assert_eq!(body["profile_do_pair_rules"], "N");
        assert_eq!(body["profile_pair_rule_pct"], 95.0);
    }

    #[test]
    fn test_entered_values_override_defaults() {
        let mut form = TableGroupForm::new();
        form.open(7);
        form.form.set_value(NAME, "sales");
        form.form.set_value(TABLES, "orders, customers,, ");
        form.form.set_value(SAMPLE_PERCENT, "10");
        form.form.set_value(USE_SAMPLING, "Y");
        form.form.set_value(PAIR_RULE_PCT, "90.5");

        let group = form.payload().unwrap();
        assert_eq!(
            group.explicit_table_list,
            Some(vec!["orders".to_string(), "customers".to_string()])
        );
        assert_eq!(group.profile_sample_percent, 10);
        assert_eq!(group.profile_use_sampling, "Y");
        assert_eq!(group.profile_pair_rule_pct, 90.5);
    }

    #[test]
    fn test_name_required_and_bad_numbers() {
        let mut form = TableGroupForm::new();
        form.open(7);
        assert!(form.save().is_empty());
        assert_eq!(
            form.form.status,
            Some(StatusMessage::Error("Please fill in: Name".to_string()))
        );

        form.form.set_value(NAME, "x");
        form.form.set_value(PAIR_RULE_PCT, "lots");
        assert!(form.payload().is_err());
    }

    #[test]
    fn test_created_group_notifies_parent() {
        let mut form = TableGroupForm::new();
        form.open(7);
        form.form.set_value(NAME, "core");
        let out = form.save();
        assert!(matches!(
            out[0].request,
            ApiRequest::CreateTableGroup { connection_id: 7, .. }
        ));

        let created: TableGroup = serde_json::from_value(json!({
            "id": "0b6f", "connection_id": 7, "table_groups_name": "core"
        }))
        .unwrap();
        let action = form.complete(Completion {
            ticket: out[0].ticket,
            kind: RequestKind::CreateTableGroup,
            result: Ok(ApiReply::TableGroup(created)),
        });
        assert_eq!(action, Some(Action::TableGroupCreated { connection_id: 7 }));
        assert_eq!(form.form.value(NAME), "");
    }

    #[test]
    fn test_backend_error_is_shown() {
        let mut form = TableGroupForm::new();
        form.open(7);
        form.form.set_value(NAME, "core");
        let out = form.save();
        form.complete(Completion {
            ticket: out[0].ticket,
            kind: RequestKind::CreateTableGroup,
            result: Err(ApiError::Backend {
                status: 400,
                message: "Table group name already exists".to_string(),
            }),
        });
        assert_eq!(
            form.form.status,
            Some(StatusMessage::Error("Table group name already exists".to_string()))
        );
    }
}
