//! Connection form dialog - create, edit and test database connections
//!
//! Test and Save are independent submissions from the same field state. A
//! failed test never touches the fields; a successful save clears them.

use crate::action::Action;
use crate::component::Component;
use crate::components::form::{FormField, FormState, StatusMessage};
use crate::components::layout::centered_popup;
use crate::components::theme::Palette;
use crate::model::connection::{
    Connection, ConnectionAction, ConnectionRequest, ConnectionUpdate, SqlFlavor,
};
use crate::model::fetch::Pending;
use crate::services::worker::{ApiReply, ApiRequest, Completion, Outbound, RequestKind};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use tracing::{debug, info, warn};

const PROJECT_CODE: usize = 0;
const CONNECTION_NAME: usize = 1;
const DESCRIPTION: usize = 2;
const FLAVOR: usize = 3;
const HOST: usize = 4;
const PORT: usize = 5;
const USER: usize = 6;
const PASSWORD: usize = 7;
const DATABASE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(i64),
}

pub struct ConnectionForm {
    pub form: FormState,
    pub mode: FormMode,
    pending_test: Option<Pending<()>>,
    pending_save: Option<Pending<FormMode>>,
}

impl Default for ConnectionForm {
    fn default() -> Self {
        Self::new()
    }
}

fn blank_fields() -> Vec<FormField> {
    let flavors = SqlFlavor::all()
        .iter()
        .map(|f| f.label().to_string())
        .collect();
    vec![
        FormField::text("Project Code", true),
        FormField::text("Connection Name", true),
        FormField::text("Description", false),
        FormField::choice("Database Type", flavors),
        FormField::text("Host", true),
        FormField::number("Port", true),
        FormField::text("User", true),
        FormField::secret("Password", true),
        FormField::text("Database", true),
    ]
}

impl ConnectionForm {
    pub fn new() -> Self {
        let mut form = FormState::new(blank_fields());
        form.set_value(PORT, SqlFlavor::PostgreSql.default_port());
        Self {
            form,
            mode: FormMode::Create,
            pending_test: None,
            pending_save: None,
        }
    }

    pub fn open_create(&mut self) {
        *self = Self::new();
    }

    /// Prefill from a stored connection. The password is never returned by
    /// the backend and has to be entered again.
    pub fn open_edit(&mut self, connection: &Connection) {
        *self = Self::new();
        self.mode = FormMode::Edit(connection.connection_id);
        self.form.set_value(PROJECT_CODE, connection.project_code.clone());
        self.form
            .set_value(CONNECTION_NAME, connection.connection_name.clone());
        self.form.set_value(
            DESCRIPTION,
            connection.connection_description.clone().unwrap_or_default(),
        );
        self.form.set_value(FLAVOR, connection.flavor_label());
        self.form.set_value(HOST, connection.host());
        self.form.set_value(PORT, connection.port());
        self.form.set_value(USER, connection.project_user.clone());
        self.form.set_value(DATABASE, connection.database().to_string());
    }

    pub fn is_busy(&self) -> bool {
        self.pending_test.is_some() || self.pending_save.is_some()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Submission
    // ─────────────────────────────────────────────────────────────────────────

    /// Required-field and port checks; sets an error status on failure
    fn validate(&mut self) -> Option<u16> {
        let missing = self.form.missing_required();
        if !missing.is_empty() {
            self.form.status = Some(StatusMessage::Error(format!(
                "Please fill in: {}",
                missing.join(", ")
            )));
            return None;
        }
        match self.form.value(PORT).trim().parse::<u16>() {
            Ok(port) => Some(port),
            Err(_) => {
                self.form.status = Some(StatusMessage::Error(
                    "Port must be a number between 0 and 65535.".to_string(),
                ));
                None
            }
        }
    }

    fn request(&self, action: ConnectionAction, port: u16) -> ConnectionRequest {
        ConnectionRequest {
            action,
            sql_flavor: self.form.value(FLAVOR).to_string(),
            db_hostname: self.form.value(HOST).trim().to_string(),
            db_port: port,
            user_id: self.form.value(USER).trim().to_string(),
            password: self.form.value(PASSWORD).to_string(),
            project_db: self.form.value(DATABASE).trim().to_string(),
            project_code: self.form.optional(PROJECT_CODE),
            connection_name: self.form.optional(CONNECTION_NAME),
            connection_description: self.form.optional(DESCRIPTION),
            max_query_chars: None,
            url: None,
            connect_by_url: None,
            connect_by_key: None,
            http_path: None,
        }
    }

    fn update_payload(&self, port: u16) -> ConnectionUpdate {
        ConnectionUpdate {
            action: ConnectionAction::Update,
            project_code: self.form.value(PROJECT_CODE).trim().to_string(),
            connection_name: self.form.value(CONNECTION_NAME).trim().to_string(),
            connection_description: self.form.optional(DESCRIPTION),
            sql_flavor: self.form.value(FLAVOR).to_string(),
            project_host: self.form.value(HOST).trim().to_string(),
            project_port: port.to_string(),
            project_user: self.form.value(USER).trim().to_string(),
            password: self.form.value(PASSWORD).to_string(),
            project_db: self.form.optional(DATABASE),
        }
    }

    pub fn test(&mut self) -> Vec<Outbound> {
        if self.is_busy() {
            return Vec::new();
        }
        let Some(port) = self.validate() else {
            return Vec::new();
        };
        let pending = Pending::new(());
        let out = vec![Outbound::new(
            pending.ticket,
            ApiRequest::TestConnection(self.request(ConnectionAction::Test, port)),
        )];
        self.pending_test = Some(pending);
        self.form.status = Some(StatusMessage::Info("Testing connection...".to_string()));
        out
    }

    pub fn save(&mut self) -> Vec<Outbound> {
        if self.is_busy() {
            return Vec::new();
        }
        let Some(port) = self.validate() else {
            return Vec::new();
        };
        let request = match self.mode {
            FormMode::Create => {
                ApiRequest::CreateConnection(self.request(ConnectionAction::Create, port))
            }
            FormMode::Edit(id) => ApiRequest::UpdateConnection {
                id,
                update: self.update_payload(port),
            },
        };
        let pending = Pending::new(self.mode);
        let out = vec![Outbound::new(pending.ticket, request)];
        self.pending_save = Some(pending);
        self.form.status = Some(StatusMessage::Info("Saving connection...".to_string()));
        out
    }

    /// Apply a test or save answer; a successful save yields the
    /// notification for the parent screen
    pub fn complete(&mut self, completion: Completion) -> Option<Action> {
        let Completion {
            ticket,
            kind,
            result,
        } = completion;

        match kind {
            RequestKind::TestConnection => {
                if !self.pending_test.as_ref().is_some_and(|p| p.answers(ticket)) {
                    debug!(%ticket, "discarding stale connection test");
                    return None;
                }
                self.pending_test = None;
                self.form.status = Some(match result {
                    Ok(ApiReply::ConnectionTested(outcome)) if outcome.status => {
                        let message = if outcome.message.is_empty() {
                            "Connection successful!".to_string()
                        } else {
                            outcome.message
                        };
                        StatusMessage::Success(message)
                    }
                    Ok(ApiReply::ConnectionTested(outcome)) => {
                        let message = if outcome.message.is_empty() {
                            "Connection test failed.".to_string()
                        } else {
                            outcome.message
                        };
                        StatusMessage::Error(message)
                    }
                    Ok(_) => StatusMessage::Error("Connection test failed.".to_string()),
                    Err(e) => {
                        StatusMessage::Error(format!("Failed to connect to the database: {}", e))
                    }
                });
                None
            }
            RequestKind::CreateConnection | RequestKind::UpdateConnection => {
                if !self.pending_save.as_ref().is_some_and(|p| p.answers(ticket)) {
                    debug!(%ticket, "discarding stale connection save");
                    return None;
                }
                self.pending_save = None;
                match result {
                    Ok(ApiReply::Connection(saved)) => {
                        info!(connection_id = saved.connection_id, "connection saved");
                        self.form.clear();
                        self.form
                            .set_value(PORT, SqlFlavor::PostgreSql.default_port());
                        self.mode = FormMode::Create;
                        self.form.status = Some(StatusMessage::Success(
                            "Connection saved successfully!".to_string(),
                        ));
                        Some(Action::ConnectionSaved {
                            connection_id: saved.connection_id,
                            name: saved.connection_name,
                        })
                    }
                    Ok(_) => {
                        self.form.status =
                            Some(StatusMessage::Error("Failed to save connection.".to_string()));
                        None
                    }
                    Err(e) => {
                        warn!(
                            error = %e,
                            rejected_fields = e.field_errors().len(),
                            "connection save failed"
                        );
                        self.form.status = Some(StatusMessage::Error(
                            e.user_message("Failed to save connection."),
                        ));
                        None
                    }
                }
            }
            _ => None,
        }
    }

    /// Keep the port in step with the flavor unless the user typed one
    fn on_flavor_changed(&mut self, previous: &str) {
        let old_default = SqlFlavor::from_label(previous).map(|f| f.default_port());
        let port = self.form.value(PORT).to_string();
        if port.is_empty() || Some(port.as_str()) == old_default {
            if let Some(flavor) = SqlFlavor::from_label(self.form.value(FLAVOR)) {
                self.form.set_value(PORT, flavor.default_port());
            }
        }
    }
}

impl Component for ConnectionForm {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            let action = match key.code {
                KeyCode::Char('t') => Some(Action::TestConnection),
                KeyCode::Char('s') => Some(Action::SaveConnection),
                _ => None,
            };
            return Ok(action);
        }

        match key.code {
            KeyCode::Esc => Ok(Some(Action::CloseModal)),
            KeyCode::Enter => {
                self.form.focus_next();
                Ok(None)
            }
            _ => {
                let previous = self.form.value(FLAVOR).to_string();
                self.form.handle_edit_key(key);
                if self.form.value(FLAVOR) != previous {
                    self.on_flavor_changed(&previous);
                }
                Ok(None)
            }
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let palette = Palette::for_mode(Default::default());
        self.draw_with(frame, area, &palette)
    }
}

impl ConnectionForm {
    pub fn draw_with(&self, frame: &mut Frame, area: Rect, palette: &Palette) -> Result<()> {
        let popup_area = centered_popup(area, 72, 18);
        frame.render_widget(Clear, popup_area);

        let title = match self.mode {
            FormMode::Create => " New Connection ".to_string(),
            FormMode::Edit(id) => format!(" Edit Connection #{} ", id),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.accent))
            .title(title)
            .title_style(palette.title());
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        frame.render_widget(
            Paragraph::new(self.form.lines(palette)).wrap(Wrap { trim: false }),
            chunks[0],
        );

        let key_style = Style::default().fg(palette.accent).add_modifier(Modifier::BOLD);
        let help = Line::from(vec![
            Span::styled(" Tab ", key_style),
            Span::raw("Next  "),
            Span::styled(" ←/→ ", key_style),
            Span::raw("Type  "),
            Span::styled(" Ctrl-T ", key_style),
            Span::raw("Test  "),
            Span::styled(" Ctrl-S ", key_style),
            Span::raw("Save  "),
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
    use crate::model::connection::TestConnectionResult;
    use crate::services::api::{ApiError, FieldError};
    use serde_json::json;

    fn filled() -> ConnectionForm {
        let mut form = ConnectionForm::new();
        form.form.set_value(PROJECT_CODE, "DEFAULT");
        form.form.set_value(CONNECTION_NAME, "Prod");
        form.form.set_value(HOST, "db.internal");
        form.form.set_value(USER, "analyst");
        form.form.set_value(PASSWORD, "s3cret");
        form.form.set_value(DATABASE, "sales");
        form
    }

    fn answer(out: &Outbound, result: Result<ApiReply, ApiError>) -> Completion {
        Completion {
            ticket: out.ticket,
            kind: out.request.kind(),
            result,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_missing_fields_block_submission() {
        let mut form = ConnectionForm::new();
        assert!(form.test().is_empty());
        match &form.form.status {
            Some(StatusMessage::Error(message)) => {
                assert!(message.contains("Project Code"));
                assert!(message.contains("Password"));
                assert!(!message.contains("Description"));
            }
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[test]
    fn test_request_payload() {
        let mut form = filled();
        let out = form.test();
        let ApiRequest::TestConnection(request) = &out[0].request else {
            panic!("expected a test request");
        };
        let body = serde_json::to_value(request).unwrap();
        assert_eq!(body["action"], "test");
        assert_eq!(body["sql_flavor"], "PostgreSQL");
        assert_eq!(body["db_hostname"], "db.internal");
        assert_eq!(body["db_port"], 5432);
        assert_eq!(body["project_db"], "sales");
        assert!(body.get("connection_description").is_none());
    }

    #[test]
    fn test_failed_test_keeps_fields() {
        let mut form = filled();
        let out = form.test();
        let action = form.complete(answer(
            &out[0],
            Ok(ApiReply::ConnectionTested(TestConnectionResult {
                status: false,
                message: "auth failed".to_string(),
                details: None,
            })),
        ));
        assert!(action.is_none());
        assert_eq!(
            form.form.status,
            Some(StatusMessage::Error("auth failed".to_string()))
        );
        assert_eq!(form.form.value(HOST), "db.internal");
        assert_eq!(form.form.value(PASSWORD), "s3cret");
    }

    #[test]
    fn test_transport_failure_message() {
        let mut form = filled();
        let out = form.test();
        form.complete(answer(&out[0], Err(ApiError::Transport("refused".to_string()))));
        assert_eq!(
            form.form.status,
            Some(StatusMessage::Error(
                "Failed to connect to the database: Network error: refused".to_string()
            ))
        );
    }

    #[test]
    fn test_successful_save_clears_and_notifies() {
        let mut form = filled();
        let out = form.save();
        assert!(matches!(out[0].request, ApiRequest::CreateConnection(_)));

        let saved: Connection = serde_json::from_value(json!({
            "connection_id": 12,
            "connection_name": "Prod",
            "sql_flavor": "postgresql"
        }))
        .unwrap();
        let action = form.complete(answer(&out[0], Ok(ApiReply::Connection(saved))));

        assert_eq!(
            action,
            Some(Action::ConnectionSaved {
                connection_id: 12,
                name: "Prod".to_string()
            })
        );
        assert_eq!(form.form.value(HOST), "");
        assert_eq!(
            form.form.status,
            Some(StatusMessage::Success("Connection saved successfully!".to_string()))
        );
    }

    #[test]
    fn test_validation_errors_are_listed() {
        let mut form = filled();
        let out = form.save();
        form.complete(answer(
            &out[0],
            Err(ApiError::Validation(vec![
                FieldError {
                    loc: vec![json!("body"), json!("project_code")],
                    msg: "field required".to_string(),
                },
                FieldError {
                    loc: vec![json!("body"), json!("db_port")],
                    msg: "not a valid integer".to_string(),
                },
            ])),
        ));
        assert_eq!(
            form.form.status,
            Some(StatusMessage::Error(
                "body.project_code: field required, body.db_port: not a valid integer".to_string()
            ))
        );
        assert_eq!(form.form.value(CONNECTION_NAME), "Prod");
    }

    #[test]
    fn test_submit_ignored_while_in_flight() {
        let mut form = filled();
        assert_eq!(form.test().len(), 1);
        assert!(form.is_busy());
        assert!(form.save().is_empty());
        assert!(form.test().is_empty());
    }

    #[test]
    fn test_edit_mode_uses_update_payload() {
        let existing: Connection = serde_json::from_value(json!({
            "connection_id": 7,
            "project_code": "DEFAULT",
            "connection_name": "Prod",
            "sql_flavor": "mysql",
            "project_host": "db",
            "project_port": 3306,
            "project_user": "root",
            "project_db": "sales"
        }))
        .unwrap();
        let mut form = ConnectionForm::new();
        form.open_edit(&existing);
        assert_eq!(form.form.value(FLAVOR), "MySQL");
        assert_eq!(form.form.value(PORT), "3306");

        // Password has to be re-entered
        assert!(form.save().is_empty());
        form.form.set_value(PASSWORD, "pw");
        let out = form.save();
        let ApiRequest::UpdateConnection { id, update } = &out[0].request else {
            panic!("expected an update request");
        };
        assert_eq!(*id, 7);
        assert_eq!(update.project_port, "3306");
        assert_eq!(update.action, ConnectionAction::Update);
    }

    #[test]
    fn test_flavor_change_moves_default_port() {
        let mut form = ConnectionForm::new();
        form.form.focus = FLAVOR;
        form.handle_key_event(key(KeyCode::Right)).unwrap();
        assert_eq!(form.form.value(FLAVOR), "MySQL");
        assert_eq!(form.form.value(PORT), "3306");

        form.form.set_value(PORT, "13306");
        form.handle_key_event(key(KeyCode::Right)).unwrap();
        assert_eq!(form.form.value(PORT), "13306");
    }

    #[test]
    fn test_shortcuts() {
        let mut form = ConnectionForm::new();
        let ctrl_t = KeyEvent::new(KeyCode::Char('t'), KeyModifiers::CONTROL);
        let ctrl_s = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(form.handle_key_event(ctrl_t).unwrap(), Some(Action::TestConnection));
        assert_eq!(form.handle_key_event(ctrl_s).unwrap(), Some(Action::SaveConnection));
        assert_eq!(form.handle_key_event(key(KeyCode::Esc)).unwrap(), Some(Action::CloseModal));
    }
}
