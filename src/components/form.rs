//! Shared form state for the connection and table group dialogs

use crate::components::text::mask;
use crate::components::theme::Palette;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Rendered masked
    Secret,
    /// Digits only
    Number,
    /// Cycled with Left/Right
    Choice(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub label: &'static str,
    pub value: String,
    pub kind: FieldKind,
    pub required: bool,
}

impl FormField {
    pub fn text(label: &'static str, required: bool) -> Self {
        Self {
            label,
            value: String::new(),
            kind: FieldKind::Text,
            required,
        }
    }

    pub fn secret(label: &'static str, required: bool) -> Self {
        Self {
            kind: FieldKind::Secret,
            ..Self::text(label, required)
        }
    }

    pub fn number(label: &'static str, required: bool) -> Self {
        Self {
            kind: FieldKind::Number,
            ..Self::text(label, required)
        }
    }

    pub fn choice(label: &'static str, options: Vec<String>) -> Self {
        let value = options.first().cloned().unwrap_or_default();
        Self {
            label,
            value,
            kind: FieldKind::Choice(options),
            required: true,
        }
    }

    fn display_value(&self) -> String {
        match self.kind {
            FieldKind::Secret => mask(&self.value),
            FieldKind::Choice(_) => format!("◀ {} ▶", self.value),
            _ => self.value.clone(),
        }
    }
}

/// Result line shown under the fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Success(String),
    Error(String),
    Info(String),
}

#[derive(Debug, Clone)]
pub struct FormState {
    pub fields: Vec<FormField>,
    pub focus: usize,
    pub status: Option<StatusMessage>,
}

impl FormState {
    pub fn new(fields: Vec<FormField>) -> Self {
        Self {
            fields,
            focus: 0,
            status: None,
        }
    }

    pub fn value(&self, index: usize) -> &str {
        self.fields.get(index).map(|f| f.value.as_str()).unwrap_or("")
    }

    /// Trimmed value, `None` when blank
    pub fn optional(&self, index: usize) -> Option<String> {
        let value = self.value(index).trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }

    pub fn set_value(&mut self, index: usize, value: impl Into<String>) {
        if let Some(field) = self.fields.get_mut(index) {
            field.value = value.into();
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    pub fn focus_previous(&mut self) {
        self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }

    /// Labels of required fields that are blank
    pub fn missing_required(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| f.required && f.value.trim().is_empty())
            .map(|f| f.label)
            .collect()
    }

    /// Blank every field; choices go back to their first option
    pub fn clear(&mut self) {
        for field in &mut self.fields {
            field.value = match &field.kind {
                FieldKind::Choice(options) => options.first().cloned().unwrap_or_default(),
                _ => String::new(),
            };
        }
        self.focus = 0;
    }

    /// Apply an editing key to the focused field. Returns whether the key was
    /// consumed.
    pub fn handle_edit_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return false;
        }
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.focus_next();
                true
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus_previous();
                true
            }
            KeyCode::Left => self.cycle_choice(false),
            KeyCode::Right => self.cycle_choice(true),
            KeyCode::Backspace => {
                if let Some(field) = self.fields.get_mut(self.focus) {
                    if !matches!(field.kind, FieldKind::Choice(_)) {
                        field.value.pop();
                    }
                }
                true
            }
            KeyCode::Char(c) => {
                if let Some(field) = self.fields.get_mut(self.focus) {
                    match field.kind {
                        FieldKind::Choice(_) => {}
                        FieldKind::Number if !c.is_ascii_digit() => {}
                        _ => field.value.push(c),
                    }
                }
                true
            }
            _ => false,
        }
    }

    fn cycle_choice(&mut self, forward: bool) -> bool {
        let Some(field) = self.fields.get_mut(self.focus) else {
            return false;
        };
        let FieldKind::Choice(options) = &field.kind else {
            return false;
        };
        if options.is_empty() {
            return true;
        }
        let current = options.iter().position(|o| *o == field.value).unwrap_or(0);
        let next = if forward {
            (current + 1) % options.len()
        } else {
            (current + options.len() - 1) % options.len()
        };
        field.value = options[next].clone();
        true
    }

    /// One line per field plus the status line
    pub fn lines(&self, palette: &Palette) -> Vec<Line<'static>> {
        let label_width = self.fields.iter().map(|f| f.label.len()).max().unwrap_or(0) + 2;
        let mut lines: Vec<Line> = self
            .fields
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let focused = i == self.focus;
                let marker = if field.required { "*" } else { " " };
                let label_style = if focused {
                    Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(palette.text)
                };
                let value_style = if focused {
                    palette.highlight()
                } else {
                    Style::default().fg(palette.text)
                };
                let cursor = if focused && !matches!(field.kind, FieldKind::Choice(_)) {
                    "▏"
                } else {
                    ""
                };
                Line::from(vec![
                    Span::styled(
                        format!("{}{:<width$}", marker, field.label, width = label_width),
                        label_style,
                    ),
                    Span::styled(format!("{}{}", field.display_value(), cursor), value_style),
                ])
            })
            .collect();

        lines.push(Line::from(""));
        if let Some(status) = &self.status {
            let (text, style) = match status {
                StatusMessage::Success(m) => (m.clone(), Style::default().fg(palette.success)),
                StatusMessage::Error(m) => (m.clone(), palette.error()),
                StatusMessage::Info(m) => (m.clone(), palette.muted()),
            };
            lines.push(Line::from(Span::styled(text, style)));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn sample() -> FormState {
        FormState::new(vec![
            FormField::text("Name", true),
            FormField::number("Port", true),
            FormField::choice("Flavor", vec!["A".to_string(), "B".to_string()]),
            FormField::secret("Password", false),
        ])
    }

    #[test]
    fn test_typing_and_focus() {
        let mut form = sample();
        form.handle_edit_key(key(KeyCode::Char('x')));
        form.handle_edit_key(key(KeyCode::Tab));
        form.handle_edit_key(key(KeyCode::Char('5')));
        form.handle_edit_key(key(KeyCode::Char('a')));
        form.handle_edit_key(key(KeyCode::Char('4')));
        assert_eq!(form.value(0), "x");
        assert_eq!(form.value(1), "54");

        form.handle_edit_key(key(KeyCode::Backspace));
        assert_eq!(form.value(1), "5");

        form.handle_edit_key(key(KeyCode::BackTab));
        form.handle_edit_key(key(KeyCode::BackTab));
        assert_eq!(form.focus, 3);
    }

    #[test]
    fn test_choice_cycles() {
        let mut form = sample();
        form.focus = 2;
        assert_eq!(form.value(2), "A");
        form.handle_edit_key(key(KeyCode::Right));
        assert_eq!(form.value(2), "B");
        form.handle_edit_key(key(KeyCode::Right));
        assert_eq!(form.value(2), "A");
        form.handle_edit_key(key(KeyCode::Left));
        assert_eq!(form.value(2), "B");
        // Typing into a choice does nothing
        form.handle_edit_key(key(KeyCode::Char('z')));
        assert_eq!(form.value(2), "B");
    }

    #[test]
    fn test_required_and_clear() {
        let mut form = sample();
        assert_eq!(form.missing_required(), vec!["Name", "Port"]);
        form.set_value(0, "  ");
        assert_eq!(form.missing_required(), vec!["Name", "Port"]);
        form.set_value(0, "prod");
        form.set_value(1, "5432");
        assert!(form.missing_required().is_empty());
        assert_eq!(form.optional(3), None);

        form.set_value(2, "B");
        form.clear();
        assert_eq!(form.value(0), "");
        assert_eq!(form.value(2), "A");
    }

    #[test]
    fn test_control_keys_are_not_consumed() {
        let mut form = sample();
        let ctrl_s = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert!(!form.handle_edit_key(ctrl_s));
        assert_eq!(form.value(0), "");
    }

    #[test]
    fn test_secret_is_masked() {
        let mut form = sample();
        form.set_value(3, "hunter2");
        let palette = Palette::for_mode(Default::default());
        let rendered: String = form.lines(&palette)[3]
            .spans
            .iter()
            .map(|s| s.content.to_string())
            .collect();
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("•••••••"));
    }
}
