//! Bearer token entry
//!
//! The token is pasted by the user; submitting an empty value clears the
//! stored token.

use crate::action::Action;
use crate::component::Component;
use crate::components::layout::centered_popup;
use crate::components::text::{mask, truncate};
use crate::components::theme::Palette;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

#[derive(Debug, Default)]
pub struct TokenDialog {
    pub input: String,
    /// Show the raw token instead of the mask
    pub reveal: bool,
    /// Whether a token was stored when the dialog opened
    pub had_token: bool,
}

impl TokenDialog {
    pub fn new(had_token: bool) -> Self {
        Self {
            had_token,
            ..Self::default()
        }
    }

    pub fn draw_with(&self, frame: &mut Frame, area: Rect, palette: &Palette) -> Result<()> {
        let popup_area = centered_popup(area, 64, 9);
        frame.render_widget(Clear, popup_area);

        let width = popup_area.width.saturating_sub(6) as usize;
        let shown = if self.reveal {
            self.input.clone()
        } else {
            mask(&self.input)
        };
        // Keep the tail visible while typing long tokens
        let tail: String = {
            let chars: Vec<char> = shown.chars().collect();
            let start = chars.len().saturating_sub(width.saturating_sub(1));
            chars[start..].iter().collect()
        };

        let state = if self.had_token {
            "A token is stored. Enter a new one, or submit empty to clear it."
        } else {
            "No token stored. Paste a bearer token."
        };

        let content = vec![
            Line::from(""),
            Line::from(Span::styled(truncate(state, width), palette.muted())),
            Line::from(""),
            Line::from(vec![
                Span::styled("> ", Style::default().fg(palette.accent)),
                Span::styled(format!("{}▏", tail), palette.highlight()),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "Enter save  Ctrl+r reveal  Esc cancel",
                palette.muted(),
            )),
        ];

        let paragraph = Paragraph::new(content).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(palette.border(true))
                .title(" API Token ")
                .title_style(palette.title()),
        );
        frame.render_widget(paragraph, popup_area);
        Ok(())
    }
}

impl Component for TokenDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('r') {
                self.reveal = !self.reveal;
            }
            return Ok(None);
        }
        let action = match key.code {
            KeyCode::Esc => Some(Action::CloseModal),
            KeyCode::Enter => Some(Action::SaveToken(self.input.trim().to_string())),
            KeyCode::Backspace => {
                self.input.pop();
                None
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        self.draw_with(frame, area, &Palette::for_mode(Default::default()))
    }
}
