//! Yes/no confirmation dialog
//!
//! Used for quitting and for destructive actions such as deleting a
//! connection or a table group.

use crate::action::Action;
use crate::component::Component;
use crate::components::layout::centered_popup;
use crate::components::text::truncate;
use crate::components::theme::Palette;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const WIDTH: u16 = 56;

#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmDialog {
    pub title: String,
    pub prompt: String,
    /// Emitted on `y`
    pub on_confirm: Action,
}

impl ConfirmDialog {
    pub fn new(title: impl Into<String>, prompt: impl Into<String>, on_confirm: Action) -> Self {
        Self {
            title: title.into(),
            prompt: prompt.into(),
            on_confirm,
        }
    }

    pub fn quit() -> Self {
        Self::new("Quit?", "Are you sure you want to quit?", Action::ForceQuit)
    }

    pub fn delete_connection(id: i64, name: &str) -> Self {
        Self::new(
            "Delete connection?",
            format!("Delete connection \"{}\"?", name),
            Action::DeleteConnection(id),
        )
    }

    pub fn delete_table_group(connection_id: i64, group_id: &str, name: &str) -> Self {
        Self::new(
            "Delete table group?",
            format!("Delete table group \"{}\"?", name),
            Action::DeleteTableGroup {
                connection_id,
                group_id: group_id.to_string(),
            },
        )
    }

    pub fn draw_with(&self, frame: &mut Frame, area: Rect, palette: &Palette) -> Result<()> {
        let popup_area = centered_popup(area, WIDTH, 7);
        frame.render_widget(Clear, popup_area);

        let prompt = truncate(&self.prompt, WIDTH.saturating_sub(4) as usize);
        let content = vec![
            Line::from(""),
            Line::from(Span::styled(
                prompt,
                Style::default().fg(palette.text).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled(
                    " y ",
                    Style::default().fg(palette.success).add_modifier(Modifier::BOLD),
                ),
                Span::raw("Yes  "),
                Span::styled(" n/Esc ", palette.error().add_modifier(Modifier::BOLD)),
                Span::raw("No, cancel"),
            ]),
        ];

        let paragraph = Paragraph::new(content)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.warning))
                    .title(format!(" {} ", self.title))
                    .title_style(Style::default().fg(palette.warning).add_modifier(Modifier::BOLD)),
            )
            .alignment(Alignment::Center);

        frame.render_widget(paragraph, popup_area);
        Ok(())
    }
}

impl Component for ConfirmDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(self.on_confirm.clone()),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(Action::CloseModal),
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
    use crossterm::event::KeyModifiers;
    use ratatui::{backend::TestBackend, Terminal};

    fn press(dialog: &mut ConfirmDialog, c: char) -> Option<Action> {
        dialog
            .handle_key_event(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
            .unwrap()
    }

    #[test]
    fn test_yes_emits_confirm_action() {
        let mut dialog = ConfirmDialog::delete_table_group(7, "g-1", "core");
        assert_eq!(
            press(&mut dialog, 'y'),
            Some(Action::DeleteTableGroup {
                connection_id: 7,
                group_id: "g-1".to_string()
            })
        );
        assert_eq!(press(&mut dialog, 'n'), Some(Action::CloseModal));
        assert_eq!(press(&mut dialog, 'z'), None);
    }

    #[test]
    fn test_quit_dialog_renders_prompt() {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        let dialog = ConfirmDialog::quit();
        terminal
            .draw(|frame| {
                let palette = Palette::for_mode(Default::default());
                dialog.draw_with(frame, frame.area(), &palette).unwrap();
            })
            .unwrap();
        let rendered: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(rendered.contains("Are you sure you want to quit?"));
        assert_eq!(dialog.on_confirm, Action::ForceQuit);
    }
}
