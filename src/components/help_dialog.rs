//! Help dialog component
//!
//! Displays all keyboard shortcuts available in the application.

use crate::action::Action;
use crate::component::Component;
use crate::components::layout::inset;
use crate::components::theme::Palette;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Margin, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

/// Help dialog showing all keyboard shortcuts
#[derive(Default)]
pub struct HelpDialog {
    pub scroll_offset: usize,
}

impl Component for HelpDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => Some(Action::CloseModal),
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll_offset = self.scroll_offset.saturating_add(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
                None
            }
            KeyCode::PageDown => {
                self.scroll_offset = self.scroll_offset.saturating_add(10);
                None
            }
            KeyCode::PageUp => {
                self.scroll_offset = self.scroll_offset.saturating_sub(10);
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let palette = Palette::for_mode(Default::default());
        self.draw_with(frame, area, &palette)
    }
}

impl HelpDialog {
    pub fn draw_with(&mut self, frame: &mut Frame, area: Rect, palette: &Palette) -> Result<()> {
        let dialog_area = inset(area, 4);
        frame.render_widget(Clear, dialog_area);

        let content = build_help_content(palette);
        let total = content.len();
        let visible_height = dialog_area.height.saturating_sub(2) as usize;

        // Clamp scroll offset
        let max_scroll = total.saturating_sub(visible_height);
        if self.scroll_offset > max_scroll {
            self.scroll_offset = max_scroll;
        }

        let paragraph = Paragraph::new(content)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Keyboard Shortcuts ")
                    .title_style(palette.title())
                    .border_style(Style::default().fg(palette.accent)),
            )
            .scroll((self.scroll_offset as u16, 0));

        frame.render_widget(paragraph, dialog_area);

        if total > visible_height {
            let mut scrollbar_state =
                ScrollbarState::new(total.saturating_sub(visible_height)).position(self.scroll_offset);

            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight)
                    .begin_symbol(Some("↑"))
                    .end_symbol(Some("↓")),
                dialog_area.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }

        Ok(())
    }
}

/// Build the help content with all keyboard shortcuts
fn build_help_content(palette: &Palette) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let section_style = Style::default().fg(palette.warning).add_modifier(Modifier::BOLD);
    let key_style = Style::default().fg(palette.accent).add_modifier(Modifier::BOLD);
    let text_style = Style::default().fg(palette.text);
    let rule_style = palette.muted();

    let add_section = |lines: &mut Vec<Line<'static>>, title: &str| {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {} ", title), section_style)));
        lines.push(Line::from(Span::styled(
            format!("  {}", "─".repeat(title.len() + 2)),
            rule_style,
        )));
    };

    let add_shortcut = |lines: &mut Vec<Line<'static>>, key: &str, description: &str| {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:12}", key), key_style),
            Span::styled(description.to_string(), text_style),
        ]));
    };

    add_section(&mut lines, "Global");
    add_shortcut(&mut lines, "1 / 2", "Dashboard / Data Sources");
    add_shortcut(&mut lines, "s", "Switch screen");
    add_shortcut(&mut lines, "Tab", "Next pane");
    add_shortcut(&mut lines, "Shift+Tab", "Previous pane");
    add_shortcut(&mut lines, "r", "Refresh current screen");
    add_shortcut(&mut lines, "h", "Run history");
    add_shortcut(&mut lines, "T", "Toggle light/dark theme");
    add_shortcut(&mut lines, "L", "Set or clear the API token");
    add_shortcut(&mut lines, "?", "Show this help");
    add_shortcut(&mut lines, "q", "Quit");

    add_section(&mut lines, "Dashboard");
    add_shortcut(&mut lines, "j / ↓", "Next run or table");
    add_shortcut(&mut lines, "k / ↑", "Previous run or table");
    add_shortcut(&mut lines, "Home / G", "First / last item");
    add_shortcut(&mut lines, "Enter", "Select highlighted run or table");
    add_shortcut(&mut lines, "← / →", "Focus summary card");
    add_shortcut(&mut lines, "[ / ]", "Move focused card left / right");
    add_shortcut(&mut lines, "Ctrl+d/u", "Page table details");

    add_section(&mut lines, "Data Sources");
    add_shortcut(&mut lines, "Enter", "Open connection / table group");
    add_shortcut(&mut lines, "→ / l", "Focus table groups");
    add_shortcut(&mut lines, "← / Esc", "Back to connections");
    add_shortcut(&mut lines, "a", "New connection");
    add_shortcut(&mut lines, "e", "Edit opened connection");
    add_shortcut(&mut lines, "x", "Delete highlighted connection");
    add_shortcut(&mut lines, "g", "New table group");
    add_shortcut(&mut lines, "X", "Delete highlighted table group");
    add_shortcut(&mut lines, "p", "Run profiling for table group");

    add_section(&mut lines, "Forms");
    add_shortcut(&mut lines, "Tab / ↓", "Next field");
    add_shortcut(&mut lines, "Shift+Tab", "Previous field");
    add_shortcut(&mut lines, "← / →", "Change choice");
    add_shortcut(&mut lines, "Ctrl+t", "Test connection");
    add_shortcut(&mut lines, "Ctrl+s", "Save");
    add_shortcut(&mut lines, "Esc", "Close");

    // Footer
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Press q, Esc, or ? to close",
        rule_style,
    )));

    lines
}
