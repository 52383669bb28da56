//! Colour palettes for the light and dark themes

use crate::model::profiling::StatusKind;
use crate::model::ui::ThemeMode;
use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub border: Color,
    pub focus_border: Color,
    pub highlight_bg: Color,
    pub highlight_fg: Color,
    pub success: Color,
    pub error: Color,
    pub warning: Color,
}

impl Palette {
    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Dark => Self {
                text: Color::White,
                muted: Color::DarkGray,
                accent: Color::Cyan,
                border: Color::Gray,
                focus_border: Color::Cyan,
                highlight_bg: Color::Blue,
                highlight_fg: Color::White,
                success: Color::Green,
                error: Color::Red,
                warning: Color::Yellow,
            },
            ThemeMode::Light => Self {
                text: Color::Black,
                muted: Color::Gray,
                accent: Color::Blue,
                border: Color::DarkGray,
                focus_border: Color::Blue,
                highlight_bg: Color::LightBlue,
                highlight_fg: Color::Black,
                success: Color::Green,
                error: Color::Red,
                warning: Color::Magenta,
            },
        }
    }

    pub fn status_color(&self, status: &str) -> Color {
        match StatusKind::of(status) {
            StatusKind::Completed => self.success,
            StatusKind::Failed => self.error,
            StatusKind::Other => self.warning,
        }
    }

    pub fn title(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn header(&self) -> Style {
        Style::default().fg(self.text).add_modifier(Modifier::BOLD)
    }

    pub fn highlight(&self) -> Style {
        Style::default().bg(self.highlight_bg).fg(self.highlight_fg)
    }

    pub fn border(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.focus_border)
        } else {
            Style::default().fg(self.border)
        }
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn error(&self) -> Style {
        Style::default().fg(self.error)
    }
}
