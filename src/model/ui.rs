//! UI state - presentation state separate from domain data

use serde::{Deserialize, Serialize};

/// Colour scheme, persisted in the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    #[default]
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }
}

/// Top-level screens, shown as tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Dashboard,
    DataSources,
}

impl Screen {
    pub fn all() -> Vec<Screen> {
        vec![Screen::Dashboard, Screen::DataSources]
    }

    pub fn name(&self) -> &str {
        match self {
            Screen::Dashboard => "Dashboard",
            Screen::DataSources => "Data Sources",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Screen::Dashboard => 0,
            Screen::DataSources => 1,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Screen::Dashboard => Screen::DataSources,
            Screen::DataSources => Screen::Dashboard,
        }
    }
}

/// Focused pane on the dashboard screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pane {
    #[default]
    Runs,
    Tables,
    Detail,
}

impl Pane {
    pub fn next(self) -> Self {
        match self {
            Pane::Runs => Pane::Tables,
            Pane::Tables => Pane::Detail,
            Pane::Detail => Pane::Runs,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Pane::Runs => Pane::Detail,
            Pane::Tables => Pane::Runs,
            Pane::Detail => Pane::Tables,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_toggle_and_serde() {
        assert_eq!(ThemeMode::default(), ThemeMode::Dark);
        assert_eq!(ThemeMode::Dark.toggled(), ThemeMode::Light);
        assert_eq!(serde_json::to_string(&ThemeMode::Light).unwrap(), "\"light\"");
        let parsed: ThemeMode = serde_json::from_str("\"dark\"").unwrap();
        assert_eq!(parsed, ThemeMode::Dark);
    }

    #[test]
    fn test_pane_cycle() {
        assert_eq!(Pane::Runs.next().next().next(), Pane::Runs);
        assert_eq!(Pane::Runs.previous(), Pane::Detail);
        assert_eq!(Screen::Dashboard.next(), Screen::DataSources);
    }
}
