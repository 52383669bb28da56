//! Component trait - Interface for UI components
//!
//! Each panel and dialog encapsulates its own presentation state, key
//! handling and rendering. Components talk to the rest of the app through
//! Actions; API data they need for drawing is passed in by the App.

use crate::action::Action;
use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

/// Trait for UI components
///
/// 1. `handle_key_event` - Convert a key press into an Action
/// 2. `update` - Apply an Action to local state
/// 3. `draw` - Render
pub trait Component {
    /// Called once before the first draw
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    /// Handle a key event, returning an optional Action
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let _ = key;
        Ok(None)
    }

    /// Update component state based on an Action, optionally emitting a
    /// follow-up Action
    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        let _ = action;
        Ok(None)
    }

    /// Draw the component into `area`
    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()>;
}
