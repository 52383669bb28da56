//! Terminal session
//!
//! Raw mode and the alternate screen are held only between `enter` and
//! `exit`. Network work never happens here; `next_event` returning `None` is
//! the loop's cue to tick.

use anyhow::Result;
use crossterm::{
    cursor,
    event::{self, Event, KeyEventKind},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_TICK_MS: u64 = 100;

pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// How long `next_event` waits before reporting a tick
    tick_rate: Duration,
    /// Raw mode and alternate screen are in effect
    active: bool,
}

impl Tui {
    pub fn new(tick_rate: Duration) -> Result<Self> {
        let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        Ok(Self {
            terminal,
            tick_rate,
            active: false,
        })
    }

    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.active = true;
        crossterm::execute!(io::stdout(), EnterAlternateScreen, cursor::Hide)?;
        self.terminal.clear()?;
        debug!(tick_ms = self.tick_rate.as_millis() as u64, "terminal session started");
        Ok(())
    }

    /// Restore the terminal. Safe to call more than once.
    pub fn exit(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        terminal::disable_raw_mode()?;
        crossterm::execute!(io::stdout(), LeaveAlternateScreen, cursor::Show)?;
        Ok(())
    }

    /// Next key press or resize within one tick, `None` on timeout.
    ///
    /// Key releases and repeats (reported on Windows) count as a tick.
    pub fn next_event(&self) -> Result<Option<Event>> {
        if !event::poll(self.tick_rate)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Press => Ok(None),
            event => Ok(Some(event)),
        }
    }

    pub fn draw(&mut self, render: impl FnOnce(&mut Frame)) -> Result<()> {
        self.terminal.draw(render)?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        // An error path out of the event loop still leaves a usable shell
        if let Err(e) = self.exit() {
            debug!(error = %e, "terminal restore failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_inactive_until_entered() {
        // Creating the backend does not touch terminal modes, so this works
        // without a TTY
        if let Ok(mut tui) = Tui::new(Duration::from_millis(250)) {
            assert_eq!(tui.tick_rate, Duration::from_millis(250));
            assert!(!tui.active);
            // Leaving a session that never started writes nothing
            tui.exit().unwrap();
            assert!(!tui.active);
        }
    }
}
