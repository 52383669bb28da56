//! dq-dash - A terminal dashboard for data-quality profiling
//!
//! This is the main entry point for the dq-dash application.
//! It uses the Component Architecture pattern from ratatui.

mod action;
mod app;
mod component;
mod components;
mod config;
mod logging;
mod model;
mod services;
mod tui;

use crate::action::Action;
use crate::app::App;
use crate::component::Component;
use crate::config::{Config, TokenStore};
use crate::tui::{Tui, DEFAULT_TICK_MS};
use anyhow::Result;
use clap::Parser;
use crossterm::event::Event;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

/// Terminal dashboard for a data-quality profiling service
#[derive(Parser, Debug)]
#[command(name = "dq-dash", version, about)]
struct Args {
    /// Backend base URL (overrides the config file)
    #[arg(long, env = "DQ_DASH_BASE_URL")]
    base_url: Option<String>,

    /// Bearer token for this session only; the stored token is left untouched
    #[arg(long, env = "DQ_DASH_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Config file [default: ~/.dq-dash/config.json]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log file [default: ~/.dq-dash/dq-dash.log]
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// UI tick interval in milliseconds
    #[arg(long, default_value_t = DEFAULT_TICK_MS)]
    tick_ms: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    match logging::init_logging(args.log_file.clone()) {
        Ok(Some(path)) => info!(path = %path.display(), "logging started"),
        Ok(None) => {}
        Err(e) => eprintln!("warning: logging disabled: {:#}", e),
    }

    let config_path = args.config.clone().or_else(Config::default_path);
    let mut config = config_path
        .as_deref()
        .and_then(Config::load_from)
        .unwrap_or_default();
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }

    let tokens = match args.token {
        Some(token) => TokenStore::in_memory(Some(token)),
        None => TokenStore::default_path()
            .map(TokenStore::load)
            .unwrap_or_else(|| TokenStore::in_memory(None)),
    };

    // Create app state before touching the terminal so a bad URL is reported plainly
    let mut app = App::new(config, config_path, tokens)?;

    // Setup terminal
    let mut tui = Tui::new(Duration::from_millis(args.tick_ms.max(1)))?;
    tui.enter()?;

    app.init()?;

    // Main event loop
    let result = run_app(&mut tui, &mut app);

    // Cleanup terminal
    tui.exit()?;

    // Handle any errors
    if let Err(err) = result {
        error!(error = %err, "application error");
        eprintln!("Error: {:?}", err);
        std::process::exit(1);
    }

    info!("exiting");
    Ok(())
}

/// Run the main application loop
fn run_app(tui: &mut Tui, app: &mut App) -> Result<()> {
    while !app.should_quit {
        // Draw the UI
        tui.draw(|frame| {
            if let Err(e) = app.draw(frame, frame.area()) {
                error!(error = %e, "draw failed");
            }
        })?;

        // Poll for events
        if let Some(event) = tui.next_event()? {
            // Convert event to action
            let action = match event {
                Event::Key(key) => app.handle_key_event(key)?,
                Event::Resize(w, h) => Some(Action::Resize(w, h)),
                _ => None,
            };

            // Action might produce a follow-up action
            let mut current_action = action;
            while let Some(a) = current_action {
                current_action = app.update(a)?;
            }
        } else {
            // No event - drain finished API calls
            app.update(Action::Tick)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["dq-dash"]).unwrap();
        assert_eq!(args.tick_ms, DEFAULT_TICK_MS);
        assert!(args.config.is_none());
    }

    #[test]
    fn test_args_overrides() {
        let args = Args::try_parse_from([
            "dq-dash",
            "--base-url",
            "http://dq.internal:9000",
            "--tick-ms",
            "250",
            "--config",
            "/tmp/dq.json",
        ])
        .unwrap();
        assert_eq!(args.base_url.as_deref(), Some("http://dq.internal:9000"));
        assert_eq!(args.tick_ms, 250);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/dq.json")));
    }
}
