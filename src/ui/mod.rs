//! Interactive terminal launcher
//!
//! - `app` - [`AppState`] and key handling
//! - `draw` - Rendering with ratatui
//!
//! [`run`] owns the terminal for the life of the screen and always restores it
//! before returning, including on error.

mod app;
mod draw;

pub use app::{to_input_key, AppState, UiAction};
pub use draw::draw;

use std::io::{self, Stdout};

use anyhow::{Context, Result};
use crossterm::cursor;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;

use crate::config::Config;

type TuiTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Show the launcher until the user quits or finishes a command.
///
/// Returns the command to run, if any. The terminal is restored before this
/// returns so the caller can hand stdio to the child process.
pub fn run(config: &Config) -> Result<Option<String>> {
    let mut app = AppState::new(config);
    let mut terminal = init_terminal()?;

    let outcome = run_loop(&mut terminal, &mut app);
    let restored = restore_terminal(&mut terminal);

    let command = outcome?;
    restored?;

    info!(
        event_type = "ui_event",
        action = if command.is_some() { "run" } else { "quit" },
        "Launcher closed"
    );
    Ok(command)
}

fn init_terminal() -> Result<TuiTerminal> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("failed to create terminal")
}

fn restore_terminal(terminal: &mut TuiTerminal) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, cursor::Show)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")
}

fn run_loop(terminal: &mut TuiTerminal, app: &mut AppState) -> Result<Option<String>> {
    loop {
        terminal.draw(|frame| draw(frame, app))?;

        let Event::Key(key) = event::read().context("failed to read terminal event")? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.on_key(key) {
            UiAction::None => {}
            UiAction::Quit => return Ok(None),
            UiAction::Run(command) => return Ok(Some(command)),
        }
    }
}
