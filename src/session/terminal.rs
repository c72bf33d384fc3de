// Terminal setup and teardown around a Session run
//
// Raw mode and the alternate screen are entered before the session is built
// and always left again, whether setup, the loop, or neither failed.

use super::input::CrosstermInput;
use super::Session;
use anyhow::{Context, Result};
use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

pub type TerminalSession = Session<CrosstermBackend<Stdout>>;

/// Take over the terminal, let `setup` register panes and hooks, then run
/// the session until it is stopped.
pub fn run_dashboard<F>(tick: Duration, running: Arc<AtomicBool>, setup: F) -> Result<()>
where
    F: FnOnce(&mut TerminalSession) -> Result<()>,
{
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen, Hide) {
        let _ = disable_raw_mode();
        return Err(e).context("Failed to setup terminal");
    }

    let result = build_and_run(tick, running, setup);

    let restored = restore();
    // A loop error is more useful than a restore error; report it first
    result.and(restored)
}

fn build_and_run<F>(tick: Duration, running: Arc<AtomicBool>, setup: F) -> Result<()>
where
    F: FnOnce(&mut TerminalSession) -> Result<()>,
{
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
    terminal.clear().context("Failed to clear terminal")?;

    let mut session = Session::new(terminal, Box::new(CrosstermInput), tick, running)?;
    setup(&mut session)?;
    session.run()
}

fn restore() -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(io::stdout(), LeaveAlternateScreen, Show).context("Failed to restore terminal")?;
    Ok(())
}
