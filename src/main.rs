// paneboard - terminal dashboard of command-driven panes
//
// Panes are bordered regions of the terminal arranged in two columns. List
// panes have a selectable row whose value drives other panes through bindings;
// text panes show whatever their producer last published.
//
// Architecture:
// - Session: single control thread owning the pane registry, layout, focus
//   and the draw/input loop (ratatui over crossterm)
// - Panes: off-screen surfaces plus thread-safe content cells
// - Producers (tokio): pollers, per-row info caches and follow feeds writing
//   into content cells
// - Config: TOML file + env + CLI flags; logging via tracing into a buffer

mod cli;
mod config;
mod dashboard;
mod demo;
mod logging;
mod pane;
mod producer;
mod session;
mod sync_cell;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use config::Config;
use logging::LogBuffer;
use session::terminal::run_dashboard;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle CLI commands first (config --path, --show, --init)
    if cli::handle_cli(&cli)? {
        return Ok(());
    }

    // Configuration errors abort here, before the terminal is touched
    let config = Config::load(cli.config.clone(), cli.demo)?;

    // Logs go to the in-memory buffer (and optionally files), never stdout.
    // The guard must be kept alive for the duration of the program so logs flush.
    let log_buffer = LogBuffer::new();
    let _file_guard = logging::init(&config.logging, &log_buffer);

    match &config.source {
        Some(path) => tracing::info!("Loaded configuration from {}", path.display()),
        None => tracing::info!("No configuration file, using defaults"),
    }

    let running = Arc::new(AtomicBool::new(true));

    // SIGINT outside raw mode (e.g. `kill -INT`) stops the loop like `q`
    let signal_flag = Arc::clone(&running);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping");
            signal_flag.store(false, Ordering::SeqCst);
        }
    });

    // The session loop blocks; producers keep running on the other workers
    let runtime = Handle::current();
    let result = tokio::task::block_in_place(|| {
        run_dashboard(config.tick, Arc::clone(&running), |session| {
            dashboard::build(session, &config, &runtime, &log_buffer)
        })
    });

    running.store(false, Ordering::SeqCst);
    if let Err(e) = &result {
        tracing::error!("Dashboard stopped with error: {:#}", e);
    }
    result
}
