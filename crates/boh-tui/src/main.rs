//! BOH Member Desk - a terminal client for the club's member backend.
//!
//! Meetings and attendance, dues previews, quarterly report downloads,
//! archived members and the AI assistant, from one keyboard-driven screen.

mod app;
mod cli;
mod printing;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::{App, AppState};
use boh_core::Config;
use cli::{Cli, Command};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file prefix inside `{cache_dir}/logs`.
const LOG_FILE_NAME: &str = "boh.log";

fn env_filter() -> EnvFilter {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to stderr for one-shot CLI commands.
fn init_cli_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter())
        .init();
}

/// The TUI owns the terminal, so log to a daily file instead. The guard
/// must live until exit to flush the writer.
fn init_tui_tracing() -> WorkerGuard {
    let log_dir = Config::load()
        .and_then(|c| c.cache_dir())
        .unwrap_or_else(|_| PathBuf::from("./cache"))
        .join("logs");
    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter())
        .init();
    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let invite_token = match cli.command {
        None => None,
        Some(Command::AcceptInvite { token }) => Some(token),
        Some(command) => {
            init_cli_tracing();
            return run_command(command).await;
        }
    };

    let _log_guard = init_tui_tracing();
    info!("BOH Member Desk starting");

    let mut app = App::new()?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    if invite_token.is_some() {
        app.open_invite(invite_token);
    } else if !app.is_authenticated() {
        app.start_login();
    } else {
        app.refresh_current_tab();
    }

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("BOH Member Desk shutting down");
    Ok(())
}

async fn run_command(command: Command) -> Result<()> {
    match command {
        Command::Login => {
            let mut app = App::new()?;
            app.login_interactive().await
        }
        Command::Logout => cli::logout().await,
        Command::Report { kind, filter, out } => cli::report(kind, &filter, out).await,
        Command::Preview { filter, print } => cli::preview(&filter, print).await,
        Command::ExportArchived { out } => cli::export_archived(out).await,
        Command::Chat { message } => cli::chat(&message).await,
        // Handled by the TUI
        Command::AcceptInvite { .. } => Ok(()),
    }
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                // Handle input
                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
