//! NexoHub console - a terminal front door to the CupoYa and CajaCero apps.
//!
//! Signs in against the NexoHub API, keeps the access token, and shows the
//! landing screen. A few flags run one-shot commands without the TUI.

mod app;
mod ui;

use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use nexohub_core::api::AuthClient;
use nexohub_core::auth::{open_store, Session};
use nexohub_core::config::{default_data_dir, Config};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file name prefix inside the data directory's `logs/`
const LOG_FILE_PREFIX: &str = "nexohub.log";

const USAGE: &str = "\
Usage: nexohub [COMMAND]

With no command, opens the console.

Commands:
  --login    Sign in from the terminal prompt
  --logout   Remove the stored access token
  --status   Show the API endpoint and whether a token is stored
  --health   Check that the API is reachable
  -h, --help Show this message";

fn env_filter() -> EnvFilter {
    // RUST_LOG controls the level (e.g., RUST_LOG=debug)
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to stderr, for one-shot commands
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter())
        .init();
}

/// Log to a daily file so output doesn't tear the terminal UI.
/// The guard must live until shutdown to flush buffered lines.
fn init_file_tracing(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter())
        .init();
    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().collect();
    if let Some(command) = args.get(1) {
        init_tracing();
        return match command.as_str() {
            "--login" => login_command().await,
            "--logout" => logout_command(),
            "--status" => status_command(),
            "--health" => health_command().await,
            "-h" | "--help" => {
                println!("{}", USAGE);
                Ok(())
            }
            other => {
                eprintln!("{}", USAGE);
                Err(anyhow::anyhow!("Unknown argument '{}'", other))
            }
        };
    }

    // Before Config::load so its override warnings reach the log
    let _guard = init_file_tracing(&default_data_dir()?.join("logs"))?;
    let config = Config::load()?;
    info!(api = %config.api_base_url, "NexoHub console starting");

    let mut app = App::new(config)?;
    app.restore_session();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("NexoHub console shutting down");
    Ok(())
}

async fn login_command() -> Result<()> {
    let mut app = App::new(Config::load()?)?;
    app.login_interactive().await
}

fn logout_command() -> Result<()> {
    let config = Config::load()?;
    let mut session = Session::new(open_store(config.token_storage, &config.data_dir()?));
    session.clear()?;
    println!("Signed out.");
    Ok(())
}

fn status_command() -> Result<()> {
    let config = Config::load()?;
    let mut session = Session::new(open_store(config.token_storage, &config.data_dir()?));

    println!("API:      {}{}", config.api_base_url, config.login_path);
    println!("Storage:  {:?}", config.token_storage);
    if session.load()? {
        println!("Session:  token stored");
    } else {
        println!("Session:  not signed in");
    }
    Ok(())
}

async fn health_command() -> Result<()> {
    let config = Config::load()?;
    let client = AuthClient::from_config(&config)?;

    eprint!("Checking {}... ", config.api_base_url);
    match client.health().await {
        Ok(health) if health.is_ok() => {
            eprintln!("✓ {}", health.status);
            Ok(())
        }
        Ok(health) => {
            eprintln!("✗ {}", health.status);
            Err(anyhow::anyhow!("API reported status '{}'", health.status))
        }
        Err(e) => {
            eprintln!("✗");
            Err(e)
        }
    }
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout so login results show up promptly
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key) {
                    return Ok(());
                }
            }
        }

        // Apply any finished login request
        app.check_background_tasks();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
