//! Bookdesk - a terminal console for administering an audiobook catalog.
//!
//! Keyboard-driven screens for users, authors, audiobooks and categories,
//! backed by the catalog's admin REST API.

mod app;
mod ui;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bookdesk_core::auth::{Session, SharedAuth};
use bookdesk_core::config::Config;
use bookdesk_core::forms::LoginForm;
use bookdesk_core::ApiClient;

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file prefix inside the cache directory (rotated daily)
const LOG_FILE_NAME: &str = "bookdesk.log";

/// Initialize the tracing subscriber for logging.
///
/// The TUI owns the terminal, so it logs to a daily file in `log_dir`.
/// CLI commands pass `None` and log to stderr. Use RUST_LOG to control the
/// level (e.g., RUST_LOG=debug).
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("--help") | Some("-h") => {
            print_usage();
            return Ok(());
        }
        Some("--counts") => {
            init_tracing(None);
            return print_counts().await;
        }
        Some("--register") => {
            init_tracing(None);
            return register_admin().await;
        }
        Some(other) => {
            eprintln!("Unknown option: {}\n", other);
            print_usage();
            std::process::exit(2);
        }
        None => {}
    }

    // Initialize logging
    let log_dir = Config::load()
        .unwrap_or_default()
        .cache_dir()
        .unwrap_or_else(|_| PathBuf::from("./cache"));
    let _log_guard = init_tracing(Some(&log_dir));
    info!("bookdesk starting");

    // Create app before touching the terminal so config errors print normally
    let mut app = App::new()?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app);

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

    info!("bookdesk shutting down");
    Ok(())
}

fn print_usage() {
    println!("bookdesk {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: bookdesk [OPTION]");
    println!();
    println!("With no option, starts the terminal console.");
    println!();
    println!("Options:");
    println!("  --counts      Print user, author and audiobook counts as JSON");
    println!("  --register    Create a new admin account");
    println!("  -h, --help    Show this message");
    println!();
    println!("Environment:");
    println!("  BOOKDESK_API_URL    API base URL");
    println!("  BOOKDESK_EMAIL      Prefill the login email");
    println!("  BOOKDESK_PASSWORD   Prefill the login password");
}

/// Build an API client using the remembered session, if any
fn client_from_saved_session() -> Result<(ApiClient, SharedAuth)> {
    let config = Config::load()?;
    let cache_dir = config.cache_dir()?;
    let auth = SharedAuth::with_store(Session::new(cache_dir));
    let api = ApiClient::new(&config.base_url(), auth.clone())?;
    Ok((api, auth))
}

/// Print the catalog counts using the remembered session
async fn print_counts() -> Result<()> {
    let (api, auth) = client_from_saved_session()?;
    if !auth.is_logged_in() {
        bail!("No saved session. Run bookdesk, log in with \"Remember me\", then try again.");
    }

    let counts = api
        .fetch_counts()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    println!("{}", serde_json::to_string_pretty(&counts)?);
    Ok(())
}

/// Register a new admin from the command line
async fn register_admin() -> Result<()> {
    let (api, _auth) = client_from_saved_session()?;

    let email = match std::env::var("BOOKDESK_EMAIL") {
        Ok(email) => email,
        Err(_) => {
            eprint!("Email: ");
            io::stderr().flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            line.trim().to_string()
        }
    };
    let password = match std::env::var("BOOKDESK_PASSWORD") {
        Ok(password) => password,
        Err(_) => rpassword::prompt_password("Password: ").context("Failed to read password")?,
    };

    let mut form = LoginForm::with_email(email);
    form.password = password;
    let credentials = form.validate()?;

    let response = api
        .register(&credentials)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    info!(email = %credentials.email, "Admin registered");

    let message = response
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("Registration successful.");
    println!("{}", message);
    Ok(())
}

fn run_app(
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
                if handle_input(app, key)? {
                    return Ok(());
                }
            }
        }

        // Advance debounces, the auth guard and pending queries
        app.tick(Instant::now());

        // Check for completed background tasks
        app.check_background_tasks();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
