//! wxdash - live weather and hazard dashboard for the terminal
//!
//! Shows current conditions kept fresh by the refresh controller, a 7-day
//! outlook, and a hazard alert feed for any location.

use std::io;
use std::panic;
use std::process;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use wxdash::app::App;
use wxdash::cache::CacheManager;
use wxdash::cli::{Cli, StartupConfig};
use wxdash::{logging, refresh, ui};

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    let log_dir = CacheManager::new()
        .map(|cache| cache.dir().to_path_buf())
        .unwrap_or_else(std::env::temp_dir);
    if let Err(e) = logging::init(&log_dir) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let mut app = App::new(&config);
    app.resolve_place_name().await;
    if !app.weather_client().has_api_key() {
        tracing::warn!("no API key configured, fetches will fail until one is set");
    }

    setup_panic_hook();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let handle = refresh::subscribe(
        Arc::new(app.weather_client().clone()),
        app.location.clone(),
        config.refresh,
    );

    terminal.draw(|f| ui::render(f, &app))?;
    app.load_forecast().await;
    app.refresh_alerts(Instant::now());

    loop {
        app.sync_session(handle.session());
        terminal.draw(|f| ui::render(f, &app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            break;
        }

        if app.refresh_requested {
            app.refresh_requested = false;
            handle.force_refresh();
            app.load_forecast().await;
        }

        if app.search_requested {
            app.run_search().await;
        }

        if let Some(location) = app.pending_location.take() {
            handle.set_location(location.clone());
            app.set_location(location);
            app.load_forecast().await;
            app.refresh_alerts(Instant::now());
        }

        let now = Instant::now();
        if app.alerts_due(now) {
            app.refresh_alerts(now);
        }
    }

    handle.dispose();
    tracing::info!("wxdash exiting");

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}
