mod action;
mod app;
mod backend;
mod config;
mod connection;
mod error;
mod event;
mod location;
mod navigator;
mod paginated;
mod profile;
mod rest;
mod route;
mod tui;
mod types;
mod ui;

use std::fs::{self, OpenOptions};
use std::panic;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::action::Action;
use crate::app::App;
use crate::backend::Backend;
use crate::config::{Config, ENDPOINT_ENV};
use crate::event::Event;
use crate::rest::RestBackend;
use crate::tui::EventHandler;

/// Browse user and organization profiles in the terminal.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Where to start, e.g. `belchior` or `/belchior?tab=followers`
    #[arg(default_value = "/")]
    location: String,

    /// Base URL of the profile backend
    #[arg(long)]
    endpoint: Option<String>,

    /// Read configuration from this file instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_logging();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    let env_endpoint = std::env::var(ENDPOINT_ENV).ok();
    let endpoint = config.endpoint(cli.endpoint.as_deref(), env_endpoint.as_deref());
    let backend = RestBackend::new(&endpoint, config.timeout())?;
    tracing::info!(%endpoint, "starting");

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let result = run(Arc::new(backend), cli.location).await;

    tui::restore()?;

    result
}

/// Log to a file under the cache directory, since the terminal belongs to
/// the UI. Falls back to stderr when the file cannot be opened.
fn init_logging() {
    let log_file = dirs::cache_dir()
        .map(|dir| dir.join("hubprofile"))
        .and_then(|dir| {
            fs::create_dir_all(&dir).ok()?;
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join("hubprofile.log"))
                .ok()
        });

    let writer = match log_file {
        Some(file) => BoxMakeWriter::new(Mutex::new(file)),
        None => BoxMakeWriter::new(std::io::stderr),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer),
        )
        .init();
}

async fn run(backend: Arc<dyn Backend>, start: String) -> Result<(), Box<dyn std::error::Error>> {
    let mut terminal = tui::init()?;

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    let mut app = App::new(backend, action_tx.clone(), start);

    let tick_rate = Duration::from_millis(250);
    let render_rate = Duration::from_millis(16); // ~60fps
    let mut events = EventHandler::new(tick_rate, render_rate);

    loop {
        tokio::select! {
            Some(event) = events.next() => {
                if event.is_quit() {
                    break;
                }

                match event {
                    Event::Render | Event::Resize => {
                        terminal.draw(|frame| ui::render(frame, &app))?;
                    }
                    _ => {
                        let action = app.handle_event(event);
                        if !matches!(action, Action::None) {
                            action_tx.send(action)?;
                        }
                    }
                }
            }
            Some(action) = action_rx.recv() => {
                app.update(action);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
