mod action;
mod app;
mod config;
mod error;
mod event;
mod github;
mod route;
mod screens;
mod store;
mod tui;
mod types;
mod ui;

use std::panic;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::action::Action;
use crate::app::App;
use crate::config::Config;
use crate::event::Event;
use crate::github::{split_full_name, GitHub};
use crate::route::Route;
use crate::store::{FileStore, KeyValueStore, MemoryStore};
use crate::tui::EventHandler;

#[derive(Debug, Parser)]
#[command(version, about = "Track GitHub repositories and browse their issues")]
struct Cli {
    /// Open this repository (owner/name) directly
    repository: Option<String>,

    /// Config file (default: ~/.config/ghtrack/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// GitHub API base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Directory for the tracked repository list
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log file; filter with RUST_LOG (default: warn)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Flushes buffered log lines when main returns
    let _log_guard = init_logging(cli.log_file.clone());

    let mut config = Config::load(cli.config.as_deref());
    config.apply_cli(cli.api_url, cli.data_dir);

    let start = match cli.repository.as_deref() {
        Some(name) => {
            split_full_name(name)?;
            Some(Route::repository(name.trim()).path())
        }
        None => None,
    };

    let github = GitHub::new(&config.api)?;
    tracing::info!(?github, "starting");

    let store: Arc<dyn KeyValueStore> = match config.data_dir() {
        Some(dir) => Arc::new(FileStore::new(dir)),
        None => {
            tracing::warn!("no data directory available, repository list will not persist");
            Arc::new(MemoryStore::new())
        }
    };

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let result = run(Arc::new(github), store, config.issues.per_page, start).await;

    tui::restore()?;

    result
}

/// Logs go to a file since the TUI owns the terminal; stderr if it can't be opened
fn init_logging(path: Option<PathBuf>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let path = path.or_else(|| Some(dirs::cache_dir()?.join("ghtrack").join("ghtrack.log")));

    let appender = path.and_then(|p| {
        let file_name = p.file_name()?.to_string_lossy().into_owned();
        let dir = p
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(file_name)
            .build(dir)
            .ok()
    });

    let registry = tracing_subscriber::registry().with(filter);
    match appender {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
            Some(guard)
        }
        None => {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
            None
        }
    }
}

async fn run(
    github: Arc<GitHub>,
    store: Arc<dyn KeyValueStore>,
    per_page: u8,
    start: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize terminal
    let mut terminal = tui::init()?;

    // Create action channel
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    // Create app state
    let mut app = App::new(github, store, per_page, action_tx.clone());

    if let Some(path) = start {
        action_tx.send(Action::Navigate(path))?;
    }

    // Create event handler
    let render_rate = Duration::from_millis(16); // ~60fps
    let mut events = EventHandler::new(render_rate);

    // Main loop
    loop {
        tokio::select! {
            Some(event) = events.next() => {
                if event.is_quit() {
                    break;
                }

                match event {
                    Event::Render => {
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
