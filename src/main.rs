mod app;
mod catalog;
mod config;
mod filter;
mod input;
mod logging;
mod text;
mod ui;

use app::{App, FetchOutcome, FetchRequest};
use catalog::{CatalogClient, HttpCatalog};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// Browse TV shows and episodes from the TVmaze catalog
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Catalog API origin
    #[arg(long = "api-url")]
    api_url: Option<String>,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write the log file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let file = config::load_config_with_precedence(cli.config.as_deref())?;
    let config = config::resolve(
        file,
        config::CliOverrides {
            api_base_url: cli.api_url,
            request_timeout_secs: cli.timeout,
            log_file_path: cli.log_file,
        },
    );

    if let Err(e) = logging::init(&config.log_file_path) {
        eprintln!("Warning: logging disabled: {}", e);
    }
    tracing::info!(api = %config.api_base_url, "starting");

    let source = HttpCatalog::new(&config.api_base_url, config.request_timeout)?;
    let client = Arc::new(CatalogClient::new(source));
    let (tx, mut rx) = unbounded_channel();

    let mut app = App::new();
    dispatch(&client, &tx, app.start());

    // Init terminal
    let mut terminal = ratatui::init();

    // Main loop
    let result = run_app(&mut terminal, &mut app, &client, &tx, &mut rx).await;

    // Restore terminal
    ratatui::restore();

    if let Err(e) = result {
        tracing::error!(error = %e, "event loop failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}

/// Run a fetch on the runtime; the outcome comes back over `tx`.
fn dispatch(client: &Arc<CatalogClient>, tx: &UnboundedSender<FetchOutcome>, request: FetchRequest) {
    let client = Arc::clone(client);
    let tx = tx.clone();
    tokio::spawn(async move {
        let outcome = match request {
            FetchRequest::Shows => FetchOutcome::Shows(client.get_shows().await),
            FetchRequest::Episodes {
                token,
                show_id,
                show_name,
            } => FetchOutcome::Episodes {
                token,
                show_id,
                show_name,
                result: client.get_episodes(show_id).await,
            },
        };
        // The receiver only goes away on shutdown.
        let _ = tx.send(outcome);
    });
}

async fn run_app(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
    client: &Arc<CatalogClient>,
    tx: &UnboundedSender<FetchOutcome>,
    rx: &mut UnboundedReceiver<FetchOutcome>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        while let Ok(outcome) = rx.try_recv() {
            app.apply(outcome);
        }

        terminal.draw(|frame| ui::render(app, frame))?;

        if app.should_quit {
            return Ok(());
        }

        // Poll for events with a 250ms timeout
        if tokio::task::block_in_place(|| event::poll(Duration::from_millis(250)))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(request) = input::handle_key(app, key) {
                    dispatch(client, tx, request);
                }
            }
        }
    }
}
