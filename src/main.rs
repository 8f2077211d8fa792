mod app;
mod business;
mod config;
mod constants;
mod debounce;
mod directory;
mod filter;
mod input;
mod render;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use directories::ProjectDirs;
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
};
use reqwest::Client;
use std::io::Write;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use app::App;
use business::{Endpoint, fetch_businesses};
use config::Config;
use constants::constants;
use directory::Directory;
use filter::Criteria;
use render::PlainRenderer;

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Args {
  /// Data API base URL (default: the embedded Supabase project)
  #[arg(long, value_name = "URL")]
  base_url: Option<String>,

  /// Public key sent in the `apikey` header
  #[arg(long, value_name = "KEY")]
  api_key: Option<String>,

  /// Initial search text, matched against name and description
  #[arg(short, long, default_value = "")]
  search: String,

  /// Initial category (exact match)
  #[arg(short, long, default_value = "")]
  category: String,

  /// Fetch once, print the matching businesses and exit
  #[arg(short, long)]
  print: bool,

  /// Print shell completions and exit
  #[arg(long, value_name = "SHELL")]
  completions: Option<clap_complete::Shell>,
}

// --- Logging ---

/// Log to a daily file under the platform data dir; stdout belongs to the TUI.
/// The returned guard flushes the writer on drop.
fn init_logging() -> Option<WorkerGuard> {
  let proj_dirs = ProjectDirs::from("", "", "bizdir")?;
  let log_dir = proj_dirs.data_local_dir().join("logs");
  std::fs::create_dir_all(&log_dir).ok()?;

  let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(log_dir, "bizdir.log"));
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(writer)
    .with_ansi(false)
    .try_init()
    .ok()?;
  Some(guard)
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(shell) = args.completions {
    clap_complete::generate(shell, &mut Args::command(), "bizdir", &mut std::io::stdout());
    return Ok(());
  }

  let _log_guard = init_logging();

  let config = Config::load();
  let endpoint = config.endpoint(args.base_url.as_deref(), args.api_key.as_deref());
  let criteria = Criteria::new(args.search, args.category);
  info!(url = %endpoint.collection_url(), print = args.print, "starting");

  if args.print {
    return print_listing(&endpoint, criteria).await;
  }

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  let mut terminal = ratatui::init();
  let result = run(&mut terminal, App::new(config, endpoint, criteria));
  ratatui::restore();
  result
}

fn run(terminal: &mut DefaultTerminal, mut app: App) -> Result<()> {
  app.trigger_load();

  loop {
    app.check_pending();
    app.tick(Instant::now());
    app.expire_error();

    terminal.draw(|frame| ui::ui(frame, &mut app)).context("Failed to draw frame")?;

    if event::poll(Duration::from_millis(50)).context("Failed to poll terminal events")?
      && let Event::Key(key) = event::read().context("Failed to read terminal event")?
      && key.kind == KeyEventKind::Press
    {
      input::handle_key_event(&mut app, key, Instant::now());
    }

    if app.should_quit {
      break;
    }
  }

  info!("exiting");
  Ok(())
}

/// Non-interactive mode: one load, one render, straight to stdout.
async fn print_listing(endpoint: &Endpoint, criteria: Criteria) -> Result<()> {
  let mut directory = Directory::new(PlainRenderer::default(), Duration::ZERO).with_criteria(criteria);
  directory.begin_load();

  let records = fetch_businesses(&Client::new(), endpoint)
    .await
    .inspect_err(|e| warn!(err = %e, "print: load failed"))
    .with_context(|| constants().failure_message.clone())?;
  directory.finish_load(Ok(records));

  let mut stdout = std::io::stdout().lock();
  stdout.write_all(directory.renderer().output().as_bytes()).context("Failed to write listing")?;
  stdout.flush().context("Failed to flush stdout")?;
  Ok(())
}
