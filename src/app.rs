use chrono::{DateTime, Local};
use ratatui::widgets::ListState;
use reqwest::Client;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::info;

use crate::business::{BusinessRecord, Endpoint, FetchError, fetch_businesses};
use crate::config::Config;
use crate::constants::constants;
use crate::directory::Directory;
use crate::filter::Criteria;
use crate::render::CardBoard;
use crate::theme::{THEMES, theme_index};

// --- Types ---

pub type LoadResult = Result<Vec<BusinessRecord>, FetchError>;

/// Which pane receives keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
  Search,
  Categories,
  Cards,
}

impl Focus {
  pub fn next(self) -> Self {
    match self {
      Focus::Search => Focus::Categories,
      Focus::Categories => Focus::Cards,
      Focus::Cards => Focus::Search,
    }
  }

  pub fn prev(self) -> Self {
    match self {
      Focus::Search => Focus::Cards,
      Focus::Categories => Focus::Search,
      Focus::Cards => Focus::Categories,
    }
  }
}

/// In-flight async task receivers.
#[derive(Default)]
pub(crate) struct AsyncTasks {
  pub(crate) load_rx: Option<oneshot::Receiver<LoadResult>>,
}

pub struct App {
  /// Raw search box text; committed to the directory after the debounce window.
  pub input: String,
  pub cursor_position: usize,
  pub input_scroll: usize,
  pub focus: Focus,
  pub theme_index: usize,
  pub directory: Directory<CardBoard>,
  /// Highlighted entry of the category selector. Index 0 is "All Categories".
  pub category_state: ListState,
  pub card_state: ListState,
  pub last_error: Option<String>,
  /// Wall-clock time of the last successful load, shown in the status line.
  pub loaded_at: Option<DateTime<Local>>,
  pub should_quit: bool,
  http_client: Client,
  endpoint: Endpoint,
  config: Config,
  pub(crate) tasks: AsyncTasks,
  load_started: Option<Instant>,
  /// When the last error was set, used for auto-dismiss after 5 seconds.
  error_time: Option<Instant>,
}

impl App {
  pub fn new(config: Config, endpoint: Endpoint, criteria: Criteria) -> Self {
    let theme_index = theme_index(config.theme_name.as_deref());
    let input = criteria.search_term.clone();
    let cursor_position = input.chars().count();
    let directory = Directory::new(CardBoard::default(), constants().search_debounce()).with_criteria(criteria);

    Self {
      input,
      cursor_position,
      input_scroll: 0,
      focus: Focus::Search,
      theme_index,
      directory,
      category_state: ListState::default().with_selected(Some(0)),
      card_state: ListState::default(),
      last_error: None,
      loaded_at: None,
      should_quit: false,
      http_client: Client::new(),
      endpoint,
      config,
      tasks: AsyncTasks::default(),
      load_started: None,
      error_time: None,
    }
  }

  pub fn theme(&self) -> &'static crate::theme::Theme {
    // Safety: theme_index is always bounded by modular arithmetic in next_theme()
    // and by theme_index() on initialization.
    &THEMES[self.theme_index]
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    self.config.theme_name = Some(self.theme().name.to_string());
    self.config.save();
  }

  /// Set an error message with auto-dismiss tracking.
  pub fn set_error(&mut self, msg: String) {
    self.last_error = Some(msg);
    self.error_time = Some(Instant::now());
  }

  /// Clear the current error message and its expiry timer.
  pub fn clear_error(&mut self) {
    self.last_error = None;
    self.error_time = None;
  }

  /// Clear stale error messages after 5 seconds.
  pub fn expire_error(&mut self) {
    if let Some(t) = self.error_time
      && t.elapsed() >= Duration::from_secs(5)
    {
      self.last_error = None;
      self.error_time = None;
    }
  }

  /// Start the one collection read. Ignored while a read is already in flight.
  pub fn trigger_load(&mut self) {
    if self.tasks.load_rx.is_some() {
      return;
    }
    info!(url = %self.endpoint.collection_url(), "load triggered");
    self.clear_error();
    self.directory.begin_load();
    self.card_state.select(None);
    self.load_started = Some(Instant::now());

    let client = self.http_client.clone();
    let endpoint = self.endpoint.clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(fetch_businesses(&client, &endpoint).await);
    });
    self.tasks.load_rx = Some(rx);
  }

  pub fn check_pending(&mut self) {
    if let Some(mut rx) = self.tasks.load_rx.take() {
      match rx.try_recv() {
        Ok(result) => self.on_load_finished(result),
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.load_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          self.directory.fail_load(&"load task ended without a result");
          self.set_error("Load task failed.".to_string());
        }
      }
    }
  }

  pub fn on_load_finished(&mut self, result: LoadResult) {
    if let Some(started) = self.load_started.take() {
      info!(elapsed_ms = started.elapsed().as_millis() as u64, ok = result.is_ok(), "load finished");
    }
    if result.is_ok() {
      self.loaded_at = Some(Local::now());
    }
    self.directory.finish_load(result);
    self.sync_category_selection();
    self.reset_card_selection();
  }

  /// The search box text changed: restart the debounce countdown.
  pub fn on_search_edited(&mut self, now: Instant) {
    self.directory.on_search_input(&self.input, now);
  }

  /// Enter in the search box: apply the current text without waiting.
  pub fn commit_search_now(&mut self) {
    self.directory.commit_search_now(&self.input);
    self.reset_card_selection();
  }

  /// Advance time-driven state. Called once per loop iteration.
  pub fn tick(&mut self, now: Instant) {
    if self.directory.tick(now) {
      self.reset_card_selection();
    }
  }

  /// Selector entries: "All Categories" followed by each distinct category.
  pub fn category_options(&self) -> Vec<&str> {
    std::iter::once(constants().all_categories_label.as_str())
      .chain(self.directory.categories().iter().map(String::as_str))
      .collect()
  }

  /// Move the selector highlight by `delta` (wrapping) and commit the new category.
  pub fn move_category(&mut self, delta: isize) {
    let count = self.directory.categories().len() + 1;
    let current = self.category_state.selected().unwrap_or(0) as isize;
    let next = (current + delta).rem_euclid(count as isize) as usize;
    self.select_category(next);
  }

  /// Select selector entry `idx` and commit it immediately.
  pub fn select_category(&mut self, idx: usize) {
    let category = match idx {
      0 => String::new(),
      i => match self.directory.categories().get(i - 1) {
        Some(c) => c.clone(),
        None => return,
      },
    };
    self.category_state.select(Some(idx));
    self.directory.on_category_change(&category);
    self.reset_card_selection();
  }

  /// Move the card highlight by `delta`, wrapping at both ends.
  pub fn move_card(&mut self, delta: isize) {
    let count = self.directory.renderer().cards().len();
    if count == 0 {
      return;
    }
    let current = self.card_state.selected().unwrap_or(0) as isize;
    let next = (current + delta).rem_euclid(count as isize) as usize;
    self.card_state.select(Some(next));
  }

  pub fn has_cards(&self) -> bool {
    !self.directory.renderer().cards().is_empty()
  }

  pub fn is_loading(&self) -> bool {
    self.directory.is_loading()
  }

  /// Point the selector at the committed category. A category that no longer
  /// appears in the records stays committed but leaves nothing highlighted.
  fn sync_category_selection(&mut self) {
    let category = &self.directory.criteria().category;
    let idx = if category.is_empty() {
      Some(0)
    } else {
      self.directory.categories().iter().position(|c| c == category).map(|i| i + 1)
    };
    self.category_state.select(idx);
  }

  fn reset_card_selection(&mut self) {
    self.card_state.select(if self.has_cards() { Some(0) } else { None });
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn test_app() -> App {
    let endpoint = Endpoint::new("http://127.0.0.1:9", "k", "businesses");
    App::new(Config::default(), endpoint, Criteria::default())
  }

  fn records() -> Vec<BusinessRecord> {
    vec![
      BusinessRecord::sample("Acme Cafe", Some("Coffee"), Some("Food")),
      BusinessRecord::sample("Beta Books", None, Some("Retail")),
      BusinessRecord::sample("Corner Bakery", None, Some("Food")),
    ]
  }

  // --- Focus ---

  #[test]
  fn focus_cycles_both_ways() {
    assert_eq!(Focus::Search.next(), Focus::Categories);
    assert_eq!(Focus::Cards.next(), Focus::Search);
    assert_eq!(Focus::Search.prev(), Focus::Cards);
    for f in [Focus::Search, Focus::Categories, Focus::Cards] {
      assert_eq!(f.next().prev(), f);
    }
  }

  // --- Loading ---

  #[test]
  fn load_success_populates_selector_and_cards() {
    let mut app = test_app();
    app.directory.begin_load();
    app.on_load_finished(Ok(records()));
    assert_eq!(app.category_options(), ["All Categories", "Food", "Retail"]);
    assert_eq!(app.category_state.selected(), Some(0));
    assert_eq!(app.card_state.selected(), Some(0));
    assert!(app.loaded_at.is_some());
    assert!(!app.is_loading());
  }

  #[test]
  fn load_failure_leaves_no_cards() {
    let mut app = test_app();
    app.directory.begin_load();
    app.on_load_finished(Err(FetchError::Http { status: 500 }));
    assert!(!app.has_cards());
    assert!(!app.is_loading());
    assert_eq!(app.card_state.selected(), None);
    assert!(app.loaded_at.is_none());
    assert_eq!(app.category_options(), ["All Categories"]);
  }

  #[test]
  fn seeded_category_is_selected_after_load() {
    let endpoint = Endpoint::new("http://127.0.0.1:9", "k", "businesses");
    let mut app = App::new(Config::default(), endpoint, Criteria::new("", "Retail"));
    app.directory.begin_load();
    app.on_load_finished(Ok(records()));
    assert_eq!(app.category_state.selected(), Some(2));
    assert_eq!(app.directory.visible_count(), 1);
  }

  // --- Category selector ---

  #[test]
  fn move_category_commits_and_wraps() {
    let mut app = test_app();
    app.directory.begin_load();
    app.on_load_finished(Ok(records()));

    app.move_category(1);
    assert_eq!(app.directory.criteria().category, "Food");
    assert_eq!(app.directory.visible_count(), 2);

    app.move_category(1);
    assert_eq!(app.directory.criteria().category, "Retail");

    app.move_category(1);
    assert_eq!(app.directory.criteria().category, "");
    assert_eq!(app.directory.visible_count(), 3);

    app.move_category(-1);
    assert_eq!(app.directory.criteria().category, "Retail");
  }

  #[test]
  fn unknown_seeded_category_highlights_nothing() {
    let endpoint = Endpoint::new("http://127.0.0.1:9", "k", "businesses");
    let mut app = App::new(Config::default(), endpoint, Criteria::new("", "Hardware"));
    app.directory.begin_load();
    app.on_load_finished(Ok(records()));
    assert_eq!(app.category_state.selected(), None);
    assert!(!app.has_cards());

    app.move_category(1);
    assert_eq!(app.directory.criteria().category, "Food");
  }

  #[test]
  fn select_out_of_range_category_is_ignored() {
    let mut app = test_app();
    app.directory.begin_load();
    app.on_load_finished(Ok(records()));
    app.select_category(9);
    assert_eq!(app.category_state.selected(), Some(0));
    assert_eq!(app.directory.criteria().category, "");
  }

  // --- Search ---

  #[test]
  fn search_edit_applies_after_debounce() {
    let mut app = test_app();
    app.directory.begin_load();
    app.on_load_finished(Ok(records()));

    let t0 = Instant::now();
    app.input = "bak".to_string();
    app.on_search_edited(t0);
    app.tick(t0 + Duration::from_millis(100));
    assert_eq!(app.directory.visible_count(), 3);

    app.tick(t0 + constants().search_debounce());
    assert_eq!(app.directory.visible_count(), 1);
    assert_eq!(app.card_state.selected(), Some(0));
  }

  // --- Cards ---

  #[test]
  fn move_card_wraps_and_ignores_empty() {
    let mut app = test_app();
    app.move_card(1);
    assert_eq!(app.card_state.selected(), None);

    app.directory.begin_load();
    app.on_load_finished(Ok(records()));
    app.move_card(-1);
    assert_eq!(app.card_state.selected(), Some(2));
    app.move_card(1);
    assert_eq!(app.card_state.selected(), Some(0));
  }

  // --- Errors ---

  #[test]
  fn set_and_clear_error() {
    let mut app = test_app();
    app.set_error("boom".to_string());
    app.expire_error();
    assert_eq!(app.last_error.as_deref(), Some("boom"));
    app.clear_error();
    assert_eq!(app.last_error, None);
  }
}
