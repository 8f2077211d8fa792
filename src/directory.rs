use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::business::{BusinessRecord, FetchError};
use crate::debounce::Debouncer;
use crate::filter::{Criteria, compute_categories, compute_visible};
use crate::render::{Listing, Renderer};

/// Where the single collection load stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
  /// Nothing requested yet.
  Idle,
  /// Request in flight: loading indicator shown.
  Loading,
  /// Records are in memory and filtering is live.
  Ready,
  /// The load failed; a static failure message replaces the cards.
  Failed,
}

/// Owns the fetched records and the filter criteria, and pushes the visible
/// subset to its renderer whenever either changes.
///
/// Search input is debounced; category changes commit immediately. Those are
/// the only two ways the criteria change after construction.
pub struct Directory<R: Renderer> {
  records: Vec<BusinessRecord>,
  categories: Vec<String>,
  criteria: Criteria,
  search: Debouncer<String>,
  debounce: Duration,
  status: LoadStatus,
  visible_count: usize,
  renderer: R,
}

impl<R: Renderer> Directory<R> {
  pub fn new(renderer: R, debounce: Duration) -> Self {
    Self {
      records: Vec::new(),
      categories: Vec::new(),
      criteria: Criteria::default(),
      search: Debouncer::new(),
      debounce,
      status: LoadStatus::Idle,
      visible_count: 0,
      renderer,
    }
  }

  /// Seed the criteria before the first load (e.g. from command-line flags).
  pub fn with_criteria(mut self, criteria: Criteria) -> Self {
    self.criteria = Criteria { search_term: criteria.search_term.trim().to_string(), category: criteria.category };
    self
  }

  pub fn status(&self) -> LoadStatus {
    self.status
  }

  pub fn is_loading(&self) -> bool {
    self.status == LoadStatus::Loading
  }

  pub fn criteria(&self) -> &Criteria {
    &self.criteria
  }

  pub fn categories(&self) -> &[String] {
    &self.categories
  }

  pub fn records(&self) -> &[BusinessRecord] {
    &self.records
  }

  /// Number of records passing the criteria at the last render.
  pub fn visible_count(&self) -> usize {
    self.visible_count
  }

  pub fn renderer(&self) -> &R {
    &self.renderer
  }

  /// Whether a search commit is waiting out the debounce window.
  pub fn search_pending(&self) -> bool {
    self.search.is_pending()
  }

  /// Enter the loading state: prior cards and the "no results" indicator go away.
  pub fn begin_load(&mut self) {
    self.status = LoadStatus::Loading;
    self.records.clear();
    self.visible_count = 0;
    self.renderer.display(Listing::Records(&[]));
  }

  /// Apply the outcome of the collection read.
  pub fn finish_load(&mut self, result: Result<Vec<BusinessRecord>, FetchError>) {
    match result {
      Ok(records) => {
        info!(count = records.len(), "directory: records loaded");
        self.records = records;
        self.categories = compute_categories(&self.records);
        if !self.criteria.category.is_empty() && !self.categories.contains(&self.criteria.category) {
          debug!(category = %self.criteria.category, "directory: selected category not present in records");
        }
        self.status = LoadStatus::Ready;
        self.render();
      }
      Err(e) => self.fail_load(&e),
    }
  }

  /// Enter the failed state. Every failure looks the same to the user.
  pub fn fail_load(&mut self, reason: &dyn std::fmt::Display) {
    warn!(err = %reason, "directory: load failed");
    self.records.clear();
    self.categories.clear();
    self.visible_count = 0;
    self.status = LoadStatus::Failed;
    self.renderer.display(Listing::Records(&[]));
  }

  /// Search box changed: restart the debounce countdown with the raw text.
  pub fn on_search_input(&mut self, raw: &str, now: Instant) {
    self.search.arm(self.debounce, raw.to_string(), now);
  }

  /// Category selector changed: commit and re-render immediately.
  pub fn on_category_change(&mut self, category: &str) {
    debug!(category, "directory: category committed");
    self.criteria.category = category.to_string();
    self.render();
  }

  /// Commit a debounced search term once its window has elapsed.
  /// Returns whether a commit happened.
  pub fn tick(&mut self, now: Instant) -> bool {
    let Some(raw) = self.search.poll(now) else { return false };
    self.commit_search(&raw);
    true
  }

  /// Skip the rest of the debounce window and commit `raw` right away.
  pub fn commit_search_now(&mut self, raw: &str) {
    self.search.cancel();
    self.commit_search(raw);
  }

  fn commit_search(&mut self, raw: &str) {
    let term = raw.trim();
    debug!(term, "directory: search committed");
    self.criteria.search_term = term.to_string();
    self.render();
  }

  /// Push the visible subset to the renderer. No-op until records are loaded.
  fn render(&mut self) {
    if self.status != LoadStatus::Ready {
      return;
    }
    let visible = compute_visible(&self.records, &self.criteria.search_term, &self.criteria.category);
    self.visible_count = visible.len();
    self.renderer.display(Listing::from_visible(&visible));
  }
}
