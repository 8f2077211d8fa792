//! Application constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!` so it's always available,
//! no runtime file I/O. Parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;

/// All tuneable application constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  // Data API
  pub supabase_url: String,
  pub supabase_anon_key: String,
  pub businesses_table: String,

  // Input
  pub search_debounce_ms: u64,

  // Card placeholders for absent or empty fields
  pub name_placeholder: String,
  pub description_placeholder: String,
  pub address_placeholder: String,
  pub phone_placeholder: String,

  // Fixed UI copy
  pub all_categories_label: String,
  pub no_results_message: String,
  pub failure_message: String,
}

impl Constants {
  pub fn search_debounce(&self) -> Duration {
    Duration::from_millis(self.search_debounce_ms)
  }
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; if it's malformed this is a build-time error.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed application constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}
