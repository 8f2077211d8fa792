use crate::business::{BusinessRecord, non_empty};
use crate::constants::constants;

/// Display fragment for one business, with placeholders already substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
  pub name: String,
  pub description: String,
  pub address: String,
  pub phone: String,
  /// Only shown when the record carries a non-empty category.
  pub category: Option<String>,
}

impl Card {
  pub fn from_record(record: &BusinessRecord) -> Self {
    let c = constants();
    let or = |field: &Option<String>, placeholder: &str| non_empty(field).unwrap_or(placeholder).to_string();
    Self {
      name: or(&record.name, &c.name_placeholder),
      description: or(&record.description, &c.description_placeholder),
      address: or(&record.address, &c.address_placeholder),
      phone: or(&record.phone, &c.phone_placeholder),
      category: record.category().map(str::to_string),
    }
  }

  /// Labelled rows below the name, in display order.
  pub fn detail_rows(&self) -> Vec<(&'static str, &str)> {
    let mut rows = vec![
      ("Description", self.description.as_str()),
      ("Address", self.address.as_str()),
      ("Phone", self.phone.as_str()),
    ];
    if let Some(category) = &self.category {
      rows.push(("Category", category.as_str()));
    }
    rows
  }
}

/// What a renderer is asked to show.
#[derive(Debug, Clone, Copy)]
pub enum Listing<'a> {
  /// Show exactly these records. An empty slice clears the output without
  /// raising the "no results" indicator (used while loading).
  Records(&'a [&'a BusinessRecord]),
  /// The visible set is empty: show the "no results" indicator and nothing else.
  Empty,
}

impl<'a> Listing<'a> {
  pub fn from_visible(visible: &'a [&'a BusinessRecord]) -> Self {
    if visible.is_empty() { Listing::Empty } else { Listing::Records(visible) }
  }
}

/// Presentation seam. Each call fully replaces whatever was shown before.
pub trait Renderer {
  fn display(&mut self, listing: Listing<'_>);
}

/// In-memory card model the terminal UI draws from.
#[derive(Debug, Default)]
pub struct CardBoard {
  cards: Vec<Card>,
  no_results: bool,
}

impl CardBoard {
  pub fn cards(&self) -> &[Card] {
    &self.cards
  }

  pub fn shows_no_results(&self) -> bool {
    self.no_results
  }
}

impl Renderer for CardBoard {
  fn display(&mut self, listing: Listing<'_>) {
    match listing {
      Listing::Records(records) => {
        self.cards = records.iter().map(|r| Card::from_record(r)).collect();
        self.no_results = false;
      }
      Listing::Empty => {
        self.cards.clear();
        self.no_results = true;
      }
    }
  }
}

/// Plain-text renderer for `--print` mode.
#[derive(Debug, Default)]
pub struct PlainRenderer {
  output: String,
}

impl PlainRenderer {
  pub fn output(&self) -> &str {
    &self.output
  }
}

impl Renderer for PlainRenderer {
  fn display(&mut self, listing: Listing<'_>) {
    self.output.clear();
    let records = match listing {
      Listing::Records(records) => records,
      Listing::Empty => {
        self.output.push_str(&constants().no_results_message);
        self.output.push('\n');
        return;
      }
    };
    for (i, record) in records.iter().enumerate() {
      if i > 0 {
        self.output.push('\n');
      }
      let card = Card::from_record(record);
      self.output.push_str(&card.name);
      self.output.push('\n');
      for (label, value) in card.detail_rows() {
        self.output.push_str(&format!("  {label}: {value}\n"));
      }
    }
  }
}
