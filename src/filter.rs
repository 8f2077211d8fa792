use std::cmp::Ordering;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::business::BusinessRecord;

/// The current (search term, category) pair governing visibility.
/// An empty string means "no constraint" for either half.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
  pub search_term: String,
  pub category: String,
}

impl Criteria {
  pub fn new(search_term: impl Into<String>, category: impl Into<String>) -> Self {
    Self { search_term: search_term.into(), category: category.into() }
  }
}

/// Case-insensitive substring match against name or description.
/// A record without a name can still match on its description.
pub fn matches_search(record: &BusinessRecord, search_term: &str) -> bool {
  if search_term.is_empty() {
    return true;
  }
  let needle = search_term.to_lowercase();
  let contains = |field: &Option<String>| field.as_deref().is_some_and(|s| s.to_lowercase().contains(&needle));
  contains(&record.name) || contains(&record.description)
}

/// Exact, case-sensitive category match.
pub fn matches_category(record: &BusinessRecord, category: &str) -> bool {
  category.is_empty() || record.category.as_deref() == Some(category)
}

/// Records passing both filters, in their original order.
pub fn compute_visible<'a>(
  records: &'a [BusinessRecord],
  search_term: &str,
  category: &str,
) -> Vec<&'a BusinessRecord> {
  records.iter().filter(|r| matches_search(r, search_term) && matches_category(r, category)).collect()
}

/// Distinct non-empty categories, sorted for display.
pub fn compute_categories(records: &[BusinessRecord]) -> Vec<String> {
  let mut categories: Vec<String> = records.iter().filter_map(BusinessRecord::category).map(str::to_string).collect();
  categories.sort_by(|a, b| locale_cmp(a, b));
  categories.dedup();
  categories
}

/// Dictionary order in the style of a Unicode collator: base letters first
/// (accents and case ignored), then accents, then case with lowercase ahead of
/// uppercase. Identical strings are the only ones that compare equal, so
/// `dedup` after sorting merges exact duplicates only.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
  base_letters(a)
    .cmp(&base_letters(b))
    .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
    .then_with(|| a.chars().map(char::is_uppercase).cmp(b.chars().map(char::is_uppercase)))
    .then_with(|| a.cmp(b))
}

/// Lowercased text with combining accents stripped: `Épicerie` -> `epicerie`.
fn base_letters(s: &str) -> String {
  s.nfd().filter(|c| !is_combining_mark(*c)).flat_map(char::to_lowercase).collect()
}
