use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, BorderType, List, ListItem, Padding, Paragraph, Wrap},
};

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::{App, Focus};
use crate::constants::constants;
use crate::directory::LoadStatus;
use crate::input::char_to_byte_index;
use crate::render::Card;
use crate::theme::Theme;

/// Width of the category selector column.
const CATEGORY_PANE_WIDTH: u16 = 26;

// --- Helpers ---

/// Terminal columns taken by the first `n` chars of `s`.
pub fn display_width(s: &str, n: usize) -> usize {
  s[..char_to_byte_index(s, n)].width()
}

/// Cut `s` down to `max_width` chars, marking the cut with "…".
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().nth(max_width).is_none() {
    return s.to_string();
  }
  format!("{}…", &s[..char_to_byte_index(s, max_width.saturating_sub(1))])
}

/// Left edge of a `width`-column window that keeps `cursor_col` in view,
/// moving as little as possible from `scroll`.
fn follow_cursor(scroll: usize, cursor_col: usize, width: usize) -> usize {
  if width == 0 {
    return cursor_col;
  }
  scroll.clamp(cursor_col.saturating_sub(width - 1), cursor_col)
}

/// The chars of `text` that fit entirely inside columns `[scroll, scroll + width)`.
fn visible_slice(text: &str, scroll: usize, width: usize) -> String {
  let end = scroll + width;
  let mut col = 0;
  let mut out = String::new();
  for c in text.chars() {
    let w = c.width().unwrap_or(0);
    if col >= scroll && col + w <= end {
      out.push(c);
    }
    col += w;
    if col >= end {
      break;
    }
  }
  out
}

fn pane_block<'a>(title: &'a str, theme: &Theme, focused: bool) -> Block<'a> {
  let color = if focused { theme.accent } else { theme.border };
  Block::bordered()
    .title(title)
    .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
    .border_type(BorderType::Rounded)
    .border_style(Style::default().fg(color))
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();

  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let [header_area, main_area, status_area, input_area, footer_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Min(3),
    Constraint::Length(1),
    Constraint::Length(3),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  let [categories_area, cards_area] =
    Layout::horizontal([Constraint::Length(CATEGORY_PANE_WIDTH), Constraint::Min(10)]).areas(main_area);

  render_header(frame, theme, header_area);
  render_categories(frame, app, categories_area);
  render_cards(frame, app, cards_area);
  render_status(frame, app, status_area);
  render_input(frame, app, input_area);
  render_footer(frame, app, footer_area);
}

fn render_header(frame: &mut Frame, theme: &Theme, area: Rect) {
  let left = Line::from(Span::styled(" ▦ bizdir ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)));
  frame.render_widget(left, area);

  let version = format!("v{} ", env!("CARGO_PKG_VERSION"));
  let right = Line::from(Span::styled(&version, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(version.len() as u16), width: version.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

fn render_categories(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let inner_w = area.width.saturating_sub(4) as usize;

  let items: Vec<ListItem> = app
    .category_options()
    .into_iter()
    .map(|label| ListItem::new(Line::from(Span::styled(truncate_str(label, inner_w), Style::default().fg(theme.fg)))))
    .collect();

  let list = List::new(items)
    .block(pane_block(" Categories ", theme, app.focus == Focus::Categories))
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));

  frame.render_stateful_widget(list, area, &mut app.category_state);
}

fn render_cards(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let focused = app.focus == Focus::Cards;

  let message = match app.directory.status() {
    LoadStatus::Idle | LoadStatus::Loading => Some(("Loading businesses…", theme.status)),
    LoadStatus::Failed => Some((constants().failure_message.as_str(), theme.error)),
    LoadStatus::Ready if app.directory.renderer().shows_no_results() => {
      Some((constants().no_results_message.as_str(), theme.muted))
    }
    LoadStatus::Ready => None,
  };

  if let Some((text, color)) = message {
    let paragraph = Paragraph::new(vec![Line::from(""), Line::from(Span::styled(text, Style::default().fg(color)))])
      .alignment(Alignment::Center)
      .wrap(Wrap { trim: true })
      .block(pane_block(" Businesses ", theme, focused));
    frame.render_widget(paragraph, area);
    return;
  }

  // Inner width: area minus 2 borders minus 2 chars for highlight symbol ("▶ ")
  let inner_w = area.width.saturating_sub(4) as usize;
  let selected = app.card_state.selected();

  let items: Vec<ListItem> = app
    .directory
    .renderer()
    .cards()
    .iter()
    .enumerate()
    .map(|(i, card)| {
      let bg = if Some(i) == selected {
        theme.highlight_bg
      } else if i % 2 == 1 {
        theme.stripe_bg
      } else {
        theme.bg
      };
      ListItem::new(card_lines(card, theme, inner_w)).bg(bg)
    })
    .collect();

  let title = format!(" Businesses · {} of {} ", app.directory.visible_count(), app.directory.records().len());
  let list = List::new(items)
    .block(pane_block(&title, theme, focused))
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg));

  frame.render_stateful_widget(list, area, &mut app.card_state);
}

/// One card: bold name, then a labelled row per field, then a spacer line.
fn card_lines<'a>(card: &'a Card, theme: &Theme, inner_w: usize) -> Vec<Line<'a>> {
  let mut lines = vec![Line::from(Span::styled(
    truncate_str(&card.name, inner_w),
    Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
  ))];
  for (label, value) in card.detail_rows() {
    let label = format!("  {:<12}", label);
    let value_w = inner_w.saturating_sub(label.chars().count());
    lines.push(Line::from(vec![
      Span::styled(label, Style::default().fg(theme.muted)),
      Span::styled(truncate_str(value, value_w), Style::default().fg(theme.fg)),
    ]));
  }
  lines.push(Line::from(""));
  lines
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (text, style) = if let Some(err) = &app.last_error {
    (format!(" ⚠  {}", err), Style::default().fg(theme.error))
  } else if app.is_loading() {
    (" ⏳ Loading businesses…".to_string(), Style::default().fg(theme.status))
  } else if app.directory.search_pending() {
    (" … Searching".to_string(), Style::default().fg(theme.status))
  } else if let Some(loaded_at) = app.loaded_at {
    let criteria = app.directory.criteria();
    let mut parts = vec![format!("{} of {} businesses", app.directory.visible_count(), app.directory.records().len())];
    if !criteria.search_term.is_empty() {
      parts.push(format!("search \"{}\"", criteria.search_term));
    }
    if !criteria.category.is_empty() {
      parts.push(format!("in {}", criteria.category));
    }
    parts.push(format!("loaded {}", loaded_at.format("%H:%M")));
    (format!(" {}", parts.join(" · ")), Style::default().fg(theme.muted))
  } else {
    (" Ready".to_string(), Style::default().fg(theme.muted))
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_input(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let input_block =
    pane_block(" Search businesses ", theme, app.focus == Focus::Search).padding(Padding::horizontal(1));

  let inner_w = area.width.saturating_sub(4) as usize;
  let cursor_col = display_width(&app.input, app.cursor_position);
  app.input_scroll = follow_cursor(app.input_scroll, cursor_col, inner_w);

  let paragraph = Paragraph::new(visible_slice(&app.input, app.input_scroll, inner_w))
    .style(Style::default().fg(theme.fg))
    .block(input_block);
  frame.render_widget(paragraph, area);

  // No cursor when the box has no interior.
  if app.focus == Focus::Search && inner_w > 0 && area.height > 2 {
    let offset = cursor_col.saturating_sub(app.input_scroll) as u16;
    frame.set_cursor_position((area.x + 2 + offset, area.y + 1));
  }
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let keys: Vec<(&str, &str)> = match app.focus {
    Focus::Search => {
      let mut k = vec![("Tab", "Categories"), ("Enter", "Apply")];
      if app.has_cards() {
        k.push(("↓", "Browse"));
      }
      k.push(("^t", "Theme"));
      if app.input.is_empty() {
        k.push(("Esc", "Quit"));
      } else {
        k.push(("Esc", "Clear"));
      }
      k
    }
    Focus::Categories => vec![("j/k", "Filter"), ("g", "All"), ("Enter", "Browse"), ("/", "Search"), ("^t", "Theme")],
    Focus::Cards => vec![("j/k", "Navigate"), ("h", "Categories"), ("/", "Search"), ("^t", "Theme")],
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw("  "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} ", theme.name);
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(theme_label.len() as u16), width: theme_label.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::business::{BusinessRecord, Endpoint, FetchError};
  use crate::config::Config;
  use crate::filter::Criteria;
  use ratatui::{Terminal, backend::TestBackend};

  fn app_with(criteria: Criteria) -> App {
    let endpoint = Endpoint::new("http://127.0.0.1:9", "k", "businesses");
    App::new(Config::default(), endpoint, criteria)
  }

  fn loaded_app() -> App {
    let mut app = app_with(Criteria::default());
    app.directory.begin_load();
    app.on_load_finished(Ok(vec![
      BusinessRecord::sample("Acme Cafe", Some("Coffee"), Some("Food")),
      BusinessRecord::sample("Beta Books", None, Some("Retail")),
    ]));
    app
  }

  /// Draw one frame and return the screen as text, one line per row.
  fn draw(app: &mut App, width: u16, height: u16) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(|frame| ui(frame, app)).unwrap();
    let buffer = terminal.backend().buffer();
    (0..buffer.area.height)
      .map(|y| (0..buffer.area.width).map(|x| buffer[(x, y)].symbol()).collect::<String>())
      .collect::<Vec<_>>()
      .join("\n")
  }

  // --- screens ---

  #[test]
  fn loading_screen_shows_loading_message() {
    let mut app = app_with(Criteria::default());
    app.directory.begin_load();
    let screen = draw(&mut app, 100, 30);
    assert!(screen.contains("Loading businesses"));
    assert!(!screen.contains(&constants().failure_message));
    assert!(!screen.contains(&constants().no_results_message));
  }

  #[test]
  fn failed_load_shows_failure_message_and_no_cards() {
    let mut app = app_with(Criteria::default());
    app.directory.begin_load();
    app.on_load_finished(Err(FetchError::Http { status: 500 }));
    let screen = draw(&mut app, 100, 30);
    assert!(screen.contains(&constants().failure_message));
    assert!(!screen.contains("Loading businesses"));
    assert!(!screen.contains(&constants().no_results_message));
    assert!(!screen.contains("Description"));
  }

  #[test]
  fn loaded_screen_shows_cards() {
    let mut app = loaded_app();
    let screen = draw(&mut app, 100, 30);
    assert!(screen.contains("Acme Cafe"));
    assert!(screen.contains("Beta Books"));
    assert!(screen.contains("Description Coffee"));
    assert!(!screen.contains("Loading businesses"));
  }

  #[test]
  fn unmatched_search_shows_no_results_message_only() {
    let mut app = loaded_app();
    app.input = "zzz".to_string();
    app.commit_search_now();
    let screen = draw(&mut app, 100, 30);
    assert!(screen.contains(&constants().no_results_message));
    assert!(!screen.contains("Acme Cafe"));
    assert!(!screen.contains("Description"));
  }

  #[test]
  fn narrow_terminal_draws_without_cursor_overflow() {
    let mut app = app_with(Criteria::new("ab", ""));
    for width in 1..6 {
      draw(&mut app, width, 20);
    }
    assert_eq!(app.input, "ab");
  }

  // --- search box scrolling ---

  #[test]
  fn follow_cursor_scrolls_minimally() {
    assert_eq!(follow_cursor(0, 3, 10), 0);
    assert_eq!(follow_cursor(0, 12, 10), 3);
    assert_eq!(follow_cursor(5, 2, 10), 2);
    assert_eq!(follow_cursor(3, 12, 10), 3);
    assert_eq!(follow_cursor(0, 4, 0), 4);
  }

  #[test]
  fn visible_slice_keeps_whole_chars() {
    assert_eq!(visible_slice("hello world", 6, 5), "world");
    assert_eq!(visible_slice("hello", 0, 0), "");
    // 日 spans columns 1..3, so a window starting at 2 drops it.
    assert_eq!(visible_slice("a日b", 2, 5), "b");
    assert_eq!(visible_slice("a日b", 0, 2), "a");
  }

  #[test]
  fn truncate_short_string_untouched() {
    assert_eq!(truncate_str("Acme", 10), "Acme");
    assert_eq!(truncate_str("Acme", 4), "Acme");
  }

  #[test]
  fn truncate_long_string_gets_ellipsis() {
    assert_eq!(truncate_str("Acme Cafe", 5), "Acme…");
    assert_eq!(truncate_str("日本語のカフェ", 3), "日本…");
  }

  #[test]
  fn display_width_counts_wide_chars() {
    assert_eq!(display_width("abc", 2), 2);
    assert_eq!(display_width("日本", 2), 4);
    assert_eq!(display_width("a日", 5), 3);
  }

  #[test]
  fn card_lines_show_category_only_when_present() {
    let theme = &crate::theme::THEMES[0];
    let with = Card {
      name: "Acme Cafe".into(),
      description: "Coffee".into(),
      address: "1 Main St".into(),
      phone: "555-0100".into(),
      category: Some("Food".into()),
    };
    assert_eq!(card_lines(&with, theme, 60).len(), 6);

    let without = Card { category: None, ..with.clone() };
    let lines = card_lines(&without, theme, 60);
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0].to_string(), "Acme Cafe");
    assert_eq!(lines[1].to_string(), "  Description Coffee");
  }
}
