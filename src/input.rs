use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Instant;

use crate::app::{App, Focus};

// --- Helpers ---

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

// --- Event Handling ---

pub fn handle_key_event(app: &mut App, key: KeyEvent, now: Instant) {
  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
    app.should_quit = true;
    return;
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('t') {
    app.next_theme();
    return;
  }

  match key.code {
    KeyCode::Tab => {
      app.focus = app.focus.next();
      return;
    }
    KeyCode::BackTab => {
      app.focus = app.focus.prev();
      return;
    }
    _ => {}
  }

  match app.focus {
    Focus::Search => handle_search_key(app, key, now),
    Focus::Categories => handle_categories_key(app, key),
    Focus::Cards => handle_cards_key(app, key),
  }
}

fn handle_search_key(app: &mut App, key: KeyEvent, now: Instant) {
  app.clear_error();
  let edited = match key.code {
    KeyCode::Char(c) => {
      let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
      app.input.insert(byte_idx, c);
      app.cursor_position += 1;
      true
    }
    KeyCode::Backspace => {
      if app.cursor_position > 0 {
        app.cursor_position -= 1;
        let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
        app.input.remove(byte_idx);
        true
      } else {
        false
      }
    }
    KeyCode::Delete => {
      if app.cursor_position < app.input.chars().count() {
        let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
        app.input.remove(byte_idx);
        true
      } else {
        false
      }
    }
    KeyCode::Left => {
      app.cursor_position = app.cursor_position.saturating_sub(1);
      false
    }
    KeyCode::Right => {
      if app.cursor_position < app.input.chars().count() {
        app.cursor_position += 1;
      }
      false
    }
    KeyCode::Home => {
      app.cursor_position = 0;
      false
    }
    KeyCode::End => {
      app.cursor_position = app.input.chars().count();
      false
    }
    KeyCode::Esc => {
      if !app.input.is_empty() {
        app.input.clear();
        app.cursor_position = 0;
        app.input_scroll = 0;
        true
      } else {
        app.should_quit = true;
        false
      }
    }
    KeyCode::Enter => {
      app.commit_search_now();
      if app.has_cards() {
        app.focus = Focus::Cards;
      }
      false
    }
    KeyCode::Down => {
      if app.has_cards() {
        app.focus = Focus::Cards;
      }
      false
    }
    _ => false,
  };

  if edited {
    app.on_search_edited(now);
  }
}

fn handle_categories_key(app: &mut App, key: KeyEvent) {
  match key.code {
    KeyCode::Down | KeyCode::Char('j') => app.move_category(1),
    KeyCode::Up | KeyCode::Char('k') => app.move_category(-1),
    KeyCode::Home | KeyCode::Char('g') => app.select_category(0),
    KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
      if app.has_cards() {
        app.focus = Focus::Cards;
      }
    }
    KeyCode::Char('/') | KeyCode::Esc => {
      app.focus = Focus::Search;
    }
    _ => {}
  }
}

fn handle_cards_key(app: &mut App, key: KeyEvent) {
  match key.code {
    KeyCode::Down | KeyCode::Char('j') => app.move_card(1),
    KeyCode::Up | KeyCode::Char('k') => app.move_card(-1),
    KeyCode::Left | KeyCode::Char('h') => {
      app.focus = Focus::Categories;
    }
    KeyCode::Char('/') | KeyCode::Esc => {
      app.focus = Focus::Search;
    }
    _ => {}
  }
}
