use ratatui::style::Color;

pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub accent: Color,
  pub muted: Color,
  pub border: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub status: Color,
  pub error: Color,
  pub key_fg: Color,
  pub key_bg: Color,
}

pub static THEMES: [Theme; 3] = [
  Theme {
    name: "Ledger",
    bg: Color::Rgb(24, 26, 31),
    fg: Color::Rgb(220, 223, 228),
    accent: Color::Rgb(229, 192, 123),
    muted: Color::Rgb(127, 132, 142),
    border: Color::Rgb(62, 68, 81),
    highlight_fg: Color::Rgb(24, 26, 31),
    highlight_bg: Color::Rgb(229, 192, 123),
    stripe_bg: Color::Rgb(30, 33, 39),
    status: Color::Rgb(97, 175, 239),
    error: Color::Rgb(224, 108, 117),
    key_fg: Color::Rgb(24, 26, 31),
    key_bg: Color::Rgb(127, 132, 142),
  },
  Theme {
    name: "Paper",
    bg: Color::Rgb(250, 248, 242),
    fg: Color::Rgb(52, 52, 52),
    accent: Color::Rgb(38, 110, 160),
    muted: Color::Rgb(138, 134, 124),
    border: Color::Rgb(206, 200, 186),
    highlight_fg: Color::Rgb(250, 248, 242),
    highlight_bg: Color::Rgb(38, 110, 160),
    stripe_bg: Color::Rgb(242, 239, 230),
    status: Color::Rgb(80, 130, 60),
    error: Color::Rgb(190, 60, 50),
    key_fg: Color::Rgb(250, 248, 242),
    key_bg: Color::Rgb(138, 134, 124),
  },
  Theme {
    name: "Terminal",
    bg: Color::Reset,
    fg: Color::White,
    accent: Color::Cyan,
    muted: Color::DarkGray,
    border: Color::Gray,
    highlight_fg: Color::Black,
    highlight_bg: Color::Cyan,
    stripe_bg: Color::Reset,
    status: Color::Green,
    error: Color::Red,
    key_fg: Color::Black,
    key_bg: Color::Gray,
  },
];

/// Index of the theme called `name`, or the first theme.
pub fn theme_index(name: Option<&str>) -> usize {
  name.and_then(|name| THEMES.iter().position(|t| t.name == name)).unwrap_or(0)
}
