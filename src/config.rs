use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::business::Endpoint;
use crate::constants::constants;

/// User preferences persisted as `prefs.toml` in the platform config dir.
#[derive(Serialize, Deserialize, Default, Debug, PartialEq)]
pub struct Config {
  pub theme_name: Option<String>,
  /// Overrides the embedded data API base URL.
  pub base_url: Option<String>,
  /// Overrides the embedded public API key.
  pub api_key: Option<String>,
}

impl Config {
  pub fn load() -> Self {
    if let Some(path) = Self::path()
      && let Ok(content) = std::fs::read_to_string(path)
    {
      return Self::parse(&content);
    }
    Self::default()
  }

  /// Parse a prefs file, falling back to defaults when it is malformed.
  pub fn parse(content: &str) -> Self {
    toml::from_str(content).unwrap_or_default()
  }

  pub fn save(&self) {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "bizdir") {
      let config_dir = proj_dirs.config_dir();
      if std::fs::create_dir_all(config_dir).is_ok() {
        let config_file = config_dir.join("prefs.toml");
        if let Ok(content) = toml::to_string(self) {
          let _ = std::fs::write(config_file, content);
        }
      }
    }
  }

  fn path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "bizdir").map(|dirs| dirs.config_dir().join("prefs.toml"))
  }

  /// Resolve the data API endpoint: CLI flag, then prefs file, then embedded constants.
  pub fn endpoint(&self, base_url: Option<&str>, api_key: Option<&str>) -> Endpoint {
    let c = constants();
    let base_url = base_url.or(self.base_url.as_deref()).unwrap_or(&c.supabase_url);
    let api_key = api_key.or(self.api_key.as_deref()).unwrap_or(&c.supabase_anon_key);
    Endpoint::new(base_url, api_key, &c.businesses_table)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_full_prefs() {
    let config = Config::parse("theme_name = \"Paper\"\nbase_url = \"http://localhost:54321\"\napi_key = \"k\"\n");
    assert_eq!(config.theme_name.as_deref(), Some("Paper"));
    assert_eq!(config.base_url.as_deref(), Some("http://localhost:54321"));
    assert_eq!(config.api_key.as_deref(), Some("k"));
  }

  #[test]
  fn parse_malformed_falls_back_to_default() {
    assert_eq!(Config::parse("theme_name = [not toml"), Config::default());
    assert_eq!(Config::parse(""), Config::default());
  }

  #[test]
  fn endpoint_defaults_to_embedded_constants() {
    let endpoint = Config::default().endpoint(None, None);
    assert_eq!(endpoint.collection_url(), format!("{}/rest/v1/businesses", constants().supabase_url));
    assert_eq!(endpoint.api_key(), constants().supabase_anon_key);
  }

  #[test]
  fn endpoint_precedence_cli_over_prefs() {
    let config = Config { theme_name: None, base_url: Some("http://prefs".into()), api_key: Some("prefs-key".into()) };

    let from_prefs = config.endpoint(None, None);
    assert_eq!(from_prefs.collection_url(), "http://prefs/rest/v1/businesses");
    assert_eq!(from_prefs.api_key(), "prefs-key");

    let from_cli = config.endpoint(Some("http://cli"), Some("cli-key"));
    assert_eq!(from_cli.collection_url(), "http://cli/rest/v1/businesses");
    assert_eq!(from_cli.api_key(), "cli-key");
  }
}
