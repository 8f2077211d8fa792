use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// A single business entry as returned by the `businesses` collection.
///
/// Every field is optional. Missing keys, `null`, and values of an unexpected
/// JSON type all deserialize to `None` so that one odd row never fails a load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BusinessRecord {
  #[serde(default, deserialize_with = "lenient_string")]
  pub name: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub description: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub address: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub phone: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub category: Option<String>,
}

impl BusinessRecord {
  /// The category, if present and non-empty.
  pub fn category(&self) -> Option<&str> {
    non_empty(&self.category)
  }
}

/// Borrow an optional field, treating the empty string as absent.
pub fn non_empty(field: &Option<String>) -> Option<&str> {
  field.as_deref().filter(|s| !s.is_empty())
}

/// Accept strings as-is and numbers as their decimal text (phone columns are
/// sometimes numeric). Anything else becomes `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<serde_json::Value>::deserialize(deserializer)?;
  Ok(match value {
    Some(serde_json::Value::String(s)) => Some(s),
    Some(serde_json::Value::Number(n)) => Some(n.to_string()),
    _ => None,
  })
}

/// Failure modes of the single collection read.
#[derive(Debug, Error)]
pub enum FetchError {
  /// The request could not be sent or the body could not be read.
  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),

  /// A response arrived with a non-2xx status.
  #[error("HTTP error! status: {status}")]
  Http { status: u16 },

  /// The body was not a JSON array of objects.
  #[error("malformed response body: {0}")]
  Decode(#[from] serde_json::Error),
}

/// Where the records live and the public key used to read them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
  base_url: String,
  api_key: String,
  table: String,
}

impl Endpoint {
  pub fn new(base_url: &str, api_key: &str, table: &str) -> Self {
    Self {
      base_url: base_url.trim_end_matches('/').to_string(),
      api_key: api_key.to_string(),
      table: table.to_string(),
    }
  }

  /// `{base_url}/rest/v1/{table}`
  pub fn collection_url(&self) -> String {
    format!("{}/rest/v1/{}", self.base_url, self.table)
  }

  pub fn api_key(&self) -> &str {
    &self.api_key
  }
}

/// Parse a response body into records, preserving the order received.
pub fn parse_records(body: &[u8]) -> Result<Vec<BusinessRecord>, FetchError> {
  Ok(serde_json::from_slice(body)?)
}

/// Read the whole collection once. No retry, no pagination.
pub async fn fetch_businesses(client: &Client, endpoint: &Endpoint) -> Result<Vec<BusinessRecord>, FetchError> {
  let response = client
    .get(endpoint.collection_url())
    .header(CONTENT_TYPE, "application/json")
    .header("apikey", endpoint.api_key())
    .header(ACCEPT, "application/json")
    .send()
    .await?;

  let status = response.status();
  if !status.is_success() {
    return Err(FetchError::Http { status: status.as_u16() });
  }

  let body = response.bytes().await?;
  parse_records(&body)
}

#[cfg(test)]
impl BusinessRecord {
  pub(crate) fn sample(name: &str, description: Option<&str>, category: Option<&str>) -> Self {
    Self {
      name: Some(name.to_string()),
      description: description.map(str::to_string),
      category: category.map(str::to_string),
      ..Self::default()
    }
  }
}
