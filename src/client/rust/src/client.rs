/* src/client/rust/src/client.rs */

use std::sync::Arc;

use reqwest::header::{ACCEPT, CACHE_CONTROL, HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Response, Url};
use serde_json::{Map, Value};

use crate::csrf::{CsrfMeta, CsrfSource, csrf_pair};
use crate::error::ClientError;
use crate::state::{ErrorState, ResponseSnapshot};

const MAX_REDIRECTS: usize = 10;

/// Invokes sub-actions of the page at `location`.
pub struct PageClient {
  http: reqwest::Client,
  location: Url,
  csrf: Arc<dyn CsrfSource>,
  errors: ErrorState,
}

impl PageClient {
  /// Credentialed client (cookie store) that only follows same-origin redirects.
  pub fn new(location: Url) -> Result<Self, ClientError> {
    let origin = location.origin();
    let policy = Policy::custom(move |attempt| {
      if attempt.previous().len() >= MAX_REDIRECTS {
        attempt.error("too many redirects")
      } else if attempt.url().origin() == origin {
        attempt.follow()
      } else {
        attempt.stop()
      }
    });

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    let http = reqwest::Client::builder()
      .cookie_store(true)
      .redirect(policy)
      .default_headers(headers)
      .build()?;

    Ok(Self { http, location, csrf: Arc::new(CsrfMeta::default()), errors: ErrorState::global() })
  }

  pub fn parse(location: &str) -> Result<Self, ClientError> {
    let url = Url::parse(location).map_err(|_| ClientError::InvalidUrl { url: location.into() })?;
    Self::new(url)
  }

  pub fn with_csrf(mut self, source: impl CsrfSource + 'static) -> Self {
    self.csrf = Arc::new(source);
    self
  }

  /// Report failures to `errors` instead of the process-wide slot.
  pub fn with_error_state(mut self, errors: ErrorState) -> Self {
    self.errors = errors;
    self
  }

  pub fn location(&self) -> &Url {
    &self.location
  }

  /// Point the client at another page, keeping its cookies.
  pub fn set_location(&mut self, location: Url) {
    self.location = location;
  }

  pub fn errors(&self) -> &ErrorState {
    &self.errors
  }

  /// `<location path>/action/<action>`, with `params` merged over the location's query.
  pub fn action_url(&self, action: &str, params: &[(&str, &str)]) -> Result<Url, ClientError> {
    let mut url = self.location.clone();
    url.set_fragment(None);
    url
      .path_segments_mut()
      .map_err(|()| ClientError::InvalidUrl { url: self.location.to_string() })?
      .pop_if_empty()
      .push("action")
      .push(action);

    let query = merge_query(url.query_pairs().into_owned().collect(), params);
    if query.is_empty() {
      url.set_query(None);
    } else {
      url.query_pairs_mut().clear().extend_pairs(&query);
    }
    Ok(url)
  }

  pub async fn get(&self, action: &str, params: &[(&str, &str)]) -> Result<Value, ClientError> {
    let url = self.action_url(action, params)?;
    tracing::debug!(%url, "page action GET");
    let response = self.http.get(url).send().await?;
    self.handle(response).await
  }

  /// `body` must be a JSON object or `null`; the CSRF token is added when available.
  pub async fn post(&self, action: &str, body: Value) -> Result<Value, ClientError> {
    let mut fields = match body {
      Value::Null => Map::new(),
      Value::Object(fields) => fields,
      _ => return Err(ClientError::Body),
    };
    if let Some((param, token)) = csrf_pair(self.csrf.as_ref()) {
      fields.insert(param, Value::String(token));
    }

    let url = self.action_url(action, &[])?;
    tracing::debug!(%url, "page action POST");
    let response = self.http.post(url).json(&Value::Object(fields)).send().await?;
    self.handle(response).await
  }

  async fn handle(&self, response: Response) -> Result<Value, ClientError> {
    let status = response.status();
    let url = response.url().to_string();
    let bytes = response.bytes().await?;

    if status.is_success() {
      if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
      }
      return Ok(serde_json::from_slice(&bytes)?);
    }

    let status_text = status.canonical_reason().unwrap_or_default().to_string();
    let error_code = self.errors.record(ResponseSnapshot {
      status: status.as_u16(),
      status_text: status_text.clone(),
      url: url.clone(),
      body: String::from_utf8_lossy(&bytes).into_owned(),
    });
    tracing::warn!(%url, status = status.as_u16(), %error_code, "page action failed");
    Err(ClientError::Status { status: status.as_u16(), status_text, error_code })
  }
}

/// Caller params replace the first same-named pair and drop later duplicates;
/// new keys are appended.
fn merge_query(
  mut query: Vec<(String, String)>,
  params: &[(&str, &str)],
) -> Vec<(String, String)> {
  for &(key, value) in params {
    let mut seen = false;
    query.retain_mut(|(k, v)| {
      if k.as_str() != key {
        return true;
      }
      if seen {
        return false;
      }
      seen = true;
      *v = value.to_string();
      true
    });
    if !seen {
      query.push((key.to_string(), value.to_string()));
    }
  }
  query
}
