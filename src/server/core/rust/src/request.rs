/* src/server/core/rust/src/request.rs */

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value};

/// Negotiated response format for the view entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
  #[default]
  Html,
  Json,
}

impl Format {
  /// An explicit `format` parameter wins; otherwise JSON is chosen only when
  /// the Accept header lists `application/json` ahead of `text/html`.
  pub fn negotiate(accept: Option<&str>, format_param: Option<&str>) -> Self {
    match format_param.map(str::trim) {
      Some(f) if f.eq_ignore_ascii_case("json") => return Self::Json,
      Some(f) if f.eq_ignore_ascii_case("html") => return Self::Html,
      _ => {}
    }
    let Some(accept) = accept else {
      return Self::Html;
    };
    for media in accept.split(',') {
      let media = media.split(';').next().unwrap_or("").trim();
      match media {
        "application/json" => return Self::Json,
        "text/html" | "application/xhtml+xml" => return Self::Html,
        _ => {}
      }
    }
    Self::Html
  }
}

/// Transport-independent view of one inbound request.
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
  pub page_id: String,
  pub action_name: Option<String>,
  pub path_params: HashMap<String, String>,
  pub query: Vec<(String, String)>,
  pub body: Value,
  pub format: Format,
  /// Header names are lower-cased.
  pub headers: HashMap<String, String>,
}

impl PageRequest {
  pub fn new(page_id: impl Into<String>) -> Self {
    Self { page_id: page_id.into(), ..Self::default() }
  }

  pub fn action(mut self, name: impl Into<String>) -> Self {
    self.action_name = Some(name.into());
    self
  }

  pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.query.push((key.into(), value.into()));
    self
  }

  pub fn path_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.path_params.insert(key.into(), value.into());
    self
  }

  pub fn body(mut self, body: Value) -> Self {
    self.body = body;
    self
  }

  pub fn format(mut self, format: Format) -> Self {
    self.format = format;
    self
  }

  pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
    self.headers.insert(name.to_ascii_lowercase(), value.into());
    self
  }

  pub fn header_value(&self, name: &str) -> Option<&str> {
    self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
  }

  /// Merged parameters: query, then JSON body fields, then path params.
  /// Later sources override earlier ones.
  pub fn params(&self) -> Map<String, Value> {
    let mut params = Map::new();
    for (key, value) in &self.query {
      params.insert(key.clone(), Value::String(value.clone()));
    }
    if let Value::Object(body) = &self.body {
      for (key, value) in body {
        params.insert(key.clone(), value.clone());
      }
    }
    for (key, value) in &self.path_params {
      params.insert(key.clone(), Value::String(value.clone()));
    }
    params
  }
}

struct ScopeInner {
  request: PageRequest,
  params: Map<String, Value>,
  locals: Mutex<Map<String, Value>>,
}

/// Handle passed to every hook of one request. Clones share the same
/// request and local store; nothing here is shared across requests.
#[derive(Clone)]
pub struct RequestScope {
  inner: Arc<ScopeInner>,
}

impl RequestScope {
  pub fn new(request: PageRequest) -> Self {
    let params = request.params();
    Self { inner: Arc::new(ScopeInner { request, params, locals: Mutex::new(Map::new()) }) }
  }

  pub fn request(&self) -> &PageRequest {
    &self.inner.request
  }

  pub fn params(&self) -> &Map<String, Value> {
    &self.inner.params
  }

  pub fn param(&self, name: &str) -> Option<&Value> {
    self.inner.params.get(name)
  }

  pub fn param_str(&self, name: &str) -> Option<&str> {
    self.param(name).and_then(Value::as_str)
  }

  /// Store a request-scoped value, typically from a `before` hook.
  pub fn set_local(&self, key: impl Into<String>, value: Value) {
    self.inner.locals.lock().insert(key.into(), value);
  }

  pub fn local(&self, key: &str) -> Option<Value> {
    self.inner.locals.lock().get(key).cloned()
  }
}

impl std::fmt::Debug for RequestScope {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("RequestScope").field("page_id", &self.inner.request.page_id).finish()
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn negotiate_defaults_to_html() {
    assert_eq!(Format::negotiate(None, None), Format::Html);
    assert_eq!(Format::negotiate(Some("*/*"), None), Format::Html);
    assert_eq!(
      Format::negotiate(Some("text/html,application/xhtml+xml,application/json;q=0.9"), None),
      Format::Html
    );
  }

  #[test]
  fn negotiate_json() {
    assert_eq!(Format::negotiate(Some("application/json"), None), Format::Json);
    assert_eq!(Format::negotiate(Some("application/json, text/html"), None), Format::Json);
    assert_eq!(Format::negotiate(Some("text/html"), Some("json")), Format::Json);
    assert_eq!(Format::negotiate(Some("application/json"), Some("HTML")), Format::Html);
  }

  #[test]
  fn params_precedence() {
    let request = PageRequest::new("comments")
      .query_param("id", "from-query")
      .query_param("page", "2")
      .body(json!({ "id": "from-body", "content": "hi" }))
      .path_param("id", "from-path");
    let params = request.params();
    assert_eq!(params["id"], "from-path");
    assert_eq!(params["page"], "2");
    assert_eq!(params["content"], "hi");
  }

  #[test]
  fn headers_are_case_insensitive() {
    let request = PageRequest::new("p").header("X-Forwarded-User", "ada");
    assert_eq!(request.header_value("x-forwarded-user"), Some("ada"));
    assert_eq!(request.header_value("X-FORWARDED-USER"), Some("ada"));
  }

  #[test]
  fn scope_locals_are_shared_between_clones() {
    let scope = RequestScope::new(PageRequest::new("p").query_param("q", "rust"));
    let other = scope.clone();
    other.set_local("user", json!("ada"));
    assert_eq!(scope.local("user"), Some(json!("ada")));
    assert_eq!(scope.param_str("q"), Some("rust"));
    assert!(scope.local("missing").is_none());
  }
}
