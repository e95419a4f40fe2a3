/* src/server/adapter/axum/src/handler/mod.rs */

mod action;
mod fallback;
mod page;

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::http::HeaderMap;
use axum::routing::get;
use quire_server::{Dispatcher, PageError};

pub(crate) struct AppState {
  pub dispatcher: Dispatcher,
  /// Matched axum route pattern -> page id, for view and action routes alike.
  pub routes: HashMap<String, String>,
}

impl AppState {
  fn page_for(&self, pattern: &str) -> Result<&str, PageError> {
    self
      .routes
      .get(pattern)
      .map(String::as_str)
      .ok_or_else(|| PageError::not_found("Page not found"))
  }
}

pub(crate) fn build_router(
  dispatcher: Dispatcher,
  fallback: Option<String>,
) -> Result<Router, PageError> {
  let pages = dispatcher.registry().lazy_load()?;

  let mut routes = HashMap::new();
  let mut router = Router::new();
  // Mirrors axum's own matcher so conflicting templates are caught before
  // `Router::route` would panic on them.
  let mut mounted = matchit::Router::new();

  for page in pages.iter() {
    if !page.route().starts_with('/') {
      return Err(PageError::internal(format!(
        "page '{}' has invalid route '{}'",
        page.id(),
        page.route()
      )));
    }
    let view_route = convert_route_path(page.route());
    if let Err(conflict) = mounted.insert(view_route.as_str(), ()) {
      tracing::warn!(
        page = %page.id(),
        route = %page.route(),
        %conflict,
        "route cannot be mounted, skipping page"
      );
      continue;
    }
    routes.insert(view_route.clone(), page.id().to_string());
    router = router.route(&view_route, get(page::handle_view));

    // A catch-all segment must stay last, so such pages get no action routes.
    if view_route.contains("{*") {
      tracing::warn!(
        page = %page.id(),
        route = %page.route(),
        "catch-all route, actions not mounted"
      );
    } else {
      let action_route = action_path(&view_route);
      match mounted.insert(action_route.as_str(), ()) {
        Ok(()) => {
          routes.insert(action_route.clone(), page.id().to_string());
          router =
            router.route(&action_route, get(action::handle_get).post(action::handle_post));
        }
        Err(conflict) => tracing::warn!(
          page = %page.id(),
          route = %page.route(),
          %conflict,
          "action route cannot be mounted, actions not mounted"
        ),
      }
    }

    tracing::debug!(
      page = %page.id(),
      name = %route_name(page.id()),
      route = %view_route,
      "mounted page"
    );
  }

  if let Some(mount) = fallback {
    let mount = mount.trim_end_matches('/').to_string();
    let view_path = if mount.is_empty() { "/".to_string() } else { mount.clone() };
    let action_path = format!("{mount}/action");
    for path in [&view_path, &action_path] {
      if let Err(conflict) = mounted.insert(path.as_str(), ()) {
        return Err(PageError::internal(format!(
          "fallback mount '{view_path}' collides with a page route: {conflict}"
        )));
      }
    }
    router = router
      .route(&view_path, get(fallback::handle_view))
      .route(&action_path, get(fallback::handle_get).post(fallback::handle_post));
    tracing::debug!(route = %view_path, "mounted fallback pages");
  }

  tracing::info!(count = pages.len(), "page routes ready");
  let state = Arc::new(AppState { dispatcher, routes });
  Ok(router.with_state(state))
}

/// `:name` segments become `{name}`, `*name` segments become `{*name}`.
pub(crate) fn convert_route_path(route: &str) -> String {
  let converted: Vec<String> = route
    .split('/')
    .map(|segment| {
      if let Some(name) = segment.strip_prefix(':') {
        format!("{{{name}}}")
      } else if let Some(name) = segment.strip_prefix('*') {
        let name = if name.is_empty() { "path" } else { name };
        format!("{{*{name}}}")
      } else {
        segment.to_string()
      }
    })
    .collect();
  let path = converted.join("/");
  if path.is_empty() { "/".to_string() } else { path }
}

/// The sub-action route under a page route; the root page yields `/action/{action_name}`.
pub(crate) fn action_path(view_route: &str) -> String {
  format!("{}/action/{{action_name}}", view_route.trim_end_matches('/'))
}

/// Named route for a page id: `blog/comments` -> `blog_comments_page`.
pub(crate) fn route_name(page_id: &str) -> String {
  format!("{}_page", page_id.replace('/', "_"))
}

/// Header names arrive lower-cased from `http`; non-UTF-8 values are dropped.
pub(super) fn collect_headers(headers: &HeaderMap) -> HashMap<String, String> {
  headers
    .iter()
    .filter_map(|(name, value)| {
      let value = value.to_str().ok()?;
      Some((name.as_str().to_string(), value.to_string()))
    })
    .collect()
}

pub(super) fn query_value<'a>(query: &'a [(String, String)], key: &str) -> Option<&'a str> {
  query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

/// Empty bodies are `null`; anything else must be valid JSON.
pub(super) fn parse_body(body: &[u8]) -> Result<serde_json::Value, PageError> {
  if body.iter().all(u8::is_ascii_whitespace) {
    return Ok(serde_json::Value::Null);
  }
  serde_json::from_slice(body).map_err(|e| PageError::invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn converts_route_segments() {
    assert_eq!(convert_route_path("/"), "/");
    assert_eq!(convert_route_path("/comments/:id"), "/comments/{id}");
    assert_eq!(convert_route_path("/files/*rest"), "/files/{*rest}");
    assert_eq!(convert_route_path("/blog/:slug/edit"), "/blog/{slug}/edit");
  }

  #[test]
  fn action_paths() {
    assert_eq!(action_path("/"), "/action/{action_name}");
    assert_eq!(action_path("/comments/{id}"), "/comments/{id}/action/{action_name}");
    assert_eq!(action_path("/blog/"), "/blog/action/{action_name}");
  }

  #[test]
  fn route_names() {
    assert_eq!(route_name("blog/comments"), "blog_comments_page");
    assert_eq!(route_name("home"), "home_page");
  }

  #[test]
  fn body_parsing() {
    assert_eq!(parse_body(b"").unwrap(), serde_json::Value::Null);
    assert_eq!(parse_body(b"  \n").unwrap(), serde_json::Value::Null);
    assert_eq!(parse_body(br#"{"a":1}"#).unwrap(), serde_json::json!({"a": 1}));
    let err = parse_body(b"{nope").unwrap_err();
    assert_eq!(err.code(), "INVALID_BODY");
    assert_eq!(err.status(), 400);
  }
}
