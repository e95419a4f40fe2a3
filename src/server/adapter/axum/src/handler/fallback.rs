/* src/server/adapter/axum/src/handler/fallback.rs */

//! Page-id-less mount: the target page and action come from request parameters
//! instead of the matched route.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use quire_server::PageError;
use serde_json::Value;

use super::action::action_request;
use super::page::view_request;
use super::{AppState, parse_body, query_value};
use crate::error::AxumError;
use crate::reply::AxumReply;

/// Query parameters win over body fields.
fn lookup(query: &[(String, String)], body: &Value, key: &str) -> Result<String, PageError> {
  query_value(query, key)
    .or_else(|| body.get(key).and_then(Value::as_str))
    .filter(|value| !value.is_empty())
    .map(str::to_string)
    .ok_or_else(|| {
      PageError::handler("MISSING_PARAMETER", 400, format!("missing '{key}' parameter"))
    })
}

pub(super) async fn handle_view(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
  Query(query): Query<Vec<(String, String)>>,
) -> Result<Response, AxumError> {
  let page_id = lookup(&query, &Value::Null, "page_id")?;
  let request = view_request(&page_id, HashMap::new(), query, &headers);
  let reply = state.dispatcher.view(request).await?;
  Ok(AxumReply(reply).into_response())
}

pub(super) async fn handle_get(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
  Query(query): Query<Vec<(String, String)>>,
) -> Result<Response, AxumError> {
  let page_id = lookup(&query, &Value::Null, "page_id")?;
  let action = lookup(&query, &Value::Null, "action_name")?;
  let request = action_request(&page_id, action, HashMap::new(), query, Value::Null, &headers);
  let reply = state.dispatcher.get_action(request).await?;
  Ok(AxumReply(reply).into_response())
}

pub(super) async fn handle_post(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
  Query(query): Query<Vec<(String, String)>>,
  body: axum::body::Bytes,
) -> Result<Response, AxumError> {
  let body = parse_body(&body)?;
  let page_id = lookup(&query, &body, "page_id")?;
  let action = lookup(&query, &body, "action_name")?;
  let request = action_request(&page_id, action, HashMap::new(), query, body, &headers);
  let reply = state.dispatcher.post_action(request).await?;
  Ok(AxumReply(reply).into_response())
}
