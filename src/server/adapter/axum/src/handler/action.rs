/* src/server/adapter/axum/src/handler/action.rs */

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{MatchedPath, Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use quire_server::PageRequest;
use serde_json::Value;

use super::{AppState, collect_headers, parse_body};
use crate::error::AxumError;
use crate::reply::AxumReply;

/// Build an action request; the action name is not a page path param.
pub(super) fn action_request(
  page_id: &str,
  action_name: String,
  path_params: HashMap<String, String>,
  query: Vec<(String, String)>,
  body: Value,
  headers: &HeaderMap,
) -> PageRequest {
  PageRequest {
    page_id: page_id.to_string(),
    action_name: Some(action_name),
    path_params,
    query,
    body,
    headers: collect_headers(headers),
    ..PageRequest::default()
  }
}

pub(super) async fn handle_get(
  State(state): State<Arc<AppState>>,
  matched: MatchedPath,
  headers: HeaderMap,
  Path(mut params): Path<HashMap<String, String>>,
  Query(query): Query<Vec<(String, String)>>,
) -> Result<Response, AxumError> {
  let page_id = state.page_for(matched.as_str())?;
  let action = params.remove("action_name").unwrap_or_default();
  let request = action_request(page_id, action, params, query, Value::Null, &headers);
  let reply = state.dispatcher.get_action(request).await?;
  Ok(AxumReply(reply).into_response())
}

pub(super) async fn handle_post(
  State(state): State<Arc<AppState>>,
  matched: MatchedPath,
  headers: HeaderMap,
  Path(mut params): Path<HashMap<String, String>>,
  Query(query): Query<Vec<(String, String)>>,
  body: axum::body::Bytes,
) -> Result<Response, AxumError> {
  let page_id = state.page_for(matched.as_str())?;
  let body = parse_body(&body)?;
  let action = params.remove("action_name").unwrap_or_default();
  let request = action_request(page_id, action, params, query, body, &headers);
  let reply = state.dispatcher.post_action(request).await?;
  Ok(AxumReply(reply).into_response())
}
