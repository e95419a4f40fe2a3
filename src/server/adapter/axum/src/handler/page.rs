/* src/server/adapter/axum/src/handler/page.rs */

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{MatchedPath, Path, Query, State};
use axum::http::HeaderMap;
use axum::http::header::ACCEPT;
use axum::response::{IntoResponse, Response};
use quire_server::{Format, PageRequest};

use super::{AppState, collect_headers, query_value};
use crate::error::AxumError;
use crate::reply::AxumReply;

/// Build the view request shared by mounted pages and the fallback mount.
pub(super) fn view_request(
  page_id: &str,
  path_params: HashMap<String, String>,
  query: Vec<(String, String)>,
  headers: &HeaderMap,
) -> PageRequest {
  let accept = headers.get(ACCEPT).and_then(|v| v.to_str().ok());
  let format = Format::negotiate(accept, query_value(&query, "format"));
  PageRequest {
    page_id: page_id.to_string(),
    path_params,
    query,
    format,
    headers: collect_headers(headers),
    ..PageRequest::default()
  }
}

pub(super) async fn handle_view(
  State(state): State<Arc<AppState>>,
  matched: MatchedPath,
  headers: HeaderMap,
  Path(params): Path<HashMap<String, String>>,
  Query(query): Query<Vec<(String, String)>>,
) -> Result<Response, AxumError> {
  let page_id = state.page_for(matched.as_str())?;
  let request = view_request(page_id, params, query, &headers);
  let reply = state.dispatcher.view(request).await?;
  Ok(AxumReply(reply).into_response())
}
