/* src/server/adapter/axum/src/reply.rs */

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use quire_server::{Reply, ReplyBody};

/// Newtype carrying a core `Reply` across the orphan rule, like `AxumError`.
pub(crate) struct AxumReply(pub Reply);

impl IntoResponse for AxumReply {
  fn into_response(self) -> Response {
    let Reply { status, body } = self.0;
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::OK);
    match body {
      ReplyBody::Json(value) => (status, axum::Json(value)).into_response(),
      ReplyBody::Html(html) => (status, Html(html)).into_response(),
      ReplyBody::Text(text) => (status, text).into_response(),
      ReplyBody::Empty => status.into_response(),
    }
  }
}
