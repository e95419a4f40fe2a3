/* src/server/core/rust/src/reply.rs */

use serde::Serialize;
use serde_json::Value;

use crate::errors::PageError;

#[derive(Debug, Clone, PartialEq)]
pub enum ReplyBody {
  Json(Value),
  Html(String),
  Text(String),
  Empty,
}

/// Response produced by an action handler or the view entry point.
/// Adapters translate it into their framework's response type.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
  pub status: u16,
  pub body: ReplyBody,
}

impl Reply {
  pub fn json(value: Value) -> Self {
    Self { status: 200, body: ReplyBody::Json(value) }
  }

  /// Serialize any value into a JSON reply.
  pub fn serialize<T: Serialize>(value: &T) -> Result<Self, PageError> {
    serde_json::to_value(value).map(Self::json).map_err(|e| PageError::internal(e.to_string()))
  }

  pub fn html(body: impl Into<String>) -> Self {
    Self { status: 200, body: ReplyBody::Html(body.into()) }
  }

  pub fn text(body: impl Into<String>) -> Self {
    Self { status: 200, body: ReplyBody::Text(body.into()) }
  }

  pub fn empty() -> Self {
    Self { status: 204, body: ReplyBody::Empty }
  }

  pub fn with_status(mut self, status: u16) -> Self {
    self.status = status;
    self
  }

  pub fn json_body(&self) -> Option<&Value> {
    match &self.body {
      ReplyBody::Json(value) => Some(value),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn constructors() {
    assert_eq!(Reply::json(json!({"it": "worked!"})).status, 200);
    assert_eq!(Reply::empty().status, 204);
    assert_eq!(Reply::text("created").with_status(201).status, 201);
    assert!(Reply::html("<p>hi</p>").json_body().is_none());
  }

  #[test]
  fn serialize_struct() {
    #[derive(Serialize)]
    struct Comment {
      content: &'static str,
    }
    let reply = Reply::serialize(&Comment { content: "hello" }).unwrap();
    assert_eq!(reply.json_body(), Some(&json!({"content": "hello"})));
  }
}
