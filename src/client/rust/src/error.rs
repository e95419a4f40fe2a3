/* src/client/rust/src/error.rs */

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),

  /// Non-2xx response. The shared error state has already been updated.
  #[error("{status} {status_text} ({error_code})")]
  Status { status: u16, status_text: String, error_code: String },

  #[error("request body must be a JSON object")]
  Body,

  #[error("invalid JSON response: {0}")]
  Decode(#[from] serde_json::Error),

  #[error("cannot build action URL from {url}")]
  InvalidUrl { url: String },
}
