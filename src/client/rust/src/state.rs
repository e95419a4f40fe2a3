/* src/client/rust/src/state.rs */

use std::sync::{Arc, OnceLock};

use tokio::sync::watch;

/// What the server said when a request failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSnapshot {
  pub status: u16,
  pub status_text: String,
  pub url: String,
  pub body: String,
}

/// Value of the shared error slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorSnapshot {
  pub error_code: Option<String>,
  pub last_response: Option<ResponseSnapshot>,
}

/// Observable error slot written by every failed request. Clones share the slot.
#[derive(Clone)]
pub struct ErrorState {
  tx: Arc<watch::Sender<ErrorSnapshot>>,
}

static GLOBAL: OnceLock<ErrorState> = OnceLock::new();

impl ErrorState {
  pub fn new() -> Self {
    let (tx, _rx) = watch::channel(ErrorSnapshot::default());
    Self { tx: Arc::new(tx) }
  }

  /// Process-wide slot used by clients that were not given their own.
  pub fn global() -> Self {
    GLOBAL.get_or_init(Self::new).clone()
  }

  pub fn subscribe(&self) -> watch::Receiver<ErrorSnapshot> {
    self.tx.subscribe()
  }

  pub fn current(&self) -> ErrorSnapshot {
    self.tx.borrow().clone()
  }

  pub fn clear(&self) {
    self.tx.send_replace(ErrorSnapshot::default());
  }

  pub(crate) fn record(&self, response: ResponseSnapshot) -> String {
    let error_code = error_code_for(response.status, &response.status_text);
    self.tx.send_replace(ErrorSnapshot {
      error_code: Some(error_code.clone()),
      last_response: Some(response),
    });
    error_code
  }
}

impl Default for ErrorState {
  fn default() -> Self {
    Self::new()
  }
}

impl std::fmt::Debug for ErrorState {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ErrorState").field("current", &*self.tx.borrow()).finish()
  }
}

/// `Not Found` -> `error.not_found`. Without a status text the numeric status is used.
pub fn error_code_for(status: u16, status_text: &str) -> String {
  let text = status_text.trim();
  if text.is_empty() {
    return format!("error.{status}");
  }
  let slug: String = text
    .chars()
    .map(|c| if c.is_whitespace() || c == '-' { '_' } else { c.to_ascii_lowercase() })
    .collect();
  format!("error.{slug}")
}
