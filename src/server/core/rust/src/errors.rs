/* src/server/core/rust/src/errors.rs */

use std::path::PathBuf;

/// Failures raised while discovering or executing definition scripts.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
  #[error("failed to enumerate definition scripts: {message}")]
  Source { message: String },

  #[error("failed to load page {}: {message}", location.display())]
  Script { location: PathBuf, message: String },

  #[error("page at {} did not define a page", location.display())]
  Undeclared { location: PathBuf },

  #[error("pages loaded multiple times outside development; use lazy_load instead")]
  AlreadyLoaded,

  #[error("invalid configuration {}: {message}", path.display())]
  Config { path: PathBuf, message: String },
}

/// Every failure the dispatcher can raise. Nothing is recovered locally;
/// the transport boundary maps these to status codes.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
  #[error("{message}")]
  NotFound { message: String },

  #[error("not authorized to access page {page}")]
  Unauthorized { page: String },

  /// A definition bug: the page declared no authorize predicates.
  #[error("page missing authorization: {page}")]
  MissingAuthorization { page: String },

  #[error(transparent)]
  Load(#[from] LoadError),

  /// Raised by user hooks and action handlers.
  #[error("{message}")]
  Handler { code: String, status: u16, message: String },
}

impl PageError {
  pub fn not_found(message: impl Into<String>) -> Self {
    Self::NotFound { message: message.into() }
  }

  pub fn handler(code: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
    Self::Handler { code: code.into(), status, message: message.into() }
  }

  pub fn invalid(message: impl Into<String>) -> Self {
    Self::handler("INVALID_BODY", 400, message)
  }

  pub fn internal(message: impl Into<String>) -> Self {
    Self::handler("INTERNAL_ERROR", 500, message)
  }

  pub fn code(&self) -> &str {
    match self {
      Self::NotFound { .. } => "NOT_FOUND",
      Self::Unauthorized { .. } => "UNAUTHORIZED",
      Self::MissingAuthorization { .. } => "MISSING_AUTHORIZATION",
      Self::Load(_) => "LOAD_ERROR",
      Self::Handler { code, .. } => code,
    }
  }

  /// Missing authorization shares the not-found status so clients cannot
  /// tell a misdefined page from an absent one.
  pub fn status(&self) -> u16 {
    match self {
      Self::NotFound { .. } | Self::MissingAuthorization { .. } => 404,
      Self::Unauthorized { .. } => 403,
      Self::Load(_) => 500,
      Self::Handler { status, .. } => *status,
    }
  }

  /// True for programmer errors in page definitions, as opposed to
  /// per-request client failures.
  pub fn is_configuration_error(&self) -> bool {
    matches!(
      self,
      Self::MissingAuthorization { .. } | Self::Load(LoadError::Undeclared { .. })
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn taxonomy_statuses() {
    assert_eq!(PageError::not_found("x").status(), 404);
    assert_eq!(PageError::Unauthorized { page: "p".into() }.status(), 403);
    assert_eq!(PageError::MissingAuthorization { page: "p".into() }.status(), 404);
    assert_eq!(PageError::from(LoadError::AlreadyLoaded).status(), 500);
    assert_eq!(PageError::invalid("bad").status(), 400);
  }

  #[test]
  fn missing_authorization_is_distinguishable() {
    let err = PageError::MissingAuthorization { page: "admin/stats".into() };
    assert_eq!(err.code(), "MISSING_AUTHORIZATION");
    assert!(err.is_configuration_error());
    assert!(!PageError::not_found("x").is_configuration_error());
    assert!(!PageError::Unauthorized { page: "p".into() }.is_configuration_error());
  }

  #[test]
  fn display_messages() {
    let err = PageError::MissingAuthorization { page: "mypage".into() };
    assert_eq!(err.to_string(), "page missing authorization: mypage");

    let err = PageError::from(LoadError::Undeclared { location: PathBuf::from("a/page.toml") });
    assert_eq!(err.to_string(), "page at a/page.toml did not define a page");
    assert!(err.is_configuration_error());
  }

  #[test]
  fn handler_errors_keep_their_code() {
    let err = PageError::handler("RATE_LIMITED", 429, "slow down");
    assert_eq!(err.code(), "RATE_LIMITED");
    assert_eq!(err.status(), 429);
    assert_eq!(err.to_string(), "slow down");
  }
}
