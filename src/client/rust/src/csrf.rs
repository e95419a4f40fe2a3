/* src/client/rust/src/csrf.rs */

/// Where the CSRF parameter name and token come from. Either may be absent,
/// in which case POSTs go out without a token.
pub trait CsrfSource: Send + Sync {
  fn param(&self) -> Option<String>;
  fn token(&self) -> Option<String>;
}

/// Fixed metadata values, typically read once from the rendered page.
#[derive(Debug, Clone, Default)]
pub struct CsrfMeta {
  pub param: Option<String>,
  pub token: Option<String>,
}

impl CsrfMeta {
  pub fn new(param: impl Into<String>, token: impl Into<String>) -> Self {
    Self { param: Some(param.into()), token: Some(token.into()) }
  }
}

impl CsrfSource for CsrfMeta {
  fn param(&self) -> Option<String> {
    self.param.clone()
  }

  fn token(&self) -> Option<String> {
    self.token.clone()
  }
}

/// Both values, or nothing.
pub(crate) fn csrf_pair(source: &dyn CsrfSource) -> Option<(String, String)> {
  Some((source.param()?, source.token()?))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pair_requires_both_values() {
    assert_eq!(
      csrf_pair(&CsrfMeta::new("authenticity_token", "abc")),
      Some(("authenticity_token".to_string(), "abc".to_string()))
    );
    let param_only = CsrfMeta { param: Some("authenticity_token".into()), token: None };
    assert_eq!(csrf_pair(&param_only), None);
    let token_only = CsrfMeta { param: None, token: Some("abc".into()) };
    assert_eq!(csrf_pair(&token_only), None);
    assert_eq!(csrf_pair(&CsrfMeta::default()), None);
  }
}
