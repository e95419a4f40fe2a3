/* src/server/core/rust/src/definition.rs */

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::context::ExecutionContext;

pub type Metadata = Map<String, Value>;

/// Registration procedure replayed against a fresh context on every request.
pub type PageScript = Arc<dyn Fn(&mut ExecutionContext) + Send + Sync>;

/// What a definition script yields: route, tags and the registration procedure.
#[derive(Clone)]
pub struct Declaration {
  pub route: String,
  pub metadata: Metadata,
  pub script: PageScript,
}

/// Declare a page.
///
/// ```ignore
/// define("/comments", |page| {
///   page.authorize(|_| async { true });
///   page.data(|_| async { Ok(json!({ "value": "hello!" })) });
/// })
/// .meta("section", "blog")
/// ```
pub fn define<F>(route: impl Into<String>, script: F) -> Declaration
where
  F: Fn(&mut ExecutionContext) + Send + Sync + 'static,
{
  Declaration { route: route.into(), metadata: Metadata::new(), script: Arc::new(script) }
}

impl Declaration {
  pub fn meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.metadata.insert(key.into(), value.into());
    self
  }

  pub(crate) fn into_definition(self, id: String) -> PageDefinition {
    PageDefinition { id, route: self.route, metadata: self.metadata, script: self.script }
  }
}

impl fmt::Debug for Declaration {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Declaration")
      .field("route", &self.route)
      .field("metadata", &self.metadata)
      .finish_non_exhaustive()
  }
}

/// Immutable, process-wide description of one routable page.
pub struct PageDefinition {
  id: String,
  route: String,
  metadata: Metadata,
  script: PageScript,
}

impl PageDefinition {
  pub fn new<F>(id: impl Into<String>, route: impl Into<String>, script: F) -> Self
  where
    F: Fn(&mut ExecutionContext) + Send + Sync + 'static,
  {
    Self { id: id.into(), route: route.into(), metadata: Metadata::new(), script: Arc::new(script) }
  }

  pub fn with_metadata(mut self, metadata: Metadata) -> Self {
    self.metadata = metadata;
    self
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn route(&self) -> &str {
    &self.route
  }

  pub fn metadata(&self) -> &Metadata {
    &self.metadata
  }

  /// Whether every `(key, value)` pair equals the page's metadata entry.
  pub fn matches(&self, query: &[(&str, Value)]) -> bool {
    query.iter().all(|(key, value)| self.metadata.get(*key) == Some(value))
  }

  pub(crate) fn replay(&self, context: &mut ExecutionContext) {
    (self.script)(context);
  }
}

impl fmt::Debug for PageDefinition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#<Page:{}>", self.id)
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn debug_prints_id() {
    let page = PageDefinition::new("this/page/id", "my/route", |_| {});
    assert_eq!(format!("{page:?}"), "#<Page:this/page/id>");
  }

  #[test]
  fn define_collects_metadata() {
    let declaration = define("/path/:id", |_| {}).meta("one", "two").meta("admin", true);
    assert_eq!(declaration.route, "/path/:id");
    assert_eq!(declaration.metadata["one"], "two");
    assert_eq!(declaration.metadata["admin"], true);

    let page = declaration.into_definition("test/page".to_string());
    assert_eq!(page.id(), "test/page");
    assert!(page.matches(&[("one", json!("two")), ("admin", json!(true))]));
    assert!(!page.matches(&[("one", json!("three"))]));
    assert!(!page.matches(&[("missing", json!("two"))]));
    assert!(page.matches(&[]));
  }

  #[test]
  fn declaring_does_not_run_the_script() {
    let _declaration = define("/never", |_| panic!("this should not be executed"));
  }
}
