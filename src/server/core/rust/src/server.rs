/* src/server/core/rust/src/server.rs */

use std::sync::Arc;

use crate::dispatcher::Dispatcher;
use crate::registry::PageRegistry;
use crate::view::{DataScriptView, ViewRenderer};

/// Framework-agnostic parts extracted from `PageServer`.
/// Adapter crates consume this to build framework-specific routers.
pub struct PageParts {
  pub dispatcher: Dispatcher,
  /// Mount point for the page-id-less fallback routes, if enabled.
  pub fallback: Option<String>,
}

pub struct PageServer {
  registry: Arc<PageRegistry>,
  view: Arc<dyn ViewRenderer>,
  fallback: Option<String>,
}

impl PageServer {
  pub fn new(registry: Arc<PageRegistry>) -> Self {
    Self { registry, view: Arc::new(DataScriptView::default()), fallback: None }
  }

  pub fn view_renderer(mut self, view: impl ViewRenderer + 'static) -> Self {
    self.view = Arc::new(view);
    self
  }

  /// Also serve every page under `path`, selected by `page_id` query parameter.
  /// Meant for test and staging setups.
  pub fn fallback(mut self, path: impl Into<String>) -> Self {
    self.fallback = Some(path.into());
    self
  }

  pub fn registry(&self) -> &Arc<PageRegistry> {
    &self.registry
  }

  /// Consume the builder, returning framework-agnostic parts for an adapter.
  pub fn into_parts(self) -> PageParts {
    PageParts {
      dispatcher: Dispatcher::new(self.registry).with_view(self.view),
      fallback: self.fallback,
    }
  }
}
