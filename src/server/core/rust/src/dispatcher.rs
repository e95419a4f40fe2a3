/* src/server/core/rust/src/dispatcher.rs */

use std::sync::Arc;

use crate::context::ExecutionContext;
use crate::definition::PageDefinition;
use crate::errors::PageError;
use crate::registry::PageRegistry;
use crate::reply::Reply;
use crate::request::{Format, PageRequest, RequestScope};
use crate::view::{DataScriptView, ViewRenderer};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ActionMethod {
  Get,
  Post,
}

/// Runs the before/authorize/data/action pipeline for each request.
/// Every entry point builds its own execution context.
#[derive(Clone)]
pub struct Dispatcher {
  registry: Arc<PageRegistry>,
  view: Arc<dyn ViewRenderer>,
}

impl Dispatcher {
  pub fn new(registry: Arc<PageRegistry>) -> Self {
    Self { registry, view: Arc::new(DataScriptView::default()) }
  }

  pub fn with_view(mut self, view: Arc<dyn ViewRenderer>) -> Self {
    self.view = view;
    self
  }

  pub fn registry(&self) -> &Arc<PageRegistry> {
    &self.registry
  }

  /// Page view: the data provider's output, rendered or as raw JSON.
  pub async fn view(&self, request: PageRequest) -> Result<Reply, PageError> {
    let format = request.format;
    let (page, context) = self.prepare(request).await?;
    let data = context.load_data().await?;
    tracing::debug!(page = %page.id(), ?format, "rendering page view");
    match format {
      Format::Json => Ok(Reply::json(data)),
      Format::Html => Ok(Reply::html(self.view.render(&page, &data)?)),
    }
  }

  pub async fn get_action(&self, request: PageRequest) -> Result<Reply, PageError> {
    self.run_action(request, ActionMethod::Get).await
  }

  pub async fn post_action(&self, request: PageRequest) -> Result<Reply, PageError> {
    self.run_action(request, ActionMethod::Post).await
  }

  async fn run_action(
    &self,
    request: PageRequest,
    method: ActionMethod,
  ) -> Result<Reply, PageError> {
    let action = request.action_name.clone().unwrap_or_default();
    let (page, context) = self.prepare(request).await?;
    let handler = match method {
      ActionMethod::Get => context.get_handler(&action),
      ActionMethod::Post => context.post_handler(&action),
    };
    let Some(handler) = handler else {
      tracing::debug!(page = %page.id(), action = %action, ?method, "unknown page action");
      let message = format!("Action '{action}' not found on page '{}'", page.id());
      return Err(PageError::not_found(message));
    };
    tracing::debug!(page = %page.id(), action = %action, ?method, "running page action");
    handler(context.scope().clone()).await
  }

  /// Resolve the page, build a fresh context, run before hooks, authorize.
  async fn prepare(
    &self,
    request: PageRequest,
  ) -> Result<(Arc<PageDefinition>, ExecutionContext), PageError> {
    let page = self
      .registry
      .find(&request.page_id)?
      .ok_or_else(|| PageError::not_found(format!("Page '{}' not found", request.page_id)))?;

    let context = ExecutionContext::build(&page, RequestScope::new(request));
    context.run_before_hooks().await?;

    match context.check_authorization(page.id()).await {
      Ok(()) => Ok((page, context)),
      Err(err @ PageError::MissingAuthorization { .. }) => {
        tracing::error!(page = %page.id(), "page declares no authorize checks");
        Err(err)
      }
      Err(err) => {
        tracing::info!(page = %page.id(), "request not authorized");
        Err(err)
      }
    }
  }
}
