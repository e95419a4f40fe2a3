/* src/server/core/rust/src/context.rs */

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::definition::PageDefinition;
use crate::errors::PageError;
use crate::reply::Reply;
use crate::request::RequestScope;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

pub type BeforeFn = Box<dyn Fn(RequestScope) -> BoxFuture<Result<(), PageError>> + Send + Sync>;
pub type AuthorizeFn = Box<dyn Fn(RequestScope) -> BoxFuture<bool> + Send + Sync>;
pub type DataFn = Box<dyn Fn(RequestScope) -> BoxFuture<Result<Value, PageError>> + Send + Sync>;
pub type ActionFn = Box<dyn Fn(RequestScope) -> BoxFuture<Result<Reply, PageError>> + Send + Sync>;

/// Request-scoped hooks and handlers, rebuilt from a page's script for
/// every request. Never shared between requests.
pub struct ExecutionContext {
  scope: RequestScope,
  before_hooks: Vec<BeforeFn>,
  authorize_checks: Vec<AuthorizeFn>,
  data_provider: DataFn,
  get_handlers: HashMap<String, ActionFn>,
  post_handlers: HashMap<String, ActionFn>,
}

impl ExecutionContext {
  /// Allocate an empty context and replay the page's script into it.
  pub fn build(page: &PageDefinition, scope: RequestScope) -> Self {
    let mut context = Self::empty(scope);
    page.replay(&mut context);
    context
  }

  fn empty(scope: RequestScope) -> Self {
    Self {
      scope,
      before_hooks: Vec::new(),
      authorize_checks: Vec::new(),
      data_provider: Box::new(|_| Box::pin(async { Ok(Value::Null) })),
      get_handlers: HashMap::new(),
      post_handlers: HashMap::new(),
    }
  }

  /// The request this context was built for.
  pub fn scope(&self) -> &RequestScope {
    &self.scope
  }

  // -- registration --

  pub fn before<F, Fut>(&mut self, hook: F) -> &mut Self
  where
    F: Fn(RequestScope) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), PageError>> + Send + 'static,
  {
    self.before_hooks.push(Box::new(move |scope| Box::pin(hook(scope))));
    self
  }

  pub fn authorize<F, Fut>(&mut self, check: F) -> &mut Self
  where
    F: Fn(RequestScope) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = bool> + Send + 'static,
  {
    self.authorize_checks.push(Box::new(move |scope| Box::pin(check(scope))));
    self
  }

  /// Single slot: a later provider replaces an earlier one.
  pub fn data<F, Fut>(&mut self, provider: F) -> &mut Self
  where
    F: Fn(RequestScope) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, PageError>> + Send + 'static,
  {
    self.data_provider = Box::new(move |scope| Box::pin(provider(scope)));
    self
  }

  pub fn get<F, Fut>(&mut self, action: impl Into<String>, handler: F) -> &mut Self
  where
    F: Fn(RequestScope) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Reply, PageError>> + Send + 'static,
  {
    self.get_handlers.insert(action.into(), Box::new(move |scope| Box::pin(handler(scope))));
    self
  }

  pub fn post<F, Fut>(&mut self, action: impl Into<String>, handler: F) -> &mut Self
  where
    F: Fn(RequestScope) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Reply, PageError>> + Send + 'static,
  {
    self.post_handlers.insert(action.into(), Box::new(move |scope| Box::pin(handler(scope))));
    self
  }

  // -- evaluation --

  /// Evaluate the data provider.
  pub async fn load_data(&self) -> Result<Value, PageError> {
    (self.data_provider)(self.scope.clone()).await
  }

  pub(crate) async fn run_before_hooks(&self) -> Result<(), PageError> {
    for hook in &self.before_hooks {
      hook(self.scope.clone()).await?;
    }
    Ok(())
  }

  /// Stops at the first failing check; later checks never run.
  pub(crate) async fn check_authorization(&self, page_id: &str) -> Result<(), PageError> {
    if self.authorize_checks.is_empty() {
      return Err(PageError::MissingAuthorization { page: page_id.to_string() });
    }
    for check in &self.authorize_checks {
      if !check(self.scope.clone()).await {
        return Err(PageError::Unauthorized { page: page_id.to_string() });
      }
    }
    Ok(())
  }

  pub(crate) fn get_handler(&self, action: &str) -> Option<&ActionFn> {
    self.get_handlers.get(action)
  }

  pub(crate) fn post_handler(&self, action: &str) -> Option<&ActionFn> {
    self.post_handlers.get(action)
  }

  // -- introspection --

  pub fn before_count(&self) -> usize {
    self.before_hooks.len()
  }

  pub fn authorize_count(&self) -> usize {
    self.authorize_checks.len()
  }

  pub fn get_actions(&self) -> Vec<&str> {
    let mut names: Vec<&str> = self.get_handlers.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
  }

  pub fn post_actions(&self) -> Vec<&str> {
    let mut names: Vec<&str> = self.post_handlers.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
  }
}
