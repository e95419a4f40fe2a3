/* src/server/core/rust/src/registry.rs */

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use regex::Regex;
use serde_json::Value;

use crate::config::Environment;
use crate::definition::{Declaration, PageDefinition};
use crate::errors::{LoadError, PageError};
use crate::source::{DefinitionSource, derive_id};

/// Loaded pages keyed by id, in load order.
#[derive(Debug, Default)]
pub struct PageSet {
  pages: IndexMap<String, Arc<PageDefinition>>,
}

impl PageSet {
  /// Replaces an existing id in place, keeping its original position.
  fn insert(&mut self, page: PageDefinition) {
    self.pages.insert(page.id().to_string(), Arc::new(page));
  }

  pub fn get(&self, id: &str) -> Option<&Arc<PageDefinition>> {
    self.pages.get(id)
  }

  pub fn iter(&self) -> impl Iterator<Item = &Arc<PageDefinition>> {
    self.pages.values()
  }

  pub fn len(&self) -> usize {
    self.pages.len()
  }

  pub fn is_empty(&self) -> bool {
    self.pages.is_empty()
  }
}

impl FromIterator<PageDefinition> for PageSet {
  fn from_iter<I: IntoIterator<Item = PageDefinition>>(iter: I) -> Self {
    let mut set = Self::default();
    for page in iter {
      set.insert(page);
    }
    set
  }
}

struct NoSource;

impl DefinitionSource for NoSource {
  fn roots(&self) -> &[PathBuf] {
    &[]
  }

  fn scan(&self) -> Result<Vec<PathBuf>, LoadError> {
    Ok(Vec::new())
  }

  fn execute(&self, _location: &Path) -> Result<Option<Declaration>, LoadError> {
    Ok(None)
  }
}

/// Process-wide page cache. Loaded once; reloading is only permitted in
/// development, where it replaces the whole set in a single swap.
pub struct PageRegistry {
  source: Arc<dyn DefinitionSource>,
  environment: Environment,
  pages: RwLock<Option<Arc<PageSet>>>,
  load_lock: Mutex<()>,
}

impl PageRegistry {
  pub fn new(source: impl DefinitionSource + 'static, environment: Environment) -> Self {
    Self {
      source: Arc::new(source),
      environment,
      pages: RwLock::new(None),
      load_lock: Mutex::new(()),
    }
  }

  /// A registry whose cache is already populated. `load` still consults
  /// the (empty) source and obeys the environment guard.
  pub fn preloaded(
    pages: impl IntoIterator<Item = PageDefinition>,
    environment: Environment,
  ) -> Self {
    let set: PageSet = pages.into_iter().collect();
    Self {
      source: Arc::new(NoSource),
      environment,
      pages: RwLock::new(Some(Arc::new(set))),
      load_lock: Mutex::new(()),
    }
  }

  pub fn environment(&self) -> Environment {
    self.environment
  }

  pub fn is_loaded(&self) -> bool {
    self.pages.read().is_some()
  }

  /// Execute every definition script and replace the cache.
  pub fn load(&self) -> Result<Arc<PageSet>, PageError> {
    let _guard = self.load_lock.lock();
    self.load_locked()
  }

  /// Return the cache, loading it first if it has never been loaded.
  pub fn lazy_load(&self) -> Result<Arc<PageSet>, PageError> {
    if let Some(pages) = self.pages.read().as_ref() {
      return Ok(pages.clone());
    }
    let _guard = self.load_lock.lock();
    if let Some(pages) = self.pages.read().as_ref() {
      return Ok(pages.clone());
    }
    self.load_locked()
  }

  fn load_locked(&self) -> Result<Arc<PageSet>, PageError> {
    if self.is_loaded() {
      if !self.environment.is_interactive() {
        return Err(LoadError::AlreadyLoaded.into());
      }
      tracing::info!(environment = self.environment.as_str(), "reloading pages");
    }

    let roots = self.source.roots();
    let mut set = PageSet::default();
    for location in self.source.scan()? {
      let id = derive_id(roots, &location);
      let declaration = self
        .source
        .execute(&location)?
        .ok_or_else(|| LoadError::Undeclared { location: location.clone() })?;
      if set.get(&id).is_some() {
        tracing::warn!(page = %id, location = %location.display(), "page id redefined");
      }
      tracing::debug!(page = %id, route = %declaration.route, "loaded page");
      set.insert(declaration.into_definition(id));
    }

    tracing::info!(count = set.len(), "pages loaded");
    let set = Arc::new(set);
    *self.pages.write() = Some(set.clone());
    Ok(set)
  }

  // -- queries --

  pub fn all(&self) -> Result<Vec<Arc<PageDefinition>>, PageError> {
    Ok(self.lazy_load()?.iter().cloned().collect())
  }

  pub fn len(&self) -> Result<usize, PageError> {
    Ok(self.lazy_load()?.len())
  }

  pub fn is_empty(&self) -> Result<bool, PageError> {
    Ok(self.lazy_load()?.is_empty())
  }

  pub fn find(&self, id: &str) -> Result<Option<Arc<PageDefinition>>, PageError> {
    Ok(self.lazy_load()?.get(id).cloned())
  }

  /// First page whose metadata matches every pair.
  pub fn find_by(
    &self,
    query: &[(&str, Value)],
  ) -> Result<Option<Arc<PageDefinition>>, PageError> {
    Ok(self.lazy_load()?.iter().find(|page| page.matches(query)).cloned())
  }

  /// Pages whose metadata matches every pair and that satisfy `predicate`.
  pub fn select<P>(
    &self,
    query: &[(&str, Value)],
    predicate: P,
  ) -> Result<Vec<Arc<PageDefinition>>, PageError>
  where
    P: Fn(&PageDefinition) -> bool,
  {
    Ok(
      self
        .lazy_load()?
        .iter()
        .filter(|page| page.matches(query) && predicate(page))
        .cloned()
        .collect(),
    )
  }

  pub fn filter<P>(&self, predicate: P) -> Result<Vec<Arc<PageDefinition>>, PageError>
  where
    P: Fn(&PageDefinition) -> bool,
  {
    self.select(&[], predicate)
  }

  /// Pages whose id matches `pattern`.
  pub fn matching(&self, pattern: &Regex) -> Result<Vec<Arc<PageDefinition>>, PageError> {
    self.filter(|page| pattern.is_match(page.id()))
  }
}
