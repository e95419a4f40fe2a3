/* src/server/core/rust/src/source/static_source.rs */

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::DefinitionSource;
use crate::definition::Declaration;
use crate::errors::LoadError;

type StaticScript = Arc<dyn Fn() -> Result<Option<Declaration>, String> + Send + Sync>;

/// Definition scripts compiled into the binary, addressed by the location
/// they would have on disk.
#[derive(Clone, Default)]
pub struct StaticSource {
  roots: Vec<PathBuf>,
  scripts: Vec<(PathBuf, StaticScript)>,
}

impl StaticSource {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
    self.roots.push(root.into());
    self
  }

  /// A script that always declares a page.
  pub fn page<F>(self, location: impl Into<PathBuf>, declare: F) -> Self
  where
    F: Fn() -> Declaration + Send + Sync + 'static,
  {
    self.script(location, move || Ok(Some(declare())))
  }

  /// A script with full control: it may fail, or run without declaring anything.
  pub fn script<F>(mut self, location: impl Into<PathBuf>, script: F) -> Self
  where
    F: Fn() -> Result<Option<Declaration>, String> + Send + Sync + 'static,
  {
    self.scripts.push((location.into(), Arc::new(script)));
    self
  }
}

impl DefinitionSource for StaticSource {
  fn roots(&self) -> &[PathBuf] {
    &self.roots
  }

  fn scan(&self) -> Result<Vec<PathBuf>, LoadError> {
    Ok(self.scripts.iter().map(|(location, _)| location.clone()).collect())
  }

  fn execute(&self, location: &Path) -> Result<Option<Declaration>, LoadError> {
    let (_, script) = self.scripts.iter().find(|(l, _)| l == location).ok_or_else(|| {
      LoadError::Script { location: location.to_path_buf(), message: "no such script".into() }
    })?;
    script().map_err(|message| LoadError::Script { location: location.to_path_buf(), message })
  }
}
