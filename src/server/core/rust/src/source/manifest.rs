/* src/server/core/rust/src/source/manifest.rs */

// Filesystem definition source: every `<root>/**/page.toml` is a definition
// script naming its route, metadata and the Rust script that registers hooks.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use super::DefinitionSource;
use crate::config::{DEFAULT_SCRIPT_FILE, PagesConfig};
use crate::context::ExecutionContext;
use crate::definition::{Declaration, Metadata, PageScript};
use crate::errors::LoadError;

#[derive(Deserialize)]
struct PageFile {
  route: Option<String>,
  script: Option<String>,
  #[serde(default)]
  metadata: toml::Table,
}

/// Named registration procedures that page files refer to by `script = "..."`.
#[derive(Clone, Default)]
pub struct ScriptTable {
  scripts: HashMap<String, PageScript>,
}

impl ScriptTable {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert<F>(mut self, name: impl Into<String>, script: F) -> Self
  where
    F: Fn(&mut ExecutionContext) + Send + Sync + 'static,
  {
    self.scripts.insert(name.into(), Arc::new(script));
    self
  }

  pub fn get(&self, name: &str) -> Option<&PageScript> {
    self.scripts.get(name)
  }

}

pub struct ManifestSource {
  roots: Vec<PathBuf>,
  script_file: String,
  scripts: ScriptTable,
}

impl ManifestSource {
  pub fn new(roots: Vec<PathBuf>, scripts: ScriptTable) -> Self {
    Self { roots, script_file: DEFAULT_SCRIPT_FILE.to_string(), scripts }
  }

  pub fn from_config(config: &PagesConfig, scripts: ScriptTable) -> Self {
    Self { roots: config.roots.clone(), script_file: config.script_file.clone(), scripts }
  }

  pub fn script_file(mut self, name: impl Into<String>) -> Self {
    self.script_file = name.into();
    self
  }

  fn script_error(location: &Path, message: impl Into<String>) -> LoadError {
    LoadError::Script { location: location.to_path_buf(), message: message.into() }
  }
}

impl DefinitionSource for ManifestSource {
  fn roots(&self) -> &[PathBuf] {
    &self.roots
  }

  fn scan(&self) -> Result<Vec<PathBuf>, LoadError> {
    let mut locations = Vec::new();
    for root in &self.roots {
      // Roots and file names are literal paths, not patterns.
      let base = glob::Pattern::escape(&root.to_string_lossy());
      let file = glob::Pattern::escape(&self.script_file);
      let pattern = Path::new(&base).join("**").join(file);
      let pattern = pattern.to_string_lossy();
      let entries =
        glob::glob(&pattern).map_err(|e| LoadError::Source { message: e.to_string() })?;
      let mut found = Vec::new();
      for entry in entries {
        let path = entry.map_err(|e| LoadError::Source { message: e.to_string() })?;
        if path.is_file() {
          found.push(path);
        }
      }
      found.sort();
      locations.extend(found);
    }
    Ok(locations)
  }

  fn execute(&self, location: &Path) -> Result<Option<Declaration>, LoadError> {
    let content =
      std::fs::read_to_string(location).map_err(|e| Self::script_error(location, e.to_string()))?;
    let file: PageFile =
      toml::from_str(&content).map_err(|e| Self::script_error(location, e.to_string()))?;

    let Some(route) = file.route else {
      return Ok(None);
    };
    let name = file.script.ok_or_else(|| Self::script_error(location, "missing `script` key"))?;
    let script = self
      .scripts
      .get(&name)
      .cloned()
      .ok_or_else(|| Self::script_error(location, format!("unknown page script '{name}'")))?;

    let metadata = toml_to_metadata(file.metadata)
      .map_err(|e| Self::script_error(location, format!("invalid metadata: {e}")))?;

    Ok(Some(Declaration { route, metadata, script }))
  }
}

fn toml_to_metadata(table: toml::Table) -> Result<Metadata, serde_json::Error> {
  match serde_json::to_value(table)? {
    serde_json::Value::Object(map) => Ok(map),
    _ => Ok(Metadata::new()),
  }
}
