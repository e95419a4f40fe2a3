/* src/server/core/rust/src/source/mod.rs */

// Definition sources enumerate definition scripts and execute them.
// The registry owns id derivation and caching; sources only report what exists.

mod manifest;
mod static_source;


use std::path::{Component, Path, PathBuf};

use crate::definition::Declaration;
use crate::errors::LoadError;

pub use manifest::{ManifestSource, ScriptTable};
pub use static_source::StaticSource;

pub trait DefinitionSource: Send + Sync {
  /// Base roots, in the order they are scanned.
  fn roots(&self) -> &[PathBuf];

  /// All definition script locations, in enumeration order.
  fn scan(&self) -> Result<Vec<PathBuf>, LoadError>;

  /// Run one script. `Ok(None)` means it ran but declared no page.
  fn execute(&self, location: &Path) -> Result<Option<Declaration>, LoadError>;
}

/// Map a script location to a page id.
///
/// "/root/app/pages/mypage/page.toml" -> "mypage"
/// "/root/drivers/feature1/app/pages/nest/page.toml" -> "nest"
///
/// Each root yields a candidate (the location relative to it, or the whole
/// location when it lies elsewhere) with the script file name dropped.
/// The shortest candidate wins; the earlier root wins a tie. A script sitting
/// directly in a root keeps its file name, so ids are never empty.
pub fn derive_id(roots: &[PathBuf], location: &Path) -> String {
  let candidates =
    roots.iter().map(|root| candidate(location.strip_prefix(root).unwrap_or(location)));
  candidates.min_by_key(String::len).unwrap_or_else(|| candidate(location))
}

fn candidate(relative: &Path) -> String {
  let id = join_components(relative.parent().unwrap_or(Path::new("")));
  if id.is_empty() { join_components(relative) } else { id }
}

fn join_components(path: &Path) -> String {
  path
    .components()
    .filter_map(|c| match c {
      Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
      _ => None,
    })
    .collect::<Vec<_>>()
    .join("/")
}
