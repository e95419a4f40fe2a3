/* src/server/core/rust/src/config.rs */

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::errors::LoadError;

pub const ENV_VAR: &str = "QUIRE_ENV";
pub const DEFAULT_SCRIPT_FILE: &str = "page.toml";

/// Deployment mode. Only development permits reloading the page registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Environment {
  Development,
  Test,
  #[default]
  Production,
}

impl Environment {
  pub fn is_interactive(self) -> bool {
    self == Self::Development
  }

  /// Read `QUIRE_ENV`, falling back to production when unset or unknown.
  pub fn from_env() -> Self {
    Self::from_env_value(std::env::var(ENV_VAR).ok().as_deref())
  }

  pub fn from_env_value(value: Option<&str>) -> Self {
    value.and_then(|v| v.parse().ok()).unwrap_or_default()
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Development => "development",
      Self::Test => "test",
      Self::Production => "production",
    }
  }
}

impl FromStr for Environment {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "development" | "dev" => Ok(Self::Development),
      "test" => Ok(Self::Test),
      "production" | "prod" => Ok(Self::Production),
      other => Err(format!("unknown environment '{other}'")),
    }
  }
}

impl TryFrom<String> for Environment {
  type Error = String;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

/// Contents of `quire.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PagesConfig {
  #[serde(default)]
  pub environment: Environment,
  /// Base directories scanned for definition scripts, in enumeration order.
  #[serde(default)]
  pub roots: Vec<PathBuf>,
  #[serde(default = "default_script_file")]
  pub script_file: String,
}

fn default_script_file() -> String {
  DEFAULT_SCRIPT_FILE.to_string()
}

impl Default for PagesConfig {
  fn default() -> Self {
    Self {
      environment: Environment::default(),
      roots: vec![PathBuf::from("app/pages")],
      script_file: default_script_file(),
    }
  }
}

impl PagesConfig {
  pub fn from_toml_str(content: &str) -> Result<Self, LoadError> {
    Self::parse(content, Path::new("<inline>"))
  }

  /// Read a config file. Relative roots are resolved against the file's directory.
  pub fn load(path: &Path) -> Result<Self, LoadError> {
    let content = std::fs::read_to_string(path)
      .map_err(|e| LoadError::Config { path: path.to_path_buf(), message: e.to_string() })?;
    let mut config = Self::parse(&content, path)?;
    if let Some(base) = path.parent() {
      config.roots = config
        .roots
        .into_iter()
        .map(|root| if root.is_relative() { base.join(root) } else { root })
        .collect();
    }
    Ok(config)
  }

  fn parse(content: &str, path: &Path) -> Result<Self, LoadError> {
    let config: Self = toml::from_str(content)
      .map_err(|e| LoadError::Config { path: path.to_path_buf(), message: e.to_string() })?;
    if config.roots.is_empty() {
      return Err(LoadError::Config {
        path: path.to_path_buf(),
        message: "roots must not be empty".to_string(),
      });
    }
    if config.script_file.is_empty() || config.script_file.contains('/') {
      return Err(LoadError::Config {
        path: path.to_path_buf(),
        message: format!("script_file must be a bare file name, got '{}'", config.script_file),
      });
    }
    Ok(config)
  }
}
