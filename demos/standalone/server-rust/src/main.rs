/* demos/standalone/server-rust/src/main.rs */

mod pages;

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use quire_server::config::ENV_VAR;
use quire_server::{Environment, ManifestSource, PageRegistry, PageServer, PagesConfig};
use quire_server_axum::IntoAxumRouter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let config_path = env::var("QUIRE_CONFIG")
    .map(PathBuf::from)
    .unwrap_or_else(|_| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("quire.toml"));
  let mut config = PagesConfig::load(&config_path)
    .with_context(|| format!("loading {}", config_path.display()))?;
  if env::var_os(ENV_VAR).is_some() {
    config.environment = Environment::from_env();
  }
  tracing::info!(environment = config.environment.as_str(), roots = ?config.roots, "starting");

  let source = ManifestSource::from_config(&config, pages::scripts());
  let registry = Arc::new(PageRegistry::new(source, config.environment));
  registry.load().context("loading pages")?;

  let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
  let addr = format!("0.0.0.0:{port}");

  PageServer::new(registry)
    .fallback("/_quire/page")
    .serve(&addr)
    .await
    .map_err(|e| anyhow::anyhow!("server error: {e}"))
}
