/* src/server/adapter/axum/src/lib.rs */

mod error;
mod handler;
mod reply;

use quire_server::{PageError, PageServer};

/// Re-export quire-server core for convenience
pub use quire_server;

/// Extension trait that converts a `PageServer` into an Axum router.
pub trait IntoAxumRouter {
  /// Mounts `GET <route>`, `GET <route>/action/{action_name}` and
  /// `POST <route>/action/{action_name}` for every registered page.
  fn into_axum_router(self) -> Result<axum::Router, PageError>;
  fn serve(
    self,
    addr: &str,
  ) -> impl std::future::Future<Output = Result<(), Box<dyn std::error::Error>>> + Send;
}

impl IntoAxumRouter for PageServer {
  fn into_axum_router(self) -> Result<axum::Router, PageError> {
    let parts = self.into_parts();
    handler::build_router(parts.dispatcher, parts.fallback)
  }

  async fn serve(self, addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    let router = self.into_axum_router()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!("quire server running on http://localhost:{}", local_addr.port());
    axum::serve(listener, router).await?;
    Ok(())
  }
}

#[cfg(test)]
mod tests;
