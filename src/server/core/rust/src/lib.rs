/* src/server/core/rust/src/lib.rs */

//! Page-scoped request handling.
//!
//! Pages are declared once (route, metadata and a registration script),
//! cached in a [`PageRegistry`], and replayed into a fresh
//! [`ExecutionContext`] for every request. The [`Dispatcher`] runs the
//! before → authorize → data/action pipeline over that context.

pub mod config;
pub mod context;
pub mod definition;
pub mod dispatcher;
pub mod errors;
pub mod registry;
pub mod reply;
pub mod request;
pub mod server;
pub mod source;
pub mod view;

// Re-exports for ergonomic use
pub use config::{Environment, PagesConfig};
pub use context::{BoxFuture, ExecutionContext};
pub use definition::{Declaration, Metadata, PageDefinition, PageScript, define};
pub use dispatcher::Dispatcher;
pub use errors::{LoadError, PageError};
pub use registry::{PageRegistry, PageSet};
pub use reply::{Reply, ReplyBody};
pub use request::{Format, PageRequest, RequestScope};
pub use server::{PageParts, PageServer};
pub use source::{DefinitionSource, ManifestSource, ScriptTable, StaticSource, derive_id};
pub use view::{DataScriptView, ViewRenderer, escape_script_json};
