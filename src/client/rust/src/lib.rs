/* src/client/rust/src/lib.rs */

//! Client side of quire page actions.
//!
//! A [`PageClient`] is bound to the URL of the page being shown and calls its
//! sub-actions at `<page>/action/<name>`. Failed calls are reported both as an
//! `Err` and through the shared [`ErrorState`] slot.

mod client;
mod csrf;
mod error;
mod state;

pub use client::PageClient;
pub use csrf::{CsrfMeta, CsrfSource};
pub use error::ClientError;
pub use state::{ErrorSnapshot, ErrorState, ResponseSnapshot, error_code_for};
