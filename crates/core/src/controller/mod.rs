//! Catalog controller - the observable state holder.
//!
//! Owns the authoritative in-memory record list, mediates the three
//! user-facing operations (download, reload, remove) against the fetcher
//! and the catalog store, and broadcasts a change event on every mutation
//! so any presentation layer can subscribe without framework coupling.

mod config;
mod runner;
mod types;

pub use config::ControllerConfig;
pub use runner::CatalogController;
pub use types::{CatalogEvent, ControllerError};
