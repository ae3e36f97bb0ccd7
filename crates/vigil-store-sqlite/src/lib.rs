//! SQLite backend for the Vigil notification store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! pool without blocking the async runtime. The store shares its database with
//! the host registry's own tables (the entity hierarchy and user directory),
//! which may or may not exist at any given moment — every operation re-probes
//! and degrades accordingly.

mod encode;
mod probe;
mod schema;
mod store;
mod visibility;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
