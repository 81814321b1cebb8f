//! SQLite backend for the egonet survey store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! pool without blocking the async runtime. Survey-graph ingestion runs as a
//! single SQLite transaction; either every row of a submission commits or
//! none do.

mod encode;
mod ingest;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
