//! Core types and trait definitions for the egonet survey store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod doctor;
pub mod error;
pub mod graph;
pub mod store;
pub mod survey;
pub mod translate;

pub use error::{Error, Result};
