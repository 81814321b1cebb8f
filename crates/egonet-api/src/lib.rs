//! JSON REST API for egonet.
//!
//! Exposes an axum [`Router`] backed by any [`egonet_core::store::SurveyStore`].
//! Every response body carries `error: bool` and `message: String`, matching
//! what the existing survey clients expect; failures use 4xx/5xx status codes.

pub mod auth;
pub mod doctors;
pub mod error;
pub mod graphs;
pub mod surveys;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::post};
use egonet_core::store::SurveyStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: SurveyStore> {
  pub store: Arc<S>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full API router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: SurveyStore + Clone + Send + Sync + 'static,
  ApiError: From<S::Error>,
{
  Router::new()
    // Doctors
    .route("/register",         post(doctors::register::<S>))
    .route("/login",            post(doctors::login::<S>))
    .route("/retrieve_surveys", post(doctors::retrieve_surveys::<S>))
    // Templates and roster
    .route("/add_survey",       post(surveys::add_survey::<S>))
    .route("/add_patients",     post(surveys::add_patients::<S>))
    .route("/get_survey",       post(surveys::get_survey::<S>))
    // Survey graphs
    .route("/save_survey",      post(graphs::save_survey::<S>))
    .route("/get_network",      post(graphs::get_network::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
mod tests;
