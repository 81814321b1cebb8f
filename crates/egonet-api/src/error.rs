//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure becomes a `{"error": true, "message": ...}` body with the
//! matching status code; no core failure escapes as a panic.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  Unauthorized(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Conflict(String),

  #[error("{0}")]
  Unprocessable(String),

  #[error("{0}")]
  BadRequest(String),

  #[error("internal error: {0}")]
  Internal(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m.clone()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Unprocessable(m) => {
        (StatusCode::UNPROCESSABLE_ENTITY, m.clone())
      }
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": true, "message": message })))
      .into_response()
  }
}

impl From<egonet_core::Error> for ApiError {
  fn from(e: egonet_core::Error) -> Self {
    use egonet_core::Error as E;
    match e {
      E::DoctorNotFound(_) | E::TemplateNotFound(_) | E::CompletionNotFound(_) => {
        ApiError::NotFound(e.to_string())
      }
      E::NotEnrolled { .. } => ApiError::Unauthorized(e.to_string()),
      E::DoctorExists(_) | E::TemplateExists(_) | E::AlreadyCompleted { .. } => {
        ApiError::Conflict(e.to_string())
      }
      E::UnresolvedReference(_) | E::DuplicateLocalId(_) => {
        ApiError::Unprocessable(e.to_string())
      }
    }
  }
}

impl From<egonet_store_sqlite::Error> for ApiError {
  fn from(e: egonet_store_sqlite::Error) -> Self {
    match e {
      egonet_store_sqlite::Error::Core(core) => core.into(),
      other => ApiError::Store(Box::new(other)),
    }
  }
}
