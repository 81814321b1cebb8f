//! Handlers for doctor account endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/register` | Body: first_name, email, password |
//! | `POST` | `/login` | Body: email, password |
//! | `POST` | `/retrieve_surveys` | Body: email, password; lists authored templates |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use egonet_core::{doctor::NewDoctor, store::SurveyStore};
use serde::Deserialize;
use serde_json::json;

use crate::{AppState, auth, error::ApiError};

// ─── Register ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub first_name: String,
  pub email:      String,
  pub password:   String,
}

/// `POST /register`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SurveyStore,
  ApiError: From<S::Error>,
{
  let password_hash = auth::hash_password(&body.password)?;
  state
    .store
    .create_doctor(NewDoctor {
      email: body.email,
      display_name: body.first_name,
      password_hash,
    })
    .await?;

  Ok((
    StatusCode::CREATED,
    Json(json!({
      "error": false,
      "message": "You are successfully registered",
    })),
  ))
}

// ─── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    String,
  pub password: String,
}

/// `POST /login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SurveyStore,
  ApiError: From<S::Error>,
{
  let doctor =
    auth::verify_doctor(state.store.as_ref(), &body.email, &body.password)
      .await?;

  Ok(Json(json!({
    "error": false,
    "message": "You've been successfully identified",
    "first_name": doctor.display_name,
  })))
}

// ─── Retrieve surveys ─────────────────────────────────────────────────────────

/// `POST /retrieve_surveys` — a doctor's previously authored templates.
pub async fn retrieve_surveys<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SurveyStore,
  ApiError: From<S::Error>,
{
  let doctor =
    auth::verify_doctor(state.store.as_ref(), &body.email, &body.password)
      .await?;

  let templates = state.store.templates_by_author(&doctor.email).await?;
  let surveys: Vec<_> = templates
    .iter()
    .map(|t| {
      json!({
        "token":       t.token,
        "title":       t.title,
        "instruction": t.instruction,
        "age":         t.params.age,
        "sex":         t.params.sex,
        "job":         t.params.job,
        "dial":        t.params.dial,
        "circle":      t.params.circle,
      })
    })
    .collect();

  Ok(Json(json!({
    "error": false,
    "message": "Here are your previous surveys",
    "surveys": surveys,
  })))
}
