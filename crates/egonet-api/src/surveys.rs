//! Handlers for survey-template endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/add_survey` | Create a template + authorship |
//! | `POST` | `/add_patients` | Enroll patients on a template's roster |
//! | `POST` | `/get_survey` | Participant fetches elicitation parameters |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use egonet_core::{
  store::SurveyStore,
  survey::{ElicitationParams, NewTemplate},
};
use serde::Deserialize;
use serde_json::json;

use crate::{AppState, error::ApiError};

// ─── Add survey ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AddSurveyBody {
  pub email:       String,
  pub token:       String,
  pub title:       String,
  pub instruction: String,
  pub age:         String,
  pub sex:         String,
  pub job:         String,
  pub dial:        String,
  pub circle:      String,
}

/// `POST /add_survey`
pub async fn add_survey<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<AddSurveyBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SurveyStore,
  ApiError: From<S::Error>,
{
  state
    .store
    .create_template(NewTemplate {
      author_email: body.email,
      token:        body.token,
      title:        body.title,
      instruction:  body.instruction,
      params:       ElicitationParams {
        age:    body.age,
        sex:    body.sex,
        job:    body.job,
        dial:   body.dial,
        circle: body.circle,
      },
    })
    .await?;

  Ok((
    StatusCode::CREATED,
    Json(json!({
      "error": false,
      "message": "Survey successfully saved, thank you",
    })),
  ))
}

// ─── Add patients ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AddPatientsBody {
  pub token:  String,
  pub emails: Vec<String>,
}

/// `POST /add_patients`
pub async fn add_patients<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<AddPatientsBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SurveyStore,
  ApiError: From<S::Error>,
{
  let enrolled = state
    .store
    .enroll_patients(&body.token, &body.emails)
    .await?;
  tracing::debug!(token = %body.token, enrolled, "patients enrolled");

  Ok((
    StatusCode::CREATED,
    Json(json!({
      "error": false,
      "message": "Patients successfully added",
    })),
  ))
}

// ─── Get survey ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GetSurveyBody {
  pub email: String,
  pub token: String,
}

/// `POST /get_survey` — a participant fetches the template parameters.
/// Gated on roster membership; participants never see each other's graphs
/// through this endpoint.
pub async fn get_survey<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<GetSurveyBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SurveyStore,
  ApiError: From<S::Error>,
{
  if !state.store.is_enrolled(&body.email, &body.token).await? {
    return Err(ApiError::Unauthorized(
      "You are not enrolled in this survey".into(),
    ));
  }

  let template = state
    .store
    .get_template(&body.token)
    .await?
    .ok_or_else(|| {
      ApiError::NotFound(format!("survey template not found: {}", body.token))
    })?;

  Ok(Json(json!({
    "error": false,
    "message": "Here are the survey parameters",
    "survey": {
      "token":       template.token,
      "title":       template.title,
      "instruction": template.instruction,
      "age":         template.params.age,
      "sex":         template.params.sex,
      "job":         template.params.job,
      "dial":        template.params.dial,
      "circle":      template.params.circle,
    },
  })))
}
