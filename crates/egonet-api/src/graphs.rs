//! Handlers for the survey-graph endpoints: submission and review.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/save_survey` | Ingest one completed survey graph |
//! | `POST` | `/get_network` | Doctor reviews a patient's stored graph |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use egonet_core::{
  graph::{GroupSpec, LinkSpec, NodeSpec, Submission},
  store::SurveyStore,
};
use serde::Deserialize;
use serde_json::json;

use crate::{AppState, auth, error::ApiError};

// ─── Save survey ──────────────────────────────────────────────────────────────

/// Wire format of `/save_survey`: clients post the collections under
/// singular keys.
#[derive(Debug, Deserialize)]
pub struct SaveSurveyBody {
  pub email: String,
  pub token: String,
  pub group: Vec<GroupSpec>,
  pub node:  Vec<NodeSpec>,
  pub link:  Vec<LinkSpec>,
}

/// `POST /save_survey` — ingest one participant's completed graph.
pub async fn save_survey<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<SaveSurveyBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SurveyStore,
  ApiError: From<S::Error>,
{
  let submission = Submission {
    groups: body.group,
    nodes:  body.node,
    links:  body.link,
  };

  let completion_id = state
    .store
    .ingest_completion(&body.email, &body.token, submission)
    .await?;
  tracing::info!(token = %body.token, completion_id, "survey graph stored");

  Ok((
    StatusCode::CREATED,
    Json(json!({
      "error": false,
      "message": "Survey successfully saved",
    })),
  ))
}

// ─── Get network ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GetNetworkBody {
  pub email:         String,
  pub password:      String,
  pub token:         String,
  pub patient_email: String,
}

/// `POST /get_network` — a doctor reviews one patient's stored graph.
/// Requires the doctor's credentials and authorship of the template.
pub async fn get_network<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<GetNetworkBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SurveyStore,
  ApiError: From<S::Error>,
{
  let doctor =
    auth::verify_doctor(state.store.as_ref(), &body.email, &body.password)
      .await?;

  let authored = state
    .store
    .templates_by_author(&doctor.email)
    .await?
    .iter()
    .any(|t| t.token == body.token);
  if !authored {
    return Err(ApiError::Unauthorized(
      "You are not the author of this survey".into(),
    ));
  }

  let completion_id = state
    .store
    .completion_id(&body.patient_email, &body.token)
    .await?
    .ok_or_else(|| {
      ApiError::NotFound("This patient has not completed the survey".into())
    })?;

  let graph = state
    .store
    .get_completion_graph(completion_id)
    .await?
    .ok_or_else(|| {
      ApiError::NotFound(format!("completion not found: {completion_id}"))
    })?;

  Ok(Json(json!({
    "error": false,
    "message": "Here is the completed network",
    "network": graph,
  })))
}
