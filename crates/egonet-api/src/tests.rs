//! Router-level tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use egonet_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::AppState;

async fn app() -> Router {
  let store = SqliteStore::open_in_memory().await.expect("in-memory store");
  crate::router(AppState { store: Arc::new(store) })
}

/// POST a JSON body and return (status, parsed response body).
async fn post(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
  let response = app
    .clone()
    .oneshot(
      Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap(),
    )
    .await
    .unwrap();

  let status = response.status();
  let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
    .await
    .unwrap();
  let value = serde_json::from_slice(&bytes).unwrap();
  (status, value)
}

fn register_body() -> Value {
  json!({
    "first_name": "Ada",
    "email": "doc@example.com",
    "password": "secret",
  })
}

fn add_survey_body(token: &str) -> Value {
  json!({
    "email": "doc@example.com",
    "token": token,
    "title": "Support network",
    "instruction": "Name the people you rely on",
    "age": "yes", "sex": "yes", "job": "no", "dial": "yes", "circle": "yes",
  })
}

fn save_survey_body(token: &str) -> Value {
  json!({
    "email": "p@x.com",
    "token": token,
    "group": [{ "name": "family", "color": "#ff0000" }],
    "node": [
      { "id_app": 1, "first_name": "Alice", "age": 30, "sex": 1,
        "job": "nurse", "dial": 2, "circle": 1,
        "position_x": 10, "position_y": 20, "group_name": "family" },
      { "id_app": 2, "first_name": "Bob", "age": 41, "sex": 2,
        "job": "teacher", "dial": 1, "circle": 3,
        "position_x": 30, "position_y": 40, "group_name": "family" },
    ],
    "link": [{ "id_1": 1, "id_2": 2 }],
  })
}

/// Register the doctor, create template `token`, and enroll `p@x.com`.
async fn seed(app: &Router, token: &str) {
  let (status, _) = post(app, "/register", register_body()).await;
  assert_eq!(status, StatusCode::CREATED);
  let (status, _) = post(app, "/add_survey", add_survey_body(token)).await;
  assert_eq!(status, StatusCode::CREATED);
  let (status, _) = post(
    app,
    "/add_patients",
    json!({ "token": token, "emails": ["p@x.com"] }),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
}

// ─── Accounts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_then_login() {
  let app = app().await;

  let (status, body) = post(&app, "/register", register_body()).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["error"], json!(false));

  let (status, body) = post(
    &app,
    "/login",
    json!({ "email": "doc@example.com", "password": "secret" }),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["first_name"], json!("Ada"));
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
  let app = app().await;
  post(&app, "/register", register_body()).await;

  let (status, body) = post(
    &app,
    "/login",
    json!({ "email": "doc@example.com", "password": "wrong" }),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body["error"], json!(true));
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
  let app = app().await;
  post(&app, "/register", register_body()).await;

  let (status, body) = post(&app, "/register", register_body()).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["error"], json!(true));
}

// ─── Templates and roster ────────────────────────────────────────────────────

#[tokio::test]
async fn enrolled_patient_gets_survey_parameters() {
  let app = app().await;
  seed(&app, "T1").await;

  let (status, body) = post(
    &app,
    "/get_survey",
    json!({ "email": "p@x.com", "token": "T1" }),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["survey"]["token"], json!("T1"));
  assert_eq!(body["survey"]["age"], json!("yes"));
}

#[tokio::test]
async fn unenrolled_patient_is_rejected() {
  let app = app().await;
  seed(&app, "T1").await;

  let (status, body) = post(
    &app,
    "/get_survey",
    json!({ "email": "stranger@x.com", "token": "T1" }),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body["error"], json!(true));
}

#[tokio::test]
async fn retrieve_surveys_lists_authored_templates() {
  let app = app().await;
  seed(&app, "T1").await;

  let (status, body) = post(
    &app,
    "/retrieve_surveys",
    json!({ "email": "doc@example.com", "password": "secret" }),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["surveys"][0]["token"], json!("T1"));
}

// ─── Survey graphs ───────────────────────────────────────────────────────────

#[tokio::test]
async fn save_survey_then_review_network() {
  let app = app().await;
  seed(&app, "T1").await;

  let (status, body) = post(&app, "/save_survey", save_survey_body("T1")).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["error"], json!(false));

  let (status, body) = post(
    &app,
    "/get_network",
    json!({
      "email": "doc@example.com",
      "password": "secret",
      "token": "T1",
      "patient_email": "p@x.com",
    }),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["network"]["nodes"].as_array().unwrap().len(), 2);
  assert_eq!(body["network"]["links"].as_array().unwrap().len(), 1);
  assert_eq!(body["network"]["groups"][0]["name"], json!("family"));
}

#[tokio::test]
async fn second_submission_conflicts() {
  let app = app().await;
  seed(&app, "T1").await;

  post(&app, "/save_survey", save_survey_body("T1")).await;
  let (status, body) = post(&app, "/save_survey", save_survey_body("T1")).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["error"], json!(true));
}

#[tokio::test]
async fn unresolved_link_is_unprocessable() {
  let app = app().await;
  seed(&app, "T1").await;

  let mut body = save_survey_body("T1");
  body["link"] = json!([{ "id_1": 1, "id_2": 99 }]);

  let (status, body) = post(&app, "/save_survey", body).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["error"], json!(true));
}

#[tokio::test]
async fn review_requires_authorship() {
  let app = app().await;
  seed(&app, "T1").await;
  post(&app, "/save_survey", save_survey_body("T1")).await;

  // A second doctor who did not author T1.
  post(
    &app,
    "/register",
    json!({
      "first_name": "Eve",
      "email": "other@example.com",
      "password": "hunter2",
    }),
  )
  .await;

  let (status, _) = post(
    &app,
    "/get_network",
    json!({
      "email": "other@example.com",
      "password": "hunter2",
      "token": "T1",
      "patient_email": "p@x.com",
    }),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}
