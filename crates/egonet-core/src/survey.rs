//! Survey templates — the reusable questionnaire definition a doctor
//! authors, keyed by an author-chosen token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The elicitation parameters shown to the participant's client. These
/// parametrise what the survey UI asks about each named alter; the backend
/// stores them opaquely and echoes them back on `/get_survey`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElicitationParams {
  pub age:    String,
  pub sex:    String,
  pub job:    String,
  pub dial:   String,
  pub circle: String,
}

/// A stored survey template. `token` is the business key participants use
/// to open the survey.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyTemplate {
  pub token:       String,
  pub title:       String,
  pub instruction: String,
  #[serde(flatten)]
  pub params:      ElicitationParams,
  pub created_at:  DateTime<Utc>,
}

/// Input for [`crate::store::SurveyStore::create_template`]. Authorship is
/// recorded against `author_email` in the same unit of work as the template
/// row itself.
#[derive(Debug, Clone)]
pub struct NewTemplate {
  pub author_email: String,
  pub token:        String,
  pub title:        String,
  pub instruction:  String,
  pub params:       ElicitationParams,
}
