//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. Surrogate keys are SQLite
//! rowids and need no translation; only the TEXT columns are decoded here.

use chrono::{DateTime, Utc};
use egonet_core::{
  doctor::Doctor,
  survey::{ElicitationParams, SurveyTemplate},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `doctors` row.
pub struct RawDoctor {
  pub email:         String,
  pub display_name:  String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawDoctor {
  pub fn into_doctor(self) -> Result<Doctor> {
    Ok(Doctor {
      email:         self.email,
      display_name:  self.display_name,
      password_hash: self.password_hash,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `survey_templates` row.
pub struct RawTemplate {
  pub token:       String,
  pub title:       String,
  pub instruction: String,
  pub age:         String,
  pub sex:         String,
  pub job:         String,
  pub dial:        String,
  pub circle:      String,
  pub created_at:  String,
}

impl RawTemplate {
  pub fn into_template(self) -> Result<SurveyTemplate> {
    Ok(SurveyTemplate {
      token:       self.token,
      title:       self.title,
      instruction: self.instruction,
      params:      ElicitationParams {
        age:    self.age,
        sex:    self.sex,
        job:    self.job,
        dial:   self.dial,
        circle: self.circle,
      },
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}
