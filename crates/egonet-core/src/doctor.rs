//! Doctor — the clinician who authors survey templates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered clinician account. The email is the login key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
  pub email:         String,
  pub display_name:  String,
  /// Argon2 PHC string. Never the plaintext password.
  pub password_hash: String,
  pub created_at:    DateTime<Utc>,
}

/// Input for [`crate::store::SurveyStore::create_doctor`]. The caller hashes
/// the password before building this.
#[derive(Debug, Clone)]
pub struct NewDoctor {
  pub email:         String,
  pub display_name:  String,
  pub password_hash: String,
}
