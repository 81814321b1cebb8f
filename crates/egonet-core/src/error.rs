//! Error types for `egonet-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("doctor not found: {0}")]
  DoctorNotFound(String),

  #[error("survey template not found: {0}")]
  TemplateNotFound(String),

  #[error("patient {email} is not enrolled in survey {token}")]
  NotEnrolled { email: String, token: String },

  #[error("completion not found: {0}")]
  CompletionNotFound(i64),

  #[error("a doctor with email {0} already exists")]
  DoctorExists(String),

  #[error("a survey template with token {0} already exists")]
  TemplateExists(String),

  #[error("patient {email} already completed survey {token}")]
  AlreadyCompleted { email: String, token: String },

  /// A link referenced a client-local node id that no submitted node
  /// declared.
  #[error("link endpoint references undeclared local node id {0}")]
  UnresolvedReference(i64),

  #[error("duplicate client-local node id {0} in one submission")]
  DuplicateLocalId(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
