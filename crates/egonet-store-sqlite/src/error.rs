//! Error type for `egonet-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] egonet_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored link did not resolve to exactly two endpoint rows.
  #[error("link {0} does not have exactly two endpoints")]
  MalformedLink(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Whether a rusqlite error is a UNIQUE/constraint violation. Used to turn
/// the authoritative duplicate signal from the database into a typed domain
/// error instead of a generic failure.
pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(e, _)
      if e.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

/// Same classification once the error has crossed the connection's thread
/// boundary.
pub(crate) fn is_duplicate(err: &tokio_rusqlite::Error) -> bool {
  matches!(err, tokio_rusqlite::Error::Rusqlite(e) if is_constraint_violation(e))
}
