//! The `SurveyStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `egonet-store-sqlite`).
//! The HTTP layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  doctor::{Doctor, NewDoctor},
  graph::{CompletionGraph, CompletionId, Submission},
  survey::{NewTemplate, SurveyTemplate},
};

/// Abstraction over an egonet survey store backend.
///
/// Identity is always threaded in as explicit parameters; implementations
/// hold no notion of a "current user". Uniqueness (doctor email, template
/// token, one completion per participant/token pair) is enforced by the
/// backend's constraints; the violating write surfaces as a typed duplicate
/// error, never as silent duplication.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait SurveyStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Doctors ───────────────────────────────────────────────────────────

  /// Register a doctor. Fails with a duplicate error if the email is taken.
  fn create_doctor(
    &self,
    input: NewDoctor,
  ) -> impl Future<Output = Result<Doctor, Self::Error>> + Send + '_;

  /// Fetch a doctor by login email. Returns `None` if not found.
  fn get_doctor<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Doctor>, Self::Error>> + Send + 'a;

  // ── Survey templates ──────────────────────────────────────────────────

  /// Create a template and its authorship relation as one unit of work.
  ///
  /// Fails with a duplicate error if the token is taken, and with not-found
  /// if the author is not a registered doctor.
  fn create_template(
    &self,
    input: NewTemplate,
  ) -> impl Future<Output = Result<SurveyTemplate, Self::Error>> + Send + '_;

  /// Fetch a template by token. Returns `None` if not found.
  fn get_template<'a>(
    &'a self,
    token: &'a str,
  ) -> impl Future<Output = Result<Option<SurveyTemplate>, Self::Error>> + Send + 'a;

  /// All templates authored by a doctor, oldest first.
  fn templates_by_author<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Vec<SurveyTemplate>, Self::Error>> + Send + 'a;

  // ── Patients and roster ───────────────────────────────────────────────

  /// Enroll patients in a template, lazily creating patient rows on first
  /// sight. Re-enrolling an already-enrolled patient is a no-op. Returns
  /// the number of newly enrolled patients.
  fn enroll_patients<'a>(
    &'a self,
    token: &'a str,
    emails: &'a [String],
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  /// Whether a patient is on the roster for a template. Gates `/get_survey`.
  fn is_enrolled<'a>(
    &'a self,
    email: &'a str,
    token: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Completion gate ───────────────────────────────────────────────────

  /// Whether a (participant, token) pair already has a completion.
  fn has_completed<'a>(
    &'a self,
    email: &'a str,
    token: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// The existing completion id for the pair, or `None` if not yet
  /// completed.
  fn completion_id<'a>(
    &'a self,
    email: &'a str,
    token: &'a str,
  ) -> impl Future<Output = Result<Option<CompletionId>, Self::Error>> + Send + 'a;

  // ── Ingestion ─────────────────────────────────────────────────────────

  /// Ingest one submitted survey graph as a single unit of work.
  ///
  /// Creates the completion row, then every group, node, and link with
  /// their membership relations, in that order. Either all rows commit
  /// together or none do. A second submission for the same pair fails with
  /// a duplicate error and leaves the stored graph untouched.
  fn ingest_completion<'a>(
    &'a self,
    email: &'a str,
    token: &'a str,
    submission: Submission,
  ) -> impl Future<Output = Result<CompletionId, Self::Error>> + Send + 'a;

  // ── Graph reader ──────────────────────────────────────────────────────

  /// Reconstruct the stored graph of a completion. Returns `None` if the
  /// completion does not exist; a completion with zero alters yields
  /// `Some` with empty collections.
  fn get_completion_graph(
    &self,
    id: CompletionId,
  ) -> impl Future<Output = Result<Option<CompletionGraph>, Self::Error>> + Send + '_;
}
