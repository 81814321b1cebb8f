//! The survey-graph ingestion engine.
//!
//! One submission becomes one SQLite transaction: the completion row, every
//! group, node, and link, and all their membership relations commit together
//! or not at all. Client-local node ids are translated to server ids through
//! an in-memory [`LocalIdMap`] built as nodes are inserted; no per-endpoint
//! query round trips.

use chrono::Utc;
use egonet_core::{
  Error as CoreError,
  graph::{CompletionId, Submission},
  translate::LocalIdMap,
};
use rusqlite::{OptionalExtension as _, Transaction, params};

use crate::{encode::encode_dt, error::is_constraint_violation};

/// Outcome of one ingestion attempt: the committed completion id, or a typed
/// domain rejection that rolled everything back. Infrastructure failures
/// travel on the outer `rusqlite::Result`.
pub(crate) type IngestOutcome = Result<CompletionId, CoreError>;

/// Run the whole ingestion inside a fresh transaction on `conn`.
pub(crate) fn run(
  conn: &mut rusqlite::Connection,
  email: &str,
  token: &str,
  submission: &Submission,
) -> rusqlite::Result<IngestOutcome> {
  let tx = conn.transaction()?;
  match ingest_in_tx(&tx, email, token, submission)? {
    Ok(id) => {
      tx.commit()?;
      Ok(Ok(id))
    }
    Err(rejection) => {
      tx.rollback()?;
      Ok(Err(rejection))
    }
  }
}

fn ingest_in_tx(
  tx: &Transaction<'_>,
  email: &str,
  token: &str,
  submission: &Submission,
) -> rusqlite::Result<IngestOutcome> {
  // Preconditions: the template must exist and the participant must be on
  // its roster.
  let template_exists: bool = tx
    .query_row(
      "SELECT 1 FROM survey_templates WHERE token = ?1",
      params![token],
      |_| Ok(true),
    )
    .optional()?
    .unwrap_or(false);
  if !template_exists {
    return Ok(Err(CoreError::TemplateNotFound(token.to_owned())));
  }

  let enrolled: bool = tx
    .query_row(
      "SELECT 1 FROM template_patients
       WHERE token = ?1 AND patient_email = ?2",
      params![token, email],
      |_| Ok(true),
    )
    .optional()?
    .unwrap_or(false);
  if !enrolled {
    return Ok(Err(CoreError::NotEnrolled {
      email: email.to_owned(),
      token: token.to_owned(),
    }));
  }

  // The completion insert carries the duplicate-submission guard: the
  // UNIQUE (patient_email, token) constraint is the authoritative signal,
  // so a check-then-act race between two submissions cannot double-insert.
  let inserted = tx.execute(
    "INSERT INTO completions (patient_email, token, recorded_at)
     VALUES (?1, ?2, ?3)",
    params![email, token, encode_dt(Utc::now())],
  );
  let completion_id = match inserted {
    Ok(_) => tx.last_insert_rowid(),
    Err(e) if is_constraint_violation(&e) => {
      return Ok(Err(CoreError::AlreadyCompleted {
        email: email.to_owned(),
        token: token.to_owned(),
      }));
    }
    Err(e) => return Err(e),
  };

  // Groups: entity row plus its membership, pair by pair.
  for group in &submission.groups {
    tx.execute(
      "INSERT INTO groups (name, color) VALUES (?1, ?2)",
      params![group.name, group.color],
    )?;
    let group_id = tx.last_insert_rowid();
    tx.execute(
      "INSERT INTO group_memberships (completion_id, group_id)
       VALUES (?1, ?2)",
      params![completion_id, group_id],
    )?;
  }

  // Nodes must all exist before any link, because links reference them by
  // client-local id through the translator.
  let mut map = LocalIdMap::new();
  for node in &submission.nodes {
    tx.execute(
      "INSERT INTO nodes (
         name, age, sex, job, dial, circle,
         position_x, position_y, local_id, group_name
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
      params![
        node.name,
        node.age,
        node.sex,
        node.job,
        node.dial,
        node.circle,
        node.position_x,
        node.position_y,
        node.local_id,
        node.group_name,
      ],
    )?;
    let node_id = tx.last_insert_rowid();
    tx.execute(
      "INSERT INTO node_memberships (completion_id, node_id)
       VALUES (?1, ?2)",
      params![completion_id, node_id],
    )?;
    if let Err(e) = map.bind(node.local_id, node_id) {
      return Ok(Err(e));
    }
  }

  for link in &submission.links {
    // Resolve both endpoints before writing anything for this link.
    let source = match map.resolve(link.source) {
      Ok(id) => id,
      Err(e) => return Ok(Err(e)),
    };
    let target = match map.resolve(link.target) {
      Ok(id) => id,
      Err(e) => return Ok(Err(e)),
    };

    tx.execute("INSERT INTO links DEFAULT VALUES", [])?;
    let link_id = tx.last_insert_rowid();
    tx.execute(
      "INSERT INTO link_endpoints (link_id, node_id) VALUES (?1, ?2)",
      params![link_id, source],
    )?;
    tx.execute(
      "INSERT INTO link_endpoints (link_id, node_id) VALUES (?1, ?2)",
      params![link_id, target],
    )?;
  }

  Ok(Ok(completion_id))
}
