//! [`SqliteStore`] — the SQLite implementation of [`SurveyStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use egonet_core::{
  Error as CoreError,
  doctor::{Doctor, NewDoctor},
  graph::{
    CompletionGraph, CompletionId, StoredGroup, StoredLink, StoredNode,
    Submission,
  },
  store::SurveyStore,
  survey::{NewTemplate, SurveyTemplate},
};

use crate::{
  Error, Result,
  encode::{RawDoctor, RawTemplate, encode_dt},
  error::is_duplicate,
  ingest,
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An egonet survey store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Ingestion
/// runs as one transaction on the connection's dedicated thread, so
/// concurrent submissions serialise at the database and the UNIQUE
/// completion constraint decides races.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Existence probe for a (table, key) pair used by the gate queries.
  async fn pair_exists(
    &self,
    sql: &'static str,
    a: String,
    b: String,
  ) -> Result<bool> {
    let found = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(sql, rusqlite::params![a, b], |_| Ok(true))
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(found)
  }
}

#[cfg(test)]
impl SqliteStore {
  /// Raw row count for invariant assertions in tests.
  pub(crate) async fn count_rows(&self, table: &'static str) -> i64 {
    self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!("SELECT COUNT(*) FROM {table}"),
          [],
          |row| row.get(0),
        )?)
      })
      .await
      .expect("count query")
  }
}

// ─── SurveyStore impl ────────────────────────────────────────────────────────

impl SurveyStore for SqliteStore {
  type Error = Error;

  // ── Doctors ───────────────────────────────────────────────────────────────

  async fn create_doctor(&self, input: NewDoctor) -> Result<Doctor> {
    let doctor = Doctor {
      email:         input.email,
      display_name:  input.display_name,
      password_hash: input.password_hash,
      created_at:    Utc::now(),
    };

    let email   = doctor.email.clone();
    let name    = doctor.display_name.clone();
    let hash    = doctor.password_hash.clone();
    let at_str  = encode_dt(doctor.created_at);

    let res = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO doctors (email, display_name, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![email, name, hash, at_str],
        )?;
        Ok(())
      })
      .await;

    match res {
      Ok(()) => Ok(doctor),
      Err(e) if is_duplicate(&e) => {
        Err(Error::Core(CoreError::DoctorExists(doctor.email)))
      }
      Err(e) => Err(e.into()),
    }
  }

  async fn get_doctor(&self, email: &str) -> Result<Option<Doctor>> {
    let email = email.to_owned();

    let raw: Option<RawDoctor> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT email, display_name, password_hash, created_at
               FROM doctors WHERE email = ?1",
              rusqlite::params![email],
              |row| {
                Ok(RawDoctor {
                  email:         row.get(0)?,
                  display_name:  row.get(1)?,
                  password_hash: row.get(2)?,
                  created_at:    row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawDoctor::into_doctor).transpose()
  }

  // ── Survey templates ──────────────────────────────────────────────────────

  async fn create_template(&self, input: NewTemplate) -> Result<SurveyTemplate> {
    let template = SurveyTemplate {
      token:       input.token,
      title:       input.title,
      instruction: input.instruction,
      params:      input.params,
      created_at:  Utc::now(),
    };

    let author  = input.author_email;
    let token   = template.token.clone();
    let title   = template.title.clone();
    let instr   = template.instruction.clone();
    let params  = template.params.clone();
    let at_str  = encode_dt(template.created_at);

    // Template row and authorship relation are one unit of work.
    let outcome: std::result::Result<(), CoreError> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let author_exists: bool = tx
          .query_row(
            "SELECT 1 FROM doctors WHERE email = ?1",
            rusqlite::params![author],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !author_exists {
          return Ok(Err(CoreError::DoctorNotFound(author)));
        }

        let inserted = tx.execute(
          "INSERT INTO survey_templates
             (token, title, instruction, age, sex, job, dial, circle, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            token, title, instr,
            params.age, params.sex, params.job, params.dial, params.circle,
            at_str,
          ],
        );
        if let Err(e) = inserted {
          if crate::error::is_constraint_violation(&e) {
            return Ok(Err(CoreError::TemplateExists(token)));
          }
          return Err(e.into());
        }

        tx.execute(
          "INSERT INTO template_authors (token, doctor_email) VALUES (?1, ?2)",
          rusqlite::params![token, author],
        )?;

        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;

    outcome.map_err(Error::Core)?;
    Ok(template)
  }

  async fn get_template(&self, token: &str) -> Result<Option<SurveyTemplate>> {
    let token = token.to_owned();

    let raw: Option<RawTemplate> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT token, title, instruction, age, sex, job, dial, circle,
                      created_at
               FROM survey_templates WHERE token = ?1",
              rusqlite::params![token],
              |row| {
                Ok(RawTemplate {
                  token:       row.get(0)?,
                  title:       row.get(1)?,
                  instruction: row.get(2)?,
                  age:         row.get(3)?,
                  sex:         row.get(4)?,
                  job:         row.get(5)?,
                  dial:        row.get(6)?,
                  circle:      row.get(7)?,
                  created_at:  row.get(8)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTemplate::into_template).transpose()
  }

  async fn templates_by_author(&self, email: &str) -> Result<Vec<SurveyTemplate>> {
    let email = email.to_owned();

    let raws: Vec<RawTemplate> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT t.token, t.title, t.instruction, t.age, t.sex, t.job,
                  t.dial, t.circle, t.created_at
           FROM survey_templates t
           JOIN template_authors a ON a.token = t.token
           WHERE a.doctor_email = ?1
           ORDER BY t.created_at",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![email], |row| {
            Ok(RawTemplate {
              token:       row.get(0)?,
              title:       row.get(1)?,
              instruction: row.get(2)?,
              age:         row.get(3)?,
              sex:         row.get(4)?,
              job:         row.get(5)?,
              dial:        row.get(6)?,
              circle:      row.get(7)?,
              created_at:  row.get(8)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTemplate::into_template).collect()
  }

  // ── Patients and roster ───────────────────────────────────────────────────

  async fn enroll_patients(
    &self,
    token: &str,
    emails: &[String],
  ) -> Result<usize> {
    let token  = token.to_owned();
    let emails = emails.to_vec();

    let outcome: std::result::Result<usize, CoreError> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let template_exists: bool = tx
          .query_row(
            "SELECT 1 FROM survey_templates WHERE token = ?1",
            rusqlite::params![token],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !template_exists {
          return Ok(Err(CoreError::TemplateNotFound(token)));
        }

        let now = encode_dt(Utc::now());
        let mut enrolled = 0usize;
        for email in &emails {
          // Patients are created lazily on first sight; re-enrollment is a
          // no-op rather than an error.
          tx.execute(
            "INSERT OR IGNORE INTO patients (email, created_at)
             VALUES (?1, ?2)",
            rusqlite::params![email, now],
          )?;
          enrolled += tx.execute(
            "INSERT OR IGNORE INTO template_patients (token, patient_email)
             VALUES (?1, ?2)",
            rusqlite::params![token, email],
          )?;
        }

        tx.commit()?;
        Ok(Ok(enrolled))
      })
      .await?;

    outcome.map_err(Error::Core)
  }

  async fn is_enrolled(&self, email: &str, token: &str) -> Result<bool> {
    self
      .pair_exists(
        "SELECT 1 FROM template_patients
         WHERE token = ?1 AND patient_email = ?2",
        token.to_owned(),
        email.to_owned(),
      )
      .await
  }

  // ── Completion gate ───────────────────────────────────────────────────────

  async fn has_completed(&self, email: &str, token: &str) -> Result<bool> {
    Ok(self.completion_id(email, token).await?.is_some())
  }

  async fn completion_id(
    &self,
    email: &str,
    token: &str,
  ) -> Result<Option<CompletionId>> {
    let email = email.to_owned();
    let token = token.to_owned();

    let id = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT completion_id FROM completions
               WHERE patient_email = ?1 AND token = ?2",
              rusqlite::params![email, token],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(id)
  }

  // ── Ingestion ─────────────────────────────────────────────────────────────

  async fn ingest_completion(
    &self,
    email: &str,
    token: &str,
    submission: Submission,
  ) -> Result<CompletionId> {
    // Reject unresolvable links and duplicate local ids before any write.
    submission.check_references().map_err(Error::Core)?;

    let email = email.to_owned();
    let token = token.to_owned();

    let outcome = self
      .conn
      .call(move |conn| {
        ingest::run(conn, &email, &token, &submission).map_err(Into::into)
      })
      .await?;

    outcome.map_err(Error::Core)
  }

  // ── Graph reader ──────────────────────────────────────────────────────────

  async fn get_completion_graph(
    &self,
    id: CompletionId,
  ) -> Result<Option<CompletionGraph>> {
    type RawGraph =
      (Vec<StoredGroup>, Vec<StoredNode>, Vec<(i64, i64)>);

    let raw: Option<RawGraph> = self
      .conn
      .call(move |conn| {
        let exists: bool = conn
          .query_row(
            "SELECT 1 FROM completions WHERE completion_id = ?1",
            rusqlite::params![id],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !exists {
          return Ok(None);
        }

        let mut stmt = conn.prepare(
          "SELECT g.group_id, g.name, g.color
           FROM groups g
           JOIN group_memberships gm ON gm.group_id = g.group_id
           WHERE gm.completion_id = ?1
           ORDER BY g.group_id",
        )?;
        let groups = stmt
          .query_map(rusqlite::params![id], |row| {
            Ok(StoredGroup {
              group_id: row.get(0)?,
              name:     row.get(1)?,
              color:    row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(
          "SELECT n.node_id, n.local_id, n.name, n.age, n.sex, n.job,
                  n.dial, n.circle, n.position_x, n.position_y, n.group_name
           FROM nodes n
           JOIN node_memberships nm ON nm.node_id = n.node_id
           WHERE nm.completion_id = ?1
           ORDER BY n.node_id",
        )?;
        let nodes = stmt
          .query_map(rusqlite::params![id], |row| {
            Ok(StoredNode {
              node_id:    row.get(0)?,
              local_id:   row.get(1)?,
              name:       row.get(2)?,
              age:        row.get(3)?,
              sex:        row.get(4)?,
              job:        row.get(5)?,
              dial:       row.get(6)?,
              circle:     row.get(7)?,
              position_x: row.get(8)?,
              position_y: row.get(9)?,
              group_name: row.get(10)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        // Endpoint rows in link order; paired into links by the caller.
        let mut stmt = conn.prepare(
          "SELECT le.link_id, le.node_id
           FROM link_endpoints le
           JOIN node_memberships nm ON nm.node_id = le.node_id
           WHERE nm.completion_id = ?1
           ORDER BY le.link_id, le.rowid",
        )?;
        let endpoints = stmt
          .query_map(rusqlite::params![id], |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some((groups, nodes, endpoints)))
      })
      .await?;

    let Some((groups, nodes, endpoints)) = raw else {
      return Ok(None);
    };

    let links = pair_endpoints(&endpoints)?;

    Ok(Some(CompletionGraph { completion_id: id, groups, nodes, links }))
  }
}

/// Fold `(link_id, node_id)` endpoint rows into links, insisting on exactly
/// two endpoints per link id.
fn pair_endpoints(endpoints: &[(i64, i64)]) -> Result<Vec<StoredLink>> {
  let mut links = Vec::new();
  let mut iter = endpoints.iter().peekable();

  while let Some(&(link_id, source)) = iter.next() {
    let Some(&(_, target)) = iter.next_if(|&&(id, _)| id == link_id) else {
      return Err(Error::MalformedLink(link_id));
    };
    if iter.peek().is_some_and(|&&(id, _)| id == link_id) {
      return Err(Error::MalformedLink(link_id));
    }
    links.push(StoredLink { link_id, source, target });
  }

  Ok(links)
}
