//! [`SqliteLedger`] — the SQLite implementation of [`LedgerStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use tally_core::{
  membership::{ToggleOutcome, ToggleState},
  metric::{ActorId, MembershipMetric, SubjectId},
  store::LedgerStore,
  subject::{Counts, NewSubject, Subject},
};

use crate::{
  encode::{counts_from_columns, encode_dt, membership_tables, RawSubject},
  schema::SCHEMA,
  Error, Result,
};

// ─── Ledger ──────────────────────────────────────────────────────────────────

/// A tally ledger backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteLedger {
  conn: tokio_rusqlite::Connection,
}

impl SqliteLedger {
  /// Open (or create) a ledger at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let ledger = Self { conn };
    ledger.init_schema().await?;
    Ok(ledger)
  }

  /// Open an in-memory ledger — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let ledger = Self { conn };
    ledger.init_schema().await?;
    Ok(ledger)
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

  async fn fetch_subject(&self, id: SubjectId) -> Result<Option<Subject>> {
    let raw: Option<RawSubject> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM subjects WHERE subject_id = ?1",
                RawSubject::COLUMNS
              ),
              rusqlite::params![id],
              RawSubject::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubject::into_subject).transpose()
  }
}

/// A second concurrent activation for an already-active pair trips the
/// partial unique index; callers treat it as "already active".
fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

// ─── LedgerStore impl ────────────────────────────────────────────────────────

impl LedgerStore for SqliteLedger {
  type Error = Error;

  // ── Subjects ──────────────────────────────────────────────────────────────

  async fn create_subject(&self, input: NewSubject) -> Result<Subject> {
    let now    = Utc::now();
    let at_str = encode_dt(now);
    let title  = input.title.clone();
    let body   = input.body.clone();

    let id: SubjectId = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subjects (title, body, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?3)",
          rusqlite::params![title, body, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Subject {
      subject_id: id,
      title:      input.title,
      body:       input.body,
      created_at: now,
      updated_at: now,
      counts:     Counts::default(),
    })
  }

  async fn get_subject(&self, id: SubjectId) -> Result<Option<Subject>> {
    self.fetch_subject(id).await
  }

  async fn update_content(
    &self,
    id:    SubjectId,
    input: NewSubject,
  ) -> Result<Option<Subject>> {
    let at_str = encode_dt(Utc::now());

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE subjects SET title = ?2, body = ?3, updated_at = ?4
           WHERE subject_id = ?1",
          rusqlite::params![id, input.title, input.body, at_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.fetch_subject(id).await
  }

  // ── Toggle transactions ───────────────────────────────────────────────────

  async fn toggle(
    &self,
    metric:  MembershipMetric,
    actor:   ActorId,
    subject: SubjectId,
  ) -> Result<Option<ToggleOutcome>> {
    let (table, column) = membership_tables(metric);
    let now_str         = encode_dt(Utc::now());

    let outcome: Option<(ToggleState, i64)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let exists: bool = tx
          .query_row(
            "SELECT 1 FROM subjects WHERE subject_id = ?1",
            rusqlite::params![subject],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !exists {
          return Ok(None);
        }

        let active_row: Option<i64> = tx
          .query_row(
            &format!(
              "SELECT membership_id FROM {table}
               WHERE actor_id = ?1 AND subject_id = ?2 AND removed_at IS NULL"
            ),
            rusqlite::params![actor, subject],
            |r| r.get(0),
          )
          .optional()?;

        let state = match active_row {
          Some(membership_id) => {
            // ACTIVE → INACTIVE: soft-delete the row, decrement floored
            // at zero so a lost-update race cannot push it negative.
            tx.execute(
              &format!("UPDATE {table} SET removed_at = ?2 WHERE membership_id = ?1"),
              rusqlite::params![membership_id, now_str],
            )?;
            tx.execute(
              &format!(
                "UPDATE subjects SET {column} = MAX({column} - 1, 0)
                 WHERE subject_id = ?1"
              ),
              rusqlite::params![subject],
            )?;
            ToggleState::Deactivated
          }
          None => {
            // INACTIVE → ACTIVE: insert a fresh row; the partial unique
            // index absorbs a racing duplicate as "already active".
            let inserted = match tx.execute(
              &format!(
                "INSERT INTO {table} (actor_id, subject_id, created_at)
                 VALUES (?1, ?2, ?3)"
              ),
              rusqlite::params![actor, subject, now_str],
            ) {
              Ok(_) => true,
              Err(ref e) if is_unique_violation(e) => false,
              Err(e) => return Err(e.into()),
            };
            if inserted {
              tx.execute(
                &format!(
                  "UPDATE subjects SET {column} = {column} + 1
                   WHERE subject_id = ?1"
                ),
                rusqlite::params![subject],
              )?;
            }
            ToggleState::Activated
          }
        };

        let count: i64 = tx.query_row(
          &format!("SELECT {column} FROM subjects WHERE subject_id = ?1"),
          rusqlite::params![subject],
          |r| r.get(0),
        )?;

        tx.commit()?;
        Ok(Some((state, count)))
      })
      .await?;

    outcome
      .map(|(state, count)| {
        let count = u64::try_from(count)
          .map_err(|_| Error::Corrupt(format!("negative counter column: {count}")))?;
        Ok(ToggleOutcome { state, count })
      })
      .transpose()
  }

  async fn membership(
    &self,
    metric:  MembershipMetric,
    actor:   ActorId,
    subject: SubjectId,
  ) -> Result<bool> {
    let (table, _) = membership_tables(metric);

    let active: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT 1 FROM {table}
                 WHERE actor_id = ?1 AND subject_id = ?2 AND removed_at IS NULL"
              ),
              rusqlite::params![actor, subject],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;

    Ok(active)
  }

  // ── Counter reconciliation ────────────────────────────────────────────────

  async fn apply_view_delta(
    &self,
    subject: SubjectId,
    delta:   i64,
  ) -> Result<Option<u64>> {
    // Both statements run on the connection's single worker thread, so
    // the read-back sees the value just written; updated_at is
    // deliberately left untouched.
    let new_count: Option<i64> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE subjects SET view_count = MAX(view_count + ?2, 0)
           WHERE subject_id = ?1",
          rusqlite::params![subject, delta],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              "SELECT view_count FROM subjects WHERE subject_id = ?1",
              rusqlite::params![subject],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    new_count
      .map(|c| {
        u64::try_from(c)
          .map_err(|_| Error::Corrupt(format!("negative counter column: {c}")))
      })
      .transpose()
  }

  async fn counts(&self, subject: SubjectId) -> Result<Option<Counts>> {
    let raw: Option<(i64, i64, i64)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT view_count, like_count, scrap_count
               FROM subjects WHERE subject_id = ?1",
              rusqlite::params![subject],
              |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .map(|(views, likes, scraps)| counts_from_columns(views, likes, scraps))
      .transpose()
  }
}
