//! Encoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings; counters as plain
//! integers read back through `u64::try_from` so a corrupted negative
//! value fails loudly instead of wrapping.

use chrono::{DateTime, Utc};
use tally_core::{
  metric::MembershipMetric,
  subject::{Counts, Subject},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339()
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Membership tables ───────────────────────────────────────────────────────

/// Table and counter column backing a membership metric. The names are
/// compile-time constants, so interpolating them into SQL is safe.
pub fn membership_tables(metric: MembershipMetric) -> (&'static str, &'static str) {
  match metric {
    MembershipMetric::Likes  => ("likes",  "like_count"),
    MembershipMetric::Scraps => ("scraps", "scrap_count"),
  }
}

// ─── Row mapping ─────────────────────────────────────────────────────────────

/// A subjects row as it comes off SQLite, before timestamp decoding.
pub struct RawSubject {
  pub subject_id:  i64,
  pub title:       String,
  pub body:        String,
  pub created_at:  String,
  pub updated_at:  String,
  pub view_count:  i64,
  pub like_count:  i64,
  pub scrap_count: i64,
}

impl RawSubject {
  pub const COLUMNS: &'static str =
    "subject_id, title, body, created_at, updated_at, \
     view_count, like_count, scrap_count";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawSubject {
      subject_id:  row.get(0)?,
      title:       row.get(1)?,
      body:        row.get(2)?,
      created_at:  row.get(3)?,
      updated_at:  row.get(4)?,
      view_count:  row.get(5)?,
      like_count:  row.get(6)?,
      scrap_count: row.get(7)?,
    })
  }

  pub fn into_subject(self) -> Result<Subject> {
    Ok(Subject {
      subject_id: self.subject_id,
      title:      self.title,
      body:       self.body,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
      counts:     counts_from_columns(
        self.view_count,
        self.like_count,
        self.scrap_count,
      )?,
    })
  }
}

pub fn counts_from_columns(views: i64, likes: i64, scraps: i64) -> Result<Counts> {
  let non_negative = |v: i64| {
    u64::try_from(v)
      .map_err(|_| Error::Corrupt(format!("negative counter column: {v}")))
  };
  Ok(Counts {
    view_count:  non_negative(views)?,
    like_count:  non_negative(likes)?,
    scrap_count: non_negative(scraps)?,
  })
}
