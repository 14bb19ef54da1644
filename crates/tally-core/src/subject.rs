//! Subject — a content item that owns engagement counters.
//!
//! The subject carries only the minimal content fields the engagement
//! core needs; the full post lifecycle (validation, rendering,
//! moderation) lives with the content layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metric::SubjectId;

/// The three durable counter columns of a subject, read together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
  pub view_count:  u64,
  pub like_count:  u64,
  pub scrap_count: u64,
}

/// A content item with its durable engagement counters.
///
/// `updated_at` reflects content edits only. Counter reconciliation
/// never touches it, so counter drift cannot masquerade as an edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
  pub subject_id: SubjectId,
  pub title:      String,
  pub body:       String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  #[serde(flatten)]
  pub counts:     Counts,
}

/// Input for creating a subject; the store assigns id and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSubject {
  pub title: String,
  pub body:  String,
}
