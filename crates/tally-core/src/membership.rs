//! Membership rows and toggle outcomes.
//!
//! A membership row records "actor X currently likes / has scraped
//! subject Y". Rows are never hard-deleted: toggle-off sets the removal
//! marker, toggle-on inserts a fresh row, so history is retained while
//! at most one row per `(actor, subject)` pair is ever active.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metric::{ActorId, SubjectId};

/// A durable like/scrap record for one `(actor, subject)` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
  pub membership_id: i64,
  pub actor_id:      ActorId,
  pub subject_id:    SubjectId,
  pub created_at:    DateTime<Utc>,
  /// Set by a toggle-off transition; `None` while the row is active.
  pub removed_at:    Option<DateTime<Utc>>,
}

/// Direction a toggle resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleState {
  Activated,
  Deactivated,
}

/// Result of a committed toggle transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleOutcome {
  pub state: ToggleState,
  /// The post-commit value of the affected counter column.
  pub count: u64,
}
