//! Metric kinds.
//!
//! Three engagement metrics exist per subject, reconciled under two
//! policies. Likes and scraps are membership-backed and cache-refreshed
//! with the absolute post-commit value on every toggle; views are a
//! pure cache delta drained into the ledger on a timer. The asymmetry
//! is deliberate: likes need immediate correctness for UI feedback,
//! views tolerate lag for throughput.

use serde::{Deserialize, Serialize};

/// Identifier of a content item owning engagement counters.
pub type SubjectId = i64;

/// Identifier of the user performing a view/like/scrap action.
pub type ActorId = i64;

// ─── Metric ──────────────────────────────────────────────────────────────────

/// One of the three engagement counters a subject owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
  Views,
  Likes,
  Scraps,
}

impl Metric {
  /// Stable name used in cache keys and log fields.
  pub fn as_str(self) -> &'static str {
    match self {
      Metric::Views  => "views",
      Metric::Likes  => "likes",
      Metric::Scraps => "scraps",
    }
  }
}

// ─── Membership metrics ──────────────────────────────────────────────────────

/// The toggleable subset of [`Metric`] — metrics backed by a membership
/// table rather than a bare counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipMetric {
  Likes,
  Scraps,
}

impl MembershipMetric {
  pub fn metric(self) -> Metric {
    match self {
      MembershipMetric::Likes  => Metric::Likes,
      MembershipMetric::Scraps => Metric::Scraps,
    }
  }

  pub fn as_str(self) -> &'static str {
    self.metric().as_str()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn membership_metrics_map_to_counter_metrics() {
    assert_eq!(MembershipMetric::Likes.metric(), Metric::Likes);
    assert_eq!(MembershipMetric::Scraps.metric(), Metric::Scraps);
    assert_eq!(MembershipMetric::Likes.as_str(), "likes");
    assert_eq!(MembershipMetric::Scraps.as_str(), "scraps");
  }
}
