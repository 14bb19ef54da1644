//! The `LedgerStore` trait — the authoritative relational record.
//!
//! The trait is implemented by storage backends (e.g.
//! `tally-store-sqlite`). Higher layers (`tally-engine`, `tally-api`)
//! depend on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  membership::ToggleOutcome,
  metric::{ActorId, MembershipMetric, SubjectId},
  subject::{Counts, NewSubject, Subject},
};

/// Abstraction over the durable ledger backend.
///
/// The ledger is the source of truth for counter values and membership.
/// Operations that need an existing subject return `Option`: `None`
/// means the subject does not exist, letting callers map it to their
/// own not-found handling without inspecting backend error types.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait LedgerStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Subjects ──────────────────────────────────────────────────────────

  /// Create and persist a new subject with zeroed counters.
  fn create_subject(
    &self,
    input: NewSubject,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  /// Retrieve a subject by id. Returns `None` if not found.
  fn get_subject(
    &self,
    id: SubjectId,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + '_;

  /// Replace a subject's content fields and touch `updated_at`.
  ///
  /// This is the only operation that moves `updated_at`; counter
  /// mutations leave it alone.
  fn update_content(
    &self,
    id: SubjectId,
    input: NewSubject,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + '_;

  // ── Toggle transactions ───────────────────────────────────────────────

  /// Flip the actor's membership for `metric` on `subject` inside one
  /// transaction, adjusting the counter column in the same commit.
  ///
  /// Direction is decided from current state: no active row activates,
  /// an active row deactivates. A concurrent duplicate activation that
  /// trips the uniqueness constraint resolves as "already active" with
  /// the counter left unchanged. The decrement path floors the counter
  /// at zero. Returns `None` if the subject does not exist.
  fn toggle(
    &self,
    metric: MembershipMetric,
    actor: ActorId,
    subject: SubjectId,
  ) -> impl Future<Output = Result<Option<ToggleOutcome>, Self::Error>> + Send + '_;

  /// Whether the actor currently has an active membership row.
  fn membership(
    &self,
    metric: MembershipMetric,
    actor: ActorId,
    subject: SubjectId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Counter reconciliation ────────────────────────────────────────────

  /// Fold an accumulated view delta into the subject's `view_count`
  /// and return the new value. Returns `None` if the subject does not
  /// exist (deleted since the delta accumulated).
  fn apply_view_delta(
    &self,
    subject: SubjectId,
    delta: i64,
  ) -> impl Future<Output = Result<Option<u64>, Self::Error>> + Send + '_;

  /// Read the three durable counter columns for a subject.
  fn counts(
    &self,
    subject: SubjectId,
  ) -> impl Future<Output = Result<Option<Counts>, Self::Error>> + Send + '_;
}
