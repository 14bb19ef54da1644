//! The `CounterStore` trait — the ephemeral counter cache.
//!
//! Keyed by `(subject, metric)`. For immediate-absolute metrics the
//! stored value mirrors the ledger; for periodic-additive metrics it is
//! a pure delta since the last flush. No durability is expected across
//! restarts, and no caller may treat the cache as a source of truth.

use std::future::Future;

use crate::metric::{Metric, SubjectId};

/// Abstraction over the ephemeral counter cache backend.
///
/// Single-key atomicity only: `increment`/`decrement` must not lose
/// updates under concurrent callers for the same key, but no cross-key
/// transaction is offered. `read` returning `None` means "no cached
/// value", which callers must distinguish from zero.
pub trait CounterStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Atomically add 1 to the key, creating it at 1 if absent.
  fn increment(
    &self,
    subject: SubjectId,
    metric: Metric,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Atomically subtract 1 from the key, creating it at -1 if absent.
  fn decrement(
    &self,
    subject: SubjectId,
    metric: Metric,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Overwrite the key with an absolute value (immediate-absolute
  /// refresh path).
  fn put(
    &self,
    subject: SubjectId,
    metric: Metric,
    value: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Point read. `None` means the key is absent, not zero.
  fn read(
    &self,
    subject: SubjectId,
    metric: Metric,
  ) -> impl Future<Output = Result<Option<i64>, Self::Error>> + Send + '_;

  /// Enumerate subjects with a resident key for `metric`.
  ///
  /// Snapshot-at-call-time: keys added while the enumeration runs may
  /// or may not be included. The reconciliation pass tolerates this.
  fn keys(
    &self,
    metric: Metric,
  ) -> impl Future<Output = Result<Vec<SubjectId>, Self::Error>> + Send + '_;

  /// Remove a key, e.g. after its delta has been folded into the ledger.
  fn remove(
    &self,
    subject: SubjectId,
    metric: Metric,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
