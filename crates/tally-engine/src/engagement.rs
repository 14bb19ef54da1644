//! [`Engagement`] — toggle orchestration and both reconciliation
//! policies.

use std::{sync::Arc, time::Duration};

use tally_core::{
  counter::CounterStore,
  membership::ToggleOutcome,
  metric::{ActorId, MembershipMetric, Metric, SubjectId},
  store::LedgerStore,
  subject::Counts,
};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::{Error, Result};

/// Default per-subject ledger-operation timeout inside the flush pass.
pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(5);

// ─── Service ─────────────────────────────────────────────────────────────────

/// The engagement service, generic over ledger and cache backends.
///
/// Cloning is cheap; both backends sit behind `Arc`s.
pub struct Engagement<L, C> {
  ledger:     Arc<L>,
  counters:   Arc<C>,
  op_timeout: Duration,
}

impl<L, C> Clone for Engagement<L, C> {
  fn clone(&self) -> Self {
    Self {
      ledger:     Arc::clone(&self.ledger),
      counters:   Arc::clone(&self.counters),
      op_timeout: self.op_timeout,
    }
  }
}

/// Active-membership flags for one `(actor, subject)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MembershipFlags {
  pub liked:    bool,
  pub scrapped: bool,
}

/// Summary of one periodic-additive flush pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
  /// Deltas folded into the ledger and cleared from the cache.
  pub flushed:  usize,
  /// Keys whose subject no longer exists; delta logged and dropped.
  pub orphaned: usize,
  /// Subjects skipped because of a ledger failure or timeout; their
  /// deltas stay cached and are retried on the next pass.
  pub failed:   usize,
}

impl<L, C> Engagement<L, C>
where
  L: LedgerStore,
  C: CounterStore,
{
  pub fn new(ledger: Arc<L>, counters: Arc<C>) -> Self {
    Self { ledger, counters, op_timeout: DEFAULT_OP_TIMEOUT }
  }

  /// Override the per-subject flush timeout.
  pub fn with_op_timeout(mut self, op_timeout: Duration) -> Self {
    self.op_timeout = op_timeout;
    self
  }

  /// Direct handle to the ledger backend, for the content CRUD that
  /// lives outside the engagement core.
  pub fn ledger(&self) -> &Arc<L> {
    &self.ledger
  }

  /// Direct handle to the counter cache backend.
  pub fn counters(&self) -> &Arc<C> {
    &self.counters
  }

  // ── Views ─────────────────────────────────────────────────────────────────

  /// Record one view: bump the cached delta and return immediately.
  ///
  /// The ledger is only consulted to reject unknown subjects; the
  /// durable `view_count` moves on the next flush pass. A cache failure
  /// loses at most this one view and is deliberately swallowed.
  pub async fn record_view(&self, subject: SubjectId) -> Result<()> {
    self
      .ledger
      .counts(subject)
      .await
      .map_err(Error::ledger)?
      .ok_or(Error::SubjectNotFound(subject))?;

    if let Err(e) = self.counters.increment(subject, Metric::Views).await {
      warn!(subject, error = %e, "view increment dropped, counter store unavailable");
    }
    Ok(())
  }

  // ── Toggles ───────────────────────────────────────────────────────────────

  /// Flip the actor's like on a subject.
  pub async fn toggle_like(
    &self,
    actor: ActorId,
    subject: SubjectId,
  ) -> Result<ToggleOutcome> {
    self.toggle(MembershipMetric::Likes, actor, subject).await
  }

  /// Flip the actor's scrap on a subject.
  pub async fn toggle_scrap(
    &self,
    actor: ActorId,
    subject: SubjectId,
  ) -> Result<ToggleOutcome> {
    self.toggle(MembershipMetric::Scraps, actor, subject).await
  }

  async fn toggle(
    &self,
    metric: MembershipMetric,
    actor: ActorId,
    subject: SubjectId,
  ) -> Result<ToggleOutcome> {
    let outcome = self
      .ledger
      .toggle(metric, actor, subject)
      .await
      .map_err(Error::ledger)?
      .ok_or(Error::SubjectNotFound(subject))?;

    // Immediate-absolute refresh: the ledger committed above, so the
    // cache may now advertise the new count. Never the other order.
    if let Err(e) = self
      .counters
      .put(subject, metric.metric(), outcome.count as i64)
      .await
    {
      warn!(
        subject,
        metric = metric.as_str(),
        error = %e,
        "cache refresh dropped after commit, counter store unavailable"
      );
    }

    debug!(
      subject,
      actor,
      metric = metric.as_str(),
      state = ?outcome.state,
      count = outcome.count,
      "toggle committed"
    );
    Ok(outcome)
  }

  /// The "did I already like/scrap this" check.
  pub async fn membership(
    &self,
    actor: ActorId,
    subject: SubjectId,
  ) -> Result<MembershipFlags> {
    let liked = self
      .ledger
      .membership(MembershipMetric::Likes, actor, subject)
      .await
      .map_err(Error::ledger)?;
    let scrapped = self
      .ledger
      .membership(MembershipMetric::Scraps, actor, subject)
      .await
      .map_err(Error::ledger)?;
    Ok(MembershipFlags { liked, scrapped })
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// Current counters for a subject: ledger values with any unflushed
  /// view delta folded in, so readers never see views lag a full
  /// flush interval behind.
  pub async fn current_counts(&self, subject: SubjectId) -> Result<Counts> {
    let mut counts = self
      .ledger
      .counts(subject)
      .await
      .map_err(Error::ledger)?
      .ok_or(Error::SubjectNotFound(subject))?;

    match self.counters.read(subject, Metric::Views).await {
      Ok(Some(delta)) => {
        counts.view_count = counts.view_count.saturating_add_signed(delta);
      }
      Ok(None) => {}
      Err(e) => {
        warn!(subject, error = %e, "serving ledger view count, counter store unavailable");
      }
    }
    Ok(counts)
  }

  // ── Periodic-additive flush ───────────────────────────────────────────────

  /// One reconciliation pass over all resident view deltas.
  ///
  /// Each subject is processed independently; failures and timeouts are
  /// logged and skipped so one bad row cannot stall the pass. A cache
  /// key is removed only after its ledger write commits — re-applying a
  /// delta after a crash over-counts, which is accepted, while clearing
  /// first could under-count, which is not.
  pub async fn flush_views(&self) -> FlushStats {
    let mut stats = FlushStats::default();

    let keys = match self.counters.keys(Metric::Views).await {
      Ok(keys) => keys,
      Err(e) => {
        warn!(error = %e, "flush pass aborted, counter store unavailable");
        return stats;
      }
    };

    for subject in keys {
      let delta = match self.counters.read(subject, Metric::Views).await {
        Ok(Some(delta)) => delta,
        // Gone or empty since enumeration; nothing to fold.
        Ok(None) => continue,
        Err(e) => {
          warn!(subject, error = %e, "flush read failed");
          stats.failed += 1;
          continue;
        }
      };

      if delta == 0 {
        self.clear_view_key(subject).await;
        continue;
      }

      match timeout(self.op_timeout, self.ledger.apply_view_delta(subject, delta)).await {
        Ok(Ok(Some(new_count))) => {
          self.clear_view_key(subject).await;
          debug!(subject, delta, new_count, "view delta flushed");
          stats.flushed += 1;
        }
        Ok(Ok(None)) => {
          // Subject deleted while the delta accumulated. The delta can
          // never be applied, so drop the key — but never silently.
          warn!(subject, delta, "dropping view delta for deleted subject");
          self.clear_view_key(subject).await;
          stats.orphaned += 1;
        }
        Ok(Err(e)) => {
          warn!(subject, delta, error = %e, "view flush failed, will retry next pass");
          stats.failed += 1;
        }
        Err(_) => {
          warn!(subject, delta, "view flush timed out, will retry next pass");
          stats.failed += 1;
        }
      }
    }

    if stats.flushed > 0 || stats.orphaned > 0 || stats.failed > 0 {
      info!(
        flushed = stats.flushed,
        orphaned = stats.orphaned,
        failed = stats.failed,
        "view flush pass complete"
      );
    }
    stats
  }

  async fn clear_view_key(&self, subject: SubjectId) {
    if let Err(e) = self.counters.remove(subject, Metric::Views).await {
      // The stale key re-applies its delta next pass: over-count drift,
      // never data loss.
      warn!(subject, error = %e, "failed to clear flushed view key");
    }
  }
}
