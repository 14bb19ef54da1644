//! Background scheduler for the periodic-additive flush.
//!
//! One tokio task owns the timer and runs each pass inline, so two
//! passes can never overlap by construction; with
//! [`MissedTickBehavior::Skip`], a pass that overruns its interval
//! causes the next tick to be skipped rather than queued.

use std::{sync::Arc, time::Duration};

use tally_core::{counter::CounterStore, store::LedgerStore};
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::debug;

use crate::Engagement;

/// Default flush interval, matching the one-minute cadence the counter
/// columns were designed around.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(60);

/// Owner handle for the background flush task.
///
/// Dropping the handle aborts the task; any delta left in the cache at
/// that point is lost with the process, which the view metric accepts.
pub struct SchedulerHandle {
  task: JoinHandle<()>,
}

impl SchedulerHandle {
  /// Spawn the recurring flush task on the current tokio runtime.
  pub fn spawn<L, C>(engagement: Engagement<L, C>, interval: Duration) -> Self
  where
    L: LedgerStore + 'static,
    C: CounterStore + 'static,
  {
    let engagement = Arc::new(engagement);
    let task = tokio::spawn(async move {
      let mut ticker = tokio::time::interval(interval);
      ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
      // The first tick completes immediately; consume it so the first
      // real pass runs a full interval after startup.
      ticker.tick().await;

      loop {
        ticker.tick().await;
        debug!("flush tick");
        // Pass failures are logged inside; the loop always continues.
        engagement.flush_views().await;
      }
    });
    Self { task }
  }

  /// Stop the background task.
  pub fn shutdown(self) {
    self.task.abort();
  }
}

impl Drop for SchedulerHandle {
  fn drop(&mut self) {
    self.task.abort();
  }
}
