//! In-process implementation of the ephemeral counter cache.
//!
//! A single [`dashmap::DashMap`] keyed by `(metric, subject)`. Each
//! entry operation holds the map's shard lock for its key, which gives
//! the single-key atomicity the [`CounterStore`] contract requires
//! without any cross-key coordination.
//!
//! This is the assumed single logical ephemeral store: process-local,
//! lost on restart, rebuildable from the ledger.

use std::convert::Infallible;

use dashmap::DashMap;
use tally_core::{
  counter::CounterStore,
  metric::{Metric, SubjectId},
};

/// Ephemeral `(subject, metric) -> i64` store.
///
/// Cloning is cheap enough to avoid: the store is shared behind an
/// `Arc` by its owners, mirroring how the ledger handle is shared.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
  entries: DashMap<(Metric, SubjectId), i64>,
}

impl MemoryCounterStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn add(&self, subject: SubjectId, metric: Metric, amount: i64) {
    *self.entries.entry((metric, subject)).or_insert(0) += amount;
  }
}

impl CounterStore for MemoryCounterStore {
  type Error = Infallible;

  async fn increment(&self, subject: SubjectId, metric: Metric) -> Result<(), Infallible> {
    self.add(subject, metric, 1);
    Ok(())
  }

  async fn decrement(&self, subject: SubjectId, metric: Metric) -> Result<(), Infallible> {
    self.add(subject, metric, -1);
    Ok(())
  }

  async fn put(
    &self,
    subject: SubjectId,
    metric: Metric,
    value: i64,
  ) -> Result<(), Infallible> {
    self.entries.insert((metric, subject), value);
    Ok(())
  }

  async fn read(
    &self,
    subject: SubjectId,
    metric: Metric,
  ) -> Result<Option<i64>, Infallible> {
    Ok(self.entries.get(&(metric, subject)).map(|v| *v))
  }

  async fn keys(&self, metric: Metric) -> Result<Vec<SubjectId>, Infallible> {
    // Snapshot-at-call-time; concurrent inserts may or may not appear.
    Ok(
      self
        .entries
        .iter()
        .filter(|e| e.key().0 == metric)
        .map(|e| e.key().1)
        .collect(),
    )
  }

  async fn remove(&self, subject: SubjectId, metric: Metric) -> Result<(), Infallible> {
    self.entries.remove(&(metric, subject));
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use tally_core::{counter::CounterStore, metric::Metric};

  use crate::MemoryCounterStore;

  #[tokio::test]
  async fn absent_key_reads_as_none_not_zero() {
    let store = MemoryCounterStore::new();
    assert_eq!(store.read(1, Metric::Views).await.unwrap(), None);

    store.increment(1, Metric::Views).await.unwrap();
    assert_eq!(store.read(1, Metric::Views).await.unwrap(), Some(1));
  }

  #[tokio::test]
  async fn increment_and_decrement_accumulate() {
    let store = MemoryCounterStore::new();
    for _ in 0..5 {
      store.increment(7, Metric::Views).await.unwrap();
    }
    store.decrement(7, Metric::Views).await.unwrap();
    assert_eq!(store.read(7, Metric::Views).await.unwrap(), Some(4));
  }

  #[tokio::test]
  async fn put_overwrites_any_prior_value() {
    let store = MemoryCounterStore::new();
    store.increment(3, Metric::Likes).await.unwrap();
    store.put(3, Metric::Likes, 42).await.unwrap();
    assert_eq!(store.read(3, Metric::Likes).await.unwrap(), Some(42));
  }

  #[tokio::test]
  async fn keys_enumerates_only_the_requested_metric() {
    let store = MemoryCounterStore::new();
    store.increment(1, Metric::Views).await.unwrap();
    store.increment(2, Metric::Views).await.unwrap();
    store.put(1, Metric::Likes, 9).await.unwrap();

    let mut views = store.keys(Metric::Views).await.unwrap();
    views.sort();
    assert_eq!(views, vec![1, 2]);

    assert_eq!(store.keys(Metric::Scraps).await.unwrap(), Vec::<i64>::new());
  }

  #[tokio::test]
  async fn remove_makes_key_absent() {
    let store = MemoryCounterStore::new();
    store.increment(5, Metric::Views).await.unwrap();
    store.remove(5, Metric::Views).await.unwrap();
    assert_eq!(store.read(5, Metric::Views).await.unwrap(), None);
  }

  #[tokio::test]
  async fn concurrent_increments_lose_no_updates() {
    let store = Arc::new(MemoryCounterStore::new());
    let mut tasks = Vec::new();
    for _ in 0..8 {
      let store = Arc::clone(&store);
      tasks.push(tokio::spawn(async move {
        for _ in 0..250 {
          store.increment(99, Metric::Views).await.unwrap();
        }
      }));
    }
    for t in tasks {
      t.await.unwrap();
    }
    assert_eq!(store.read(99, Metric::Views).await.unwrap(), Some(2000));
  }
}
