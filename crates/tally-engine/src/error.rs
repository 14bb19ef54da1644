//! Error type for `tally-engine`.
//!
//! Only failures that affect durable correctness surface here. Cache
//! failures never do; they are logged and swallowed at the call site
//! because the ledger stays correct without the cache.

use thiserror::Error;

use tally_core::metric::SubjectId;

#[derive(Debug, Error)]
pub enum Error {
  #[error("subject not found: {0}")]
  SubjectNotFound(SubjectId),

  /// The ledger transaction failed; rolled back in full, retryable.
  #[error("ledger error: {0}")]
  Ledger(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn ledger<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Error::Ledger(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
