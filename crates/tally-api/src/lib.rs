//! JSON REST API for the tally engagement backend.
//!
//! Exposes an axum [`Router`] backed by any
//! [`LedgerStore`](tally_core::store::LedgerStore) /
//! [`CounterStore`](tally_core::counter::CounterStore) pair. Auth, TLS,
//! and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", tally_api::api_router(engagement.clone()))
//! ```

pub mod engagement;
pub mod error;
pub mod subjects;

use axum::{
  Router,
  routing::{get, post},
};
use tally_core::{counter::CounterStore, store::LedgerStore};
use tally_engine::Engagement;

pub use error::ApiError;

/// Build a fully-materialised API router for `engagement`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<L, C>(engagement: Engagement<L, C>) -> Router<()>
where
  L: LedgerStore + 'static,
  C: CounterStore + 'static,
{
  Router::new()
    // Content
    .route("/subjects", post(subjects::create::<L, C>))
    .route(
      "/subjects/{id}",
      get(subjects::get_one::<L, C>).put(subjects::update::<L, C>),
    )
    // Engagement
    .route("/subjects/{id}/views", post(engagement::record_view::<L, C>))
    .route("/subjects/{id}/likes", post(engagement::toggle_like::<L, C>))
    .route("/subjects/{id}/scraps", post(engagement::toggle_scrap::<L, C>))
    .route("/subjects/{id}/counts", get(engagement::current_counts::<L, C>))
    .route("/subjects/{id}/membership", get(engagement::membership::<L, C>))
    .with_state(engagement)
}

// ─── Integration tests ───────────────────────────────────────────────────────
