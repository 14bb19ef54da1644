//! Handlers for the engagement endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/subjects/:id/views` | Fire-and-forget; 204 |
//! | `POST` | `/subjects/:id/likes` | Body: `{"actor_id":7}` |
//! | `POST` | `/subjects/:id/scraps` | Body: `{"actor_id":7}` |
//! | `GET`  | `/subjects/:id/counts` | Ledger counts + unflushed views |
//! | `GET`  | `/subjects/:id/membership?actor_id=7` | Active-row flags |
//!
//! The actor id arrives as a trusted field; authentication happens
//! upstream of this router.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tally_core::{
  counter::CounterStore,
  membership::ToggleOutcome,
  metric::{ActorId, SubjectId},
  store::LedgerStore,
  subject::Counts,
};
use tally_engine::Engagement;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ToggleBody {
  pub actor_id: ActorId,
}

#[derive(Debug, Deserialize)]
pub struct MembershipParams {
  pub actor_id: ActorId,
}

#[derive(Debug, Serialize)]
pub struct MembershipResponse {
  pub liked:    bool,
  pub scrapped: bool,
}

/// `POST /subjects/:id/views`
pub async fn record_view<L, C>(
  State(engagement): State<Engagement<L, C>>,
  Path(id): Path<SubjectId>,
) -> Result<impl IntoResponse, ApiError>
where
  L: LedgerStore,
  C: CounterStore,
{
  engagement.record_view(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /subjects/:id/likes`
pub async fn toggle_like<L, C>(
  State(engagement): State<Engagement<L, C>>,
  Path(id): Path<SubjectId>,
  Json(body): Json<ToggleBody>,
) -> Result<Json<ToggleOutcome>, ApiError>
where
  L: LedgerStore,
  C: CounterStore,
{
  let outcome = engagement.toggle_like(body.actor_id, id).await?;
  Ok(Json(outcome))
}

/// `POST /subjects/:id/scraps`
pub async fn toggle_scrap<L, C>(
  State(engagement): State<Engagement<L, C>>,
  Path(id): Path<SubjectId>,
  Json(body): Json<ToggleBody>,
) -> Result<Json<ToggleOutcome>, ApiError>
where
  L: LedgerStore,
  C: CounterStore,
{
  let outcome = engagement.toggle_scrap(body.actor_id, id).await?;
  Ok(Json(outcome))
}

/// `GET /subjects/:id/counts`
pub async fn current_counts<L, C>(
  State(engagement): State<Engagement<L, C>>,
  Path(id): Path<SubjectId>,
) -> Result<Json<Counts>, ApiError>
where
  L: LedgerStore,
  C: CounterStore,
{
  let counts = engagement.current_counts(id).await?;
  Ok(Json(counts))
}

/// `GET /subjects/:id/membership?actor_id=<id>`
pub async fn membership<L, C>(
  State(engagement): State<Engagement<L, C>>,
  Path(id): Path<SubjectId>,
  Query(params): Query<MembershipParams>,
) -> Result<Json<MembershipResponse>, ApiError>
where
  L: LedgerStore,
  C: CounterStore,
{
  let flags = engagement.membership(params.actor_id, id).await?;
  Ok(Json(MembershipResponse {
    liked:    flags.liked,
    scrapped: flags.scrapped,
  }))
}
