//! Handlers for `/subjects` content endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/subjects` | Body: `{"title":..., "body":...}`; 400 on blank title |
//! | `GET`  | `/subjects/:id` | 404 if not found |
//! | `PUT`  | `/subjects/:id` | Content edit; touches `updated_at` |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use tally_core::{
  counter::CounterStore,
  metric::SubjectId,
  store::LedgerStore,
  subject::{NewSubject, Subject},
};
use tally_engine::Engagement;

use crate::error::ApiError;

fn validate(input: &NewSubject) -> Result<(), ApiError> {
  if input.title.trim().is_empty() {
    return Err(ApiError::BadRequest("title must not be empty".to_string()));
  }
  Ok(())
}

/// `POST /subjects`
pub async fn create<L, C>(
  State(engagement): State<Engagement<L, C>>,
  Json(body): Json<NewSubject>,
) -> Result<impl IntoResponse, ApiError>
where
  L: LedgerStore,
  C: CounterStore,
{
  validate(&body)?;
  let subject = engagement
    .ledger()
    .create_subject(body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(subject)))
}

/// `GET /subjects/:id`
pub async fn get_one<L, C>(
  State(engagement): State<Engagement<L, C>>,
  Path(id): Path<SubjectId>,
) -> Result<Json<Subject>, ApiError>
where
  L: LedgerStore,
  C: CounterStore,
{
  let subject = engagement
    .ledger()
    .get_subject(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("subject {id} not found")))?;
  Ok(Json(subject))
}

/// `PUT /subjects/:id`
pub async fn update<L, C>(
  State(engagement): State<Engagement<L, C>>,
  Path(id): Path<SubjectId>,
  Json(body): Json<NewSubject>,
) -> Result<Json<Subject>, ApiError>
where
  L: LedgerStore,
  C: CounterStore,
{
  validate(&body)?;
  let subject = engagement
    .ledger()
    .update_content(id, body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("subject {id} not found")))?;
  Ok(Json(subject))
}
