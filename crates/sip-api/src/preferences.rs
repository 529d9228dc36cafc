//! Handlers for `/users/:user_id/preferences`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users/:user_id/preferences` | Body: [`PreferenceBody`]; returns 201 + both updated ratings |
//! | `GET`  | `/users/:user_id/preferences` | The user's ledger, oldest first |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use sip_core::{
  Tier,
  rating::{NewPreference, PreferenceRecord},
  store::RankingStore,
};
use uuid::Uuid;

use crate::{error::ApiError, view::OutcomeView};

#[derive(Debug, Deserialize)]
pub struct PreferenceBody {
  pub preferred_item_id: Uuid,
  pub rejected_item_id:  Uuid,
  pub tier:              String,
}

/// `POST /users/:user_id/preferences`
pub async fn record<S>(
  State(store): State<Arc<S>>,
  Path(user_id): Path<Uuid>,
  Json(body): Json<PreferenceBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RankingStore,
{
  let input = NewPreference {
    user_id,
    preferred_item_id: body.preferred_item_id,
    rejected_item_id:  body.rejected_item_id,
    tier:              Tier::parse(&body.tier)?,
  };
  let outcome = store
    .record_preference(input)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(OutcomeView::from(outcome))))
}

/// `GET /users/:user_id/preferences`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<PreferenceRecord>>, ApiError>
where
  S: RankingStore,
{
  let ledger = store
    .list_preferences(user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(ledger))
}
