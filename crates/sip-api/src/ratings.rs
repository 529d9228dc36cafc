//! Handlers for a user's personal ranked list.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users/:user_id/ratings` | Body: [`InitBody`]; 201 when new, 200 when it already existed |
//! | `GET`  | `/users/:user_id/ratings` | Optional `?tier=loved\|liked\|disliked`; best first |
//! | `GET`  | `/users/:user_id/ratings/:item_id` | 404 if the user has not ranked it |
//! | `POST` | `/users/:user_id/opponent` | Body: [`OpponentBody`] |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use sip_core::{Tier, store::RankingStore};
use uuid::Uuid;

use crate::{
  error::ApiError,
  view::{OpponentView, RatingView},
};

// ─── Initialise ───────────────────────────────────────────────────────────────

/// Tiers arrive as plain strings so that an unknown value is reported as a
/// validation error rather than a body-shape rejection.
#[derive(Debug, Deserialize)]
pub struct InitBody {
  pub item_id: Uuid,
  pub tier:    String,
}

/// `POST /users/:user_id/ratings`: body `{"item_id":"...","tier":"loved"}`
pub async fn initialize<S>(
  State(store): State<Arc<S>>,
  Path(user_id): Path<Uuid>,
  Json(body): Json<InitBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RankingStore,
{
  let tier = Tier::parse(&body.tier)?;
  let init = store
    .initialize(user_id, body.item_id, tier)
    .await
    .map_err(ApiError::store)?;

  let status = if init.created {
    StatusCode::CREATED
  } else {
    StatusCode::OK
  };
  Ok((status, Json(RatingView::from(init.rating))))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub tier: Option<String>,
}

/// `GET /users/:user_id/ratings[?tier=<tier>]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(user_id): Path<Uuid>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<RatingView>>, ApiError>
where
  S: RankingStore,
{
  let tier = params.tier.as_deref().map(Tier::parse).transpose()?;
  let ratings = store
    .list_ratings(user_id, tier)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(ratings.into_iter().map(RatingView::from).collect()))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /users/:user_id/ratings/:item_id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path((user_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<RatingView>, ApiError>
where
  S: RankingStore,
{
  let rating = store
    .get_rating(user_id, item_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotRanked(format!("user {user_id} has not ranked item {item_id}"))
    })?;
  Ok(Json(rating.into()))
}

// ─── Opponent ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OpponentBody {
  pub item_id: Uuid,
  pub tier:    String,
}

/// `POST /users/:user_id/opponent`: body `{"item_id":"...","tier":"liked"}`
pub async fn opponent<S>(
  State(store): State<Arc<S>>,
  Path(user_id): Path<Uuid>,
  Json(body): Json<OpponentBody>,
) -> Result<Json<OpponentView>, ApiError>
where
  S: RankingStore,
{
  let tier = Tier::parse(&body.tier)?;
  let opponent = store
    .select_opponent(user_id, body.item_id, tier)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(opponent.into()))
}
