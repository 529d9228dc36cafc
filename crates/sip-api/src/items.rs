//! Handlers for `/items` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/items` | Body: `{"name":"..."}`; returns 201 + item |
//! | `GET`  | `/items/:id` | Item with its public score |
//! | `POST` | `/items/:id/refresh` | Recompute the public score |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use sip_core::store::RankingStore;
use uuid::Uuid;

use crate::{
  error::ApiError,
  view::{ItemView, ScoreView},
};

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name: String,
}

/// `POST /items`: body `{"name":"Cortado"}`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RankingStore,
{
  let item = store.add_item(body.name).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(ItemView::new(item, None))))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /items/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ItemView>, ApiError>
where
  S: RankingStore,
{
  let item = store
    .get_item(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("item {id} not found")))?;
  let score = store.get_public_score(id).await.map_err(ApiError::store)?;
  Ok(Json(ItemView::new(item, score)))
}

// ─── Refresh ──────────────────────────────────────────────────────────────────

/// `POST /items/:id/refresh`: returns the fresh score, or `null` when
/// nobody has ranked the item yet.
pub async fn refresh<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Option<ScoreView>>, ApiError>
where
  S: RankingStore,
{
  let score = store
    .refresh_public_score(id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(score.map(ScoreView::from)))
}
