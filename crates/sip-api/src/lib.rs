//! JSON REST API for sip.
//!
//! Exposes an axum [`Router`] backed by any [`sip_core::store::RankingStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility; the
//! acting user is taken from the path.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", sip_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod items;
pub mod preferences;
pub mod ratings;
pub mod view;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use sip_core::store::RankingStore;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: RankingStore + 'static,
{
  Router::new()
    // Catalog
    .route("/items", post(items::create::<S>))
    .route("/items/{id}", get(items::get_one::<S>))
    .route("/items/{id}/refresh", post(items::refresh::<S>))
    // Personal ranking
    .route(
      "/users/{user_id}/ratings",
      get(ratings::list::<S>).post(ratings::initialize::<S>),
    )
    .route("/users/{user_id}/ratings/{item_id}", get(ratings::get_one::<S>))
    .route("/users/{user_id}/opponent", post(ratings::opponent::<S>))
    // Ledger
    .route(
      "/users/{user_id}/preferences",
      get(preferences::list::<S>).post(preferences::record::<S>),
    )
    .layer(TraceLayer::new_for_http())
    .with_state(store)
}
