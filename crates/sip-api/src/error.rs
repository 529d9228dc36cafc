//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use sip_core::{Classify, ErrorKind};
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  /// The user has not ranked the item yet; initialising it would help.
  #[error("not ranked: {0}")]
  NotRanked(String),

  #[error("{source}")]
  Store {
    kind:              ErrorKind,
    should_initialize: bool,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },
}

impl ApiError {
  /// Wrap a store error, remembering its classification.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Classify + Send + Sync + 'static,
  {
    Self::Store {
      kind:              e.kind(),
      should_initialize: e.needs_initialize(),
      source:            Box::new(e),
    }
  }
}

impl From<sip_core::Error> for ApiError {
  fn from(e: sip_core::Error) -> Self { Self::store(e) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let message = self.to_string();
    let (status, should_initialize) = match self {
      ApiError::NotFound(_) => (StatusCode::NOT_FOUND, false),
      ApiError::NotRanked(_) => (StatusCode::NOT_FOUND, true),
      ApiError::Store {
        kind,
        should_initialize,
        ..
      } => {
        let status = match kind {
          ErrorKind::Validation => StatusCode::BAD_REQUEST,
          ErrorKind::NotFound => StatusCode::NOT_FOUND,
          ErrorKind::ExhaustedCandidates => StatusCode::UNPROCESSABLE_ENTITY,
          ErrorKind::ConsistencyFault => StatusCode::SERVICE_UNAVAILABLE,
          ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, should_initialize)
      }
    };
    // The hint tells the client to initialise the item (or rank more
    // items) before asking again.
    let value = if should_initialize {
      json!({ "error": message, "should_initialize": true })
    } else {
      json!({ "error": message })
    };
    (status, Json(value)).into_response()
  }
}
