//! Error types for `sip-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::tier::Tier;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid tier: {0:?} (expected loved, liked or disliked)")]
  InvalidTier(String),

  #[error("cannot compare item {0} with itself")]
  SelfComparison(Uuid),

  #[error("item not found: {0}")]
  ItemNotFound(Uuid),

  #[error("user {user_id} has no {tier} rating for item {item_id}")]
  RatingNotFound {
    user_id: Uuid,
    item_id: Uuid,
    tier:    Tier,
  },

  #[error("user {user_id} has no other {tier} items to compare against")]
  NoCandidates { user_id: Uuid, tier: Tier },

  #[error("write conflict on ratings of user {user_id} after {attempts} attempts")]
  Conflict { user_id: Uuid, attempts: u32 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Classification ──────────────────────────────────────────────────────────

/// Coarse error category, independent of the storage backend.
///
/// None of these are fatal to the process; every one is scoped to a single
/// request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// Malformed input: bad tier, self-comparison. Never retried.
  Validation,
  /// The item or the per-user rating does not exist yet.
  NotFound,
  /// The user has no other item in the tier to compare against.
  ExhaustedCandidates,
  /// Concurrent writes on one user's ratings could not be serialised.
  ConsistencyFault,
  /// Anything else (I/O, corrupt rows).
  Internal,
}

/// Implemented by every error type a [`crate::store::RankingStore`] can
/// return, so outer layers can react without knowing the backend.
pub trait Classify {
  fn kind(&self) -> ErrorKind;

  /// Whether the caller can recover by initialising a rating first. True
  /// for a missing per-user rating and for an empty tier, never for a
  /// missing catalog item.
  fn needs_initialize(&self) -> bool { false }
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Self::InvalidTier(_) | Self::SelfComparison(_) => ErrorKind::Validation,
      Self::ItemNotFound(_) | Self::RatingNotFound { .. } => ErrorKind::NotFound,
      Self::NoCandidates { .. } => ErrorKind::ExhaustedCandidates,
      Self::Conflict { .. } => ErrorKind::ConsistencyFault,
    }
  }

  fn needs_initialize(&self) -> bool {
    matches!(self, Self::RatingNotFound { .. } | Self::NoCandidates { .. })
  }
}
