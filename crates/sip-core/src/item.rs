//! Catalog items and their derived public score.
//!
//! The catalog itself lives elsewhere; the engine only needs to know that an
//! item exists and where to publish its cross-user aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A rankable catalog entry (a drink).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
  pub item_id:    Uuid,
  pub name:       String,
  pub created_at: DateTime<Utc>,
}

/// The cross-user aggregate for one item. Never authoritative: always a
/// full reduction over every user's [`crate::rating::PersonalRating`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemPublicScore {
  pub item_id:        Uuid,
  /// Arithmetic mean of all personal ratings for the item.
  pub average_rating: f64,
  /// Number of users contributing to `average_rating`.
  pub total_ratings:  u32,
  pub refreshed_at:   DateTime<Utc>,
}

impl ItemPublicScore {
  /// Fold a set of personal ratings into a score. Returns `None` when no
  /// user has rated the item: an absent score, not a zero one.
  pub fn reduce(
    item_id: Uuid,
    ratings: impl IntoIterator<Item = f64>,
    refreshed_at: DateTime<Utc>,
  ) -> Option<Self> {
    let (sum, count) = ratings
      .into_iter()
      .fold((0.0_f64, 0_u32), |(sum, count), r| (sum + r, count + 1));

    if count == 0 {
      return None;
    }

    Some(Self {
      item_id,
      average_rating: sum / f64::from(count),
      total_ratings: count,
      refreshed_at,
    })
  }
}
