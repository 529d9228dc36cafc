//! Per-user rating records and the append-only preference ledger entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, tier::Tier};

// ─── PersonalRating ──────────────────────────────────────────────────────────

/// One user's opinion of one item. Unique per `(user_id, item_id)`.
///
/// `rating` always lies in `[1, 10]` and `comparisons` only ever grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalRating {
  pub user_id:     Uuid,
  pub item_id:     Uuid,
  pub tier:        Tier,
  pub rating:      f64,
  pub comparisons: u32,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

/// Result of [`crate::store::RankingStore::initialize`].
#[derive(Debug, Clone)]
pub struct Initialized {
  pub rating:  PersonalRating,
  /// `false` when the record already existed and was returned unchanged.
  pub created: bool,
}

/// An opponent picked for the next pairwise judgment.
#[derive(Debug, Clone)]
pub struct Opponent {
  pub rating:       PersonalRating,
  /// Number of items the user has ranked across all tiers.
  pub ranked_total: usize,
}

// ─── Preferences ─────────────────────────────────────────────────────────────

/// Input to [`crate::store::RankingStore::record_preference`].
#[derive(Debug, Clone, Copy)]
pub struct NewPreference {
  pub user_id:           Uuid,
  pub preferred_item_id: Uuid,
  pub rejected_item_id:  Uuid,
  pub tier:              Tier,
}

impl NewPreference {
  /// Reject self-comparisons before touching storage.
  pub fn validate(&self) -> Result<()> {
    if self.preferred_item_id == self.rejected_item_id {
      return Err(Error::SelfComparison(self.preferred_item_id));
    }
    Ok(())
  }
}

/// A resolved pairwise judgment. Never updated or deleted once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceRecord {
  pub preference_id:     Uuid,
  pub user_id:           Uuid,
  pub preferred_item_id: Uuid,
  pub rejected_item_id:  Uuid,
  pub tier:              Tier,
  pub recorded_at:       DateTime<Utc>,
}

/// Both updated ratings plus the ledger entry written for the judgment.
#[derive(Debug, Clone)]
pub struct PreferenceOutcome {
  pub winner:     PersonalRating,
  pub loser:      PersonalRating,
  pub preference: PreferenceRecord,
}
