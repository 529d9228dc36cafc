//! Response bodies. Every rating leaves the API rounded to one decimal;
//! storage keeps full precision.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sip_core::{
  Tier,
  elo::round_tenth,
  item::{Item, ItemPublicScore},
  rating::{Opponent, PersonalRating, PreferenceOutcome, PreferenceRecord},
};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct RatingView {
  pub item_id:     Uuid,
  pub tier:        Tier,
  pub rating:      f64,
  pub comparisons: u32,
  pub updated_at:  DateTime<Utc>,
}

impl From<PersonalRating> for RatingView {
  fn from(r: PersonalRating) -> Self {
    Self {
      item_id:     r.item_id,
      tier:        r.tier,
      rating:      round_tenth(r.rating),
      comparisons: r.comparisons,
      updated_at:  r.updated_at,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct ScoreView {
  pub average_rating: f64,
  pub total_ratings:  u32,
  pub refreshed_at:   DateTime<Utc>,
}

impl From<ItemPublicScore> for ScoreView {
  fn from(s: ItemPublicScore) -> Self {
    Self {
      average_rating: round_tenth(s.average_rating),
      total_ratings:  s.total_ratings,
      refreshed_at:   s.refreshed_at,
    }
  }
}

/// An item with its public score; `public_score` is `null` until somebody
/// has ranked it.
#[derive(Debug, Serialize)]
pub struct ItemView {
  pub item_id:      Uuid,
  pub name:         String,
  pub created_at:   DateTime<Utc>,
  pub public_score: Option<ScoreView>,
}

impl ItemView {
  pub fn new(item: Item, score: Option<ItemPublicScore>) -> Self {
    Self {
      item_id:      item.item_id,
      name:         item.name,
      created_at:   item.created_at,
      public_score: score.map(ScoreView::from),
    }
  }
}

#[derive(Debug, Serialize)]
pub struct OpponentView {
  pub opponent:     RatingView,
  pub ranked_total: usize,
}

impl From<Opponent> for OpponentView {
  fn from(o: Opponent) -> Self {
    Self {
      opponent:     o.rating.into(),
      ranked_total: o.ranked_total,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct OutcomeView {
  pub preference: PreferenceRecord,
  pub winner:     RatingView,
  pub loser:      RatingView,
}

impl From<PreferenceOutcome> for OutcomeView {
  fn from(o: PreferenceOutcome) -> Self {
    Self {
      preference: o.preference,
      winner:     o.winner.into(),
      loser:      o.loser.into(),
    }
  }
}
