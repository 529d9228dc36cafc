//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, UUIDs as hyphenated lowercase
//! strings and tiers by their wire name. Ratings are native `REAL`s.

use chrono::{DateTime, Utc};
use sip_core::{
  Tier,
  item::{Item, ItemPublicScore},
  rating::{PersonalRating, PreferenceRecord},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Tier ─────────────────────────────────────────────────────────────────────

pub fn encode_tier(t: Tier) -> &'static str {
  match t {
    Tier::Loved => "loved",
    Tier::Liked => "liked",
    Tier::Disliked => "disliked",
  }
}

pub fn decode_tier(s: &str) -> Result<Tier> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown tier: {s:?}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from an `items` row.
pub struct RawItem {
  pub item_id:    String,
  pub name:       String,
  pub created_at: String,
}

impl RawItem {
  pub const COLUMNS: &'static str = "item_id, name, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      item_id:    row.get(0)?,
      name:       row.get(1)?,
      created_at: row.get(2)?,
    })
  }

  pub fn into_item(self) -> Result<Item> {
    Ok(Item {
      item_id:    decode_uuid(&self.item_id)?,
      name:       self.name,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `personal_ratings` row.
#[derive(Debug, Clone)]
pub struct RawRating {
  pub user_id:     String,
  pub item_id:     String,
  pub tier:        String,
  pub rating:      f64,
  pub comparisons: u32,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawRating {
  pub const COLUMNS: &'static str =
    "user_id, item_id, tier, rating, comparisons, created_at, updated_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:     row.get(0)?,
      item_id:     row.get(1)?,
      tier:        row.get(2)?,
      rating:      row.get(3)?,
      comparisons: row.get(4)?,
      created_at:  row.get(5)?,
      updated_at:  row.get(6)?,
    })
  }

  pub fn into_rating(self) -> Result<PersonalRating> {
    Ok(PersonalRating {
      user_id:     decode_uuid(&self.user_id)?,
      item_id:     decode_uuid(&self.item_id)?,
      tier:        decode_tier(&self.tier)?,
      rating:      self.rating,
      comparisons: self.comparisons,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `preferences` row.
pub struct RawPreference {
  pub preference_id:     String,
  pub user_id:           String,
  pub preferred_item_id: String,
  pub rejected_item_id:  String,
  pub tier:              String,
  pub recorded_at:       String,
}

impl RawPreference {
  pub const COLUMNS: &'static str = "preference_id, user_id, preferred_item_id, \
                                     rejected_item_id, tier, recorded_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      preference_id:     row.get(0)?,
      user_id:           row.get(1)?,
      preferred_item_id: row.get(2)?,
      rejected_item_id:  row.get(3)?,
      tier:              row.get(4)?,
      recorded_at:       row.get(5)?,
    })
  }

  pub fn into_preference(self) -> Result<PreferenceRecord> {
    Ok(PreferenceRecord {
      preference_id:     decode_uuid(&self.preference_id)?,
      user_id:           decode_uuid(&self.user_id)?,
      preferred_item_id: decode_uuid(&self.preferred_item_id)?,
      rejected_item_id:  decode_uuid(&self.rejected_item_id)?,
      tier:              decode_tier(&self.tier)?,
      recorded_at:       decode_dt(&self.recorded_at)?,
    })
  }
}

/// Raw values read directly from a `public_scores` row.
pub struct RawScore {
  pub item_id:        String,
  pub average_rating: f64,
  pub total_ratings:  u32,
  pub refreshed_at:   String,
}

impl RawScore {
  pub const COLUMNS: &'static str =
    "item_id, average_rating, total_ratings, refreshed_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      item_id:        row.get(0)?,
      average_rating: row.get(1)?,
      total_ratings:  row.get(2)?,
      refreshed_at:   row.get(3)?,
    })
  }

  pub fn into_score(self) -> Result<ItemPublicScore> {
    Ok(ItemPublicScore {
      item_id:        decode_uuid(&self.item_id)?,
      average_rating: self.average_rating,
      total_ratings:  self.total_ratings,
      refreshed_at:   decode_dt(&self.refreshed_at)?,
    })
  }
}
