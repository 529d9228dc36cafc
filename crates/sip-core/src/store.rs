//! The `RankingStore` trait.
//!
//! Implemented by storage backends (e.g. `sip-store-sqlite`). Higher layers
//! (`sip-api`, `sip-server`) depend on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  error::Classify,
  item::{Item, ItemPublicScore},
  rating::{
    Initialized, NewPreference, Opponent, PersonalRating, PreferenceOutcome,
    PreferenceRecord,
  },
  tier::Tier,
};

/// Abstraction over a sip ranking store backend.
///
/// A backend owns three kinds of state: the per-user rating rows (strictly
/// consistent, one writer per user at a time), the append-only preference
/// ledger, and the derived public scores (eventually consistent, last write
/// wins).
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RankingStore: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  // ── Catalog ───────────────────────────────────────────────────────────

  /// Register a rankable item.
  fn add_item(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Item, Self::Error>> + Send + '_;

  /// Retrieve an item by UUID. Returns `None` if not found.
  fn get_item(
    &self,
    item_id: Uuid,
  ) -> impl Future<Output = Result<Option<Item>, Self::Error>> + Send + '_;

  // ── Personal ratings ──────────────────────────────────────────────────

  /// Place `item_id` in the user's ranked list under `tier`.
  ///
  /// Idempotent: if the user already rates the item (in any tier) the
  /// existing record is returned unchanged with `created == false`. Fails if
  /// the item does not exist.
  fn initialize(
    &self,
    user_id: Uuid,
    item_id: Uuid,
    tier: Tier,
  ) -> impl Future<Output = Result<Initialized, Self::Error>> + Send + '_;

  /// Retrieve one personal rating. Returns `None` if the user has not
  /// ranked the item.
  fn get_rating(
    &self,
    user_id: Uuid,
    item_id: Uuid,
  ) -> impl Future<Output = Result<Option<PersonalRating>, Self::Error>> + Send + '_;

  /// The user's ranked list, best first, optionally restricted to one tier.
  fn list_ratings(
    &self,
    user_id: Uuid,
    tier: Option<Tier>,
  ) -> impl Future<Output = Result<Vec<PersonalRating>, Self::Error>> + Send + '_;

  /// Pick an opponent for `focal_item_id` among the user's other items in
  /// `tier`.
  ///
  /// Fails with a not-found error if the focal item is not ranked in that
  /// tier, and with an exhausted-candidates error if nothing else is.
  fn select_opponent(
    &self,
    user_id: Uuid,
    focal_item_id: Uuid,
    tier: Tier,
  ) -> impl Future<Output = Result<Opponent, Self::Error>> + Send + '_;

  /// Apply one pairwise judgment: update both ratings, bump both comparison
  /// counts, append a ledger entry and refresh both public scores.
  ///
  /// The read-modify-write of the two rating rows is atomic with respect to
  /// other judgments by the same user.
  fn record_preference(
    &self,
    input: NewPreference,
  ) -> impl Future<Output = Result<PreferenceOutcome, Self::Error>> + Send + '_;

  // ── Ledger ────────────────────────────────────────────────────────────

  /// All judgments recorded by the user, oldest first.
  fn list_preferences(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<PreferenceRecord>, Self::Error>> + Send + '_;

  // ── Public scores ─────────────────────────────────────────────────────

  /// Recompute an item's public score from every user's rating of it,
  /// replacing whatever was stored. `None` means nobody has rated it.
  fn refresh_public_score(
    &self,
    item_id: Uuid,
  ) -> impl Future<Output = Result<Option<ItemPublicScore>, Self::Error>> + Send + '_;

  /// The last computed public score, if any.
  fn get_public_score(
    &self,
    item_id: Uuid,
  ) -> impl Future<Output = Result<Option<ItemPublicScore>, Self::Error>> + Send + '_;
}
