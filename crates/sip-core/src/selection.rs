//! Opponent selection for the next pairwise judgment.
//!
//! Rather than pairing uniformly at random, the pool is narrowed to the part
//! of the tier where the user's ordering most needs sharpening: the top of
//! `loved`, the bottom of `disliked`, the broad middle of `liked`.

use std::ops::Range;

use rand::Rng;

use crate::{rating::PersonalRating, tier::Tier};

/// Below this many candidates the pool is too small to stratify.
pub const MIN_STRATIFIED_POOL: usize = 4;

/// Index window into a pool of `n` candidates sorted by rating, descending.
///
/// - `Loved`: top quartile, `[0, ceil(n/4))`
/// - `Liked`: middle half, `[floor(n/4), ceil(3n/4))`
/// - `Disliked`: bottom quartile, `[floor(3n/4), n)`
pub fn candidate_window(tier: Tier, n: usize) -> Range<usize> {
  match tier {
    Tier::Loved => 0..n.div_ceil(4),
    Tier::Liked => n / 4..(3 * n).div_ceil(4),
    Tier::Disliked => (3 * n) / 4..n,
  }
}

/// Pick one opponent from `pool`, which must already exclude the focal item
/// and contain only rows from `tier`.
///
/// Returns `None` for an empty pool.
pub fn choose_opponent<'a, R>(
  pool: &'a [PersonalRating],
  tier: Tier,
  rng: &mut R,
) -> Option<&'a PersonalRating>
where
  R: Rng,
{
  if pool.is_empty() {
    return None;
  }

  if pool.len() < MIN_STRATIFIED_POOL {
    return Some(&pool[rng.random_range(0..pool.len())]);
  }

  let mut sorted: Vec<&PersonalRating> = pool.iter().collect();
  sorted.sort_by(|a, b| b.rating.total_cmp(&a.rating));

  let window = candidate_window(tier, sorted.len());
  let slice = if window.is_empty() {
    &sorted[..]
  } else {
    &sorted[window]
  };

  Some(slice[rng.random_range(0..slice.len())])
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use chrono::Utc;
  use rand::{SeedableRng, rngs::StdRng};
  use uuid::Uuid;

  use super::*;

  fn pool(tier: Tier, ratings: &[f64]) -> Vec<PersonalRating> {
    let user_id = Uuid::new_v4();
    ratings
      .iter()
      .map(|&rating| PersonalRating {
        user_id,
        item_id: Uuid::new_v4(),
        tier,
        rating,
        comparisons: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
      })
      .collect()
  }

  /// Every item id `choose_opponent` returns over many seeded draws.
  fn drawn(pool: &[PersonalRating], tier: Tier) -> HashSet<Uuid> {
    let mut rng = StdRng::seed_from_u64(7);
    (0..2_000)
      .map(|_| choose_opponent(pool, tier, &mut rng).unwrap().item_id)
      .collect()
  }

  fn ids_rated_at_least(pool: &[PersonalRating], min: f64) -> HashSet<Uuid> {
    pool.iter().filter(|r| r.rating >= min).map(|r| r.item_id).collect()
  }

  #[test]
  fn windows_for_twenty() {
    assert_eq!(candidate_window(Tier::Loved, 20), 0..5);
    assert_eq!(candidate_window(Tier::Liked, 20), 5..15);
    assert_eq!(candidate_window(Tier::Disliked, 20), 15..20);
  }

  #[test]
  fn windows_round_outward() {
    assert_eq!(candidate_window(Tier::Loved, 5), 0..2);
    assert_eq!(candidate_window(Tier::Liked, 5), 1..4);
    assert_eq!(candidate_window(Tier::Disliked, 5), 3..5);
  }

  #[test]
  fn windows_are_never_empty_from_four_up() {
    for n in MIN_STRATIFIED_POOL..200 {
      for tier in [Tier::Loved, Tier::Liked, Tier::Disliked] {
        assert!(!candidate_window(tier, n).is_empty(), "{tier} n={n}");
      }
    }
  }

  #[test]
  fn empty_pool_has_no_opponent() {
    let mut rng = StdRng::seed_from_u64(1);
    assert!(choose_opponent(&[], Tier::Liked, &mut rng).is_none());
  }

  #[test]
  fn three_candidates_use_uniform_draw() {
    // Under quartile logic `loved` would only ever offer the 9.0 item.
    let pool = pool(Tier::Loved, &[9.0, 5.0, 1.0]);
    assert_eq!(drawn(&pool, Tier::Loved).len(), 3);
  }

  #[test]
  fn four_candidates_use_quartiles() {
    let pool = pool(Tier::Loved, &[2.0, 9.0, 5.0, 1.0]);
    assert_eq!(drawn(&pool, Tier::Loved), ids_rated_at_least(&pool, 9.0));
  }

  #[test]
  fn loved_restricted_to_top_five_of_twenty() {
    let ratings: Vec<f64> = (1..=20).map(|x| f64::from(x) * 0.45).collect();
    let pool = pool(Tier::Loved, &ratings);
    let top_five = ids_rated_at_least(&pool, 16.0 * 0.45);
    assert_eq!(top_five.len(), 5);
    assert_eq!(drawn(&pool, Tier::Loved), top_five);
  }

  #[test]
  fn disliked_restricted_to_bottom_quartile() {
    let ratings: Vec<f64> = (1..=8).map(f64::from).collect();
    let pool = pool(Tier::Disliked, &ratings);
    let bottom: HashSet<Uuid> =
      pool.iter().filter(|r| r.rating <= 2.0).map(|r| r.item_id).collect();
    assert_eq!(drawn(&pool, Tier::Disliked), bottom);
  }

  #[test]
  fn liked_restricted_to_middle_half() {
    let ratings: Vec<f64> = (1..=8).map(f64::from).collect();
    let pool = pool(Tier::Liked, &ratings);
    let middle: HashSet<Uuid> = pool
      .iter()
      .filter(|r| (3.0..=6.0).contains(&r.rating))
      .map(|r| r.item_id)
      .collect();
    assert_eq!(drawn(&pool, Tier::Liked), middle);
  }
}
