//! Adaptive Elo-style rating math on a compressed 1–10 scale.
//!
//! Everything here is a pure function of its arguments.

use crate::tier::Tier;

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 10.0;

/// Logistic divisor. A 3-point gap gives roughly 10:1 expected odds, which is
/// what 400 points does on the chess scale.
pub const SCALE: f64 = 3.0;

/// Per-comparison decay of the K-factor.
pub const K_DECAY: f64 = 0.1;

/// Starting rating of the first item placed in an empty tier.
pub const INITIAL_RATING: f64 = 10.0;
/// Each later addition to the same tier starts this much lower...
pub const INITIAL_STEP: f64 = 0.1;
/// ...but never below this.
pub const INITIAL_FLOOR: f64 = 5.0;

/// Probability that an item rated `rating_a` is preferred over one rated
/// `rating_b`.
pub fn expected_outcome(rating_a: f64, rating_b: f64) -> f64 {
  1.0 / (1.0 + 10f64.powf((rating_b - rating_a) / SCALE))
}

/// Maximum single-update adjustment for an item in `tier` that has already
/// taken part in `comparisons` judgments.
pub fn k_factor(tier: Tier, comparisons: u32) -> f64 {
  tier.base_k() / (1.0 + K_DECAY * f64::from(comparisons))
}

pub fn clamp_rating(rating: f64) -> f64 { rating.clamp(MIN_RATING, MAX_RATING) }

/// Round half away from zero to one decimal place.
pub fn round_tenth(value: f64) -> f64 { (value * 10.0).round() / 10.0 }

/// Starting rating for a new item when the user already has `tier_count`
/// items in the same tier.
pub fn initial_rating(tier_count: usize) -> f64 {
  let raw = INITIAL_RATING - INITIAL_STEP * tier_count as f64;
  round_tenth(raw.max(INITIAL_FLOOR))
}

/// New ratings after one judgment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairUpdate {
  pub winner: f64,
  pub loser:  f64,
}

/// Apply one pairwise judgment.
///
/// Each side uses the K-factor of its own comparison count, so a veteran
/// item shifts less than a newcomer within the same judgment. Both results
/// are clamped to `[MIN_RATING, MAX_RATING]`.
pub fn update_pair(
  winner_rating: f64,
  loser_rating: f64,
  winner_comparisons: u32,
  loser_comparisons: u32,
  tier: Tier,
) -> PairUpdate {
  let expected_winner = expected_outcome(winner_rating, loser_rating);
  let expected_loser = expected_outcome(loser_rating, winner_rating);

  let winner_k = k_factor(tier, winner_comparisons);
  let loser_k = k_factor(tier, loser_comparisons);

  PairUpdate {
    winner: clamp_rating(winner_rating + winner_k * (1.0 - expected_winner)),
    loser:  clamp_rating(loser_rating + loser_k * (0.0 - expected_loser)),
  }
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator as _;

  use super::*;

  const EPS: f64 = 1e-12;

  fn grid() -> impl Iterator<Item = f64> {
    (10..=100).step_by(3).map(|x| f64::from(x) / 10.0)
  }

  #[test]
  fn expected_outcomes_are_complementary() {
    for a in grid() {
      for b in grid() {
        let sum = expected_outcome(a, b) + expected_outcome(b, a);
        assert!((sum - 1.0).abs() < EPS, "a={a} b={b} sum={sum}");
      }
    }
  }

  #[test]
  fn expected_outcome_even_and_ten_to_one() {
    assert!((expected_outcome(7.0, 7.0) - 0.5).abs() < EPS);
    // A 3-point gap is 10:1 odds.
    let p = expected_outcome(8.0, 5.0);
    assert!((p / (1.0 - p) - 10.0).abs() < 1e-9);
  }

  #[test]
  fn k_factor_positive_and_strictly_decreasing() {
    for tier in Tier::iter() {
      let mut prev = f64::INFINITY;
      for comparisons in 0..500 {
        let k = k_factor(tier, comparisons);
        assert!(k > 0.0);
        assert!(k < prev, "{tier} at {comparisons}");
        prev = k;
      }
    }
  }

  #[test]
  fn k_factor_tier_bases() {
    assert_eq!(k_factor(Tier::Loved, 0), 1.5);
    assert_eq!(k_factor(Tier::Liked, 0), 1.0);
    assert_eq!(k_factor(Tier::Disliked, 0), 0.6);
    assert!((k_factor(Tier::Liked, 10) - 0.5).abs() < EPS);
  }

  #[test]
  fn winner_rises_loser_falls() {
    let up = update_pair(6.0, 6.5, 3, 4, Tier::Liked);
    assert!(up.winner > 6.0);
    assert!(up.loser < 6.5);
  }

  #[test]
  fn veteran_moves_less_than_newcomer() {
    // Equal ratings, so both sides see the same expected outcome.
    let up = update_pair(7.0, 7.0, 0, 40, Tier::Loved);
    let winner_shift = up.winner - 7.0;
    let loser_shift = 7.0 - up.loser;
    assert!(winner_shift > loser_shift);
  }

  #[test]
  fn clamped_at_boundaries() {
    let up = update_pair(10.0, 1.0, 0, 0, Tier::Loved);
    assert_eq!(up.winner, MAX_RATING);
    assert_eq!(up.loser, MIN_RATING);
  }

  #[test]
  fn repeated_updates_stay_in_range() {
    let (mut a, mut b) = (5.5, 5.5);
    for round in 0..5_000 {
      let up = update_pair(a, b, 0, 0, Tier::Loved);
      a = up.winner;
      b = up.loser;
      assert!((MIN_RATING..=MAX_RATING).contains(&a), "round {round}: {a}");
      assert!((MIN_RATING..=MAX_RATING).contains(&b), "round {round}: {b}");
    }
    assert_eq!(a, MAX_RATING);
    assert_eq!(b, MIN_RATING);
  }

  #[test]
  fn update_is_deterministic() {
    let first = update_pair(8.3, 4.1, 2, 9, Tier::Disliked);
    for _ in 0..10 {
      assert_eq!(update_pair(8.3, 4.1, 2, 9, Tier::Disliked), first);
    }
  }

  #[test]
  fn initial_rating_steps_down_to_floor() {
    assert_eq!(initial_rating(0), 10.0);
    assert_eq!(initial_rating(1), 9.9);
    assert_eq!(initial_rating(3), 9.7);
    assert_eq!(initial_rating(50), 5.0);
    assert_eq!(initial_rating(51), 5.0);
    assert_eq!(initial_rating(500), 5.0);
  }

  #[test]
  fn round_tenth_rounds_rather_than_truncates() {
    assert_eq!(round_tenth(9.96), 10.0);
    assert_eq!(round_tenth(9.94), 9.9);
    assert_eq!(round_tenth(4.25), 4.3);
  }
}
