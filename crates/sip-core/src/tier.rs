//! The three qualitative buckets a user sorts items into.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::Error;

/// Fixed qualitative tier. Assigned once when the user first ranks an item
/// and never changed afterwards.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Tier {
  Loved,
  Liked,
  Disliked,
}

impl Tier {
  /// Base K-factor before experience decay. Stronger conviction moves
  /// ratings faster.
  pub fn base_k(self) -> f64 {
    match self {
      Self::Loved => 1.5,
      Self::Liked => 1.0,
      Self::Disliked => 0.6,
    }
  }

  /// Parse a tier from its wire form, mapping failures to
  /// [`Error::InvalidTier`].
  pub fn parse(s: &str) -> crate::Result<Self> {
    s.parse().map_err(|_| Error::InvalidTier(s.to_owned()))
  }
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator as _;

  use super::*;

  #[test]
  fn wire_names_are_lowercase() {
    let names: Vec<String> = Tier::iter().map(|t| t.to_string()).collect();
    assert_eq!(names, ["loved", "liked", "disliked"]);
    assert_eq!(Tier::Disliked.as_ref(), "disliked");
  }

  #[test]
  fn parse_rejects_unknown_and_miscased() {
    assert_eq!(Tier::parse("liked").unwrap(), Tier::Liked);
    assert!(matches!(Tier::parse("Loved"), Err(Error::InvalidTier(_))));
    assert!(matches!(Tier::parse("meh"), Err(Error::InvalidTier(_))));
    assert!(matches!(Tier::parse(""), Err(Error::InvalidTier(_))));
  }

  #[test]
  fn serde_matches_strum() {
    let json = serde_json::to_string(&Tier::Loved).unwrap();
    assert_eq!(json, "\"loved\"");
    let back: Tier = serde_json::from_str("\"disliked\"").unwrap();
    assert_eq!(back, Tier::Disliked);
  }
}
