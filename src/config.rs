use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::piece::Side;

/// Variant rule switches. Defaults give the standard game; each can be turned
/// off to play with plainer movement.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
#[serde(default)]
pub struct Rules {
    /// King may leap two files sideways and one rank forward on its first move.
    pub king_leap: bool,
    /// Queen's first move is a two-rank forward leap instead of forward slides.
    pub queen_leap: bool,
    /// White pawns promote on this rank or beyond; Black mirrors it.
    pub white_promotion_rank: u8,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            king_leap: true,
            queen_leap: true,
            white_promotion_rank: 5,
        }
    }
}

impl Rules {
    pub fn from_json(text: &str) -> Result<Rules, ConfigError> {
        let rules: Rules = serde_json::from_str(text)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=7).contains(&self.white_promotion_rank) {
            return Err(ConfigError::InvalidPromotionRank(self.white_promotion_rank));
        }
        Ok(())
    }

    /// True when a pawn of `side` standing on `rank` must promote.
    pub fn in_promotion_zone(&self, side: Side, rank: u8) -> bool {
        match side {
            Side::White => rank >= self.white_promotion_rank,
            Side::Black => rank <= 7 - self.white_promotion_rank,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_zone_is_last_three_ranks() {
        let rules = Rules::default();
        assert!(!rules.in_promotion_zone(Side::White, 4));
        assert!(rules.in_promotion_zone(Side::White, 5));
        assert!(rules.in_promotion_zone(Side::White, 7));
        assert!(!rules.in_promotion_zone(Side::Black, 3));
        assert!(rules.in_promotion_zone(Side::Black, 2));
        assert!(rules.in_promotion_zone(Side::Black, 0));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let rules = Rules::from_json(r#"{ "king_leap": false }"#).unwrap();
        assert!(!rules.king_leap);
        assert!(rules.queen_leap);
        assert_eq!(rules.white_promotion_rank, 5);
    }

    #[test]
    fn rejects_bad_promotion_rank() {
        let err = Rules::from_json(r#"{ "white_promotion_rank": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPromotionRank(0)));
        assert!(matches!(Rules::from_json("not json"), Err(ConfigError::Parse(_))));
    }
}
