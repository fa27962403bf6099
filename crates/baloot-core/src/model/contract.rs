use crate::model::suit::Suit;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Abnat awarded to the winner of the eighth trick.
pub const LAST_TRICK_BONUS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Sun,
    Hokum,
}

impl Mode {
    /// Raw abnat shared by both teams over a full hand, last-trick bonus included.
    pub const fn pool_abnat(self) -> u32 {
        match self {
            Mode::Sun => 130,
            Mode::Hokum => 162,
        }
    }

    /// Game points shared by both teams when nobody sweeps.
    pub const fn pool_points(self) -> u32 {
        match self {
            Mode::Sun => 26,
            Mode::Hokum => 16,
        }
    }

    /// Base awarded to a team that takes every trick.
    pub const fn kaboot_points(self) -> u32 {
        match self {
            Mode::Sun => 44,
            Mode::Hokum => 25,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Mode::Sun => "sun",
            Mode::Hokum => "hokum",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sun" => Ok(Mode::Sun),
            "hokum" => Ok(Mode::Hokum),
            _ => Err(()),
        }
    }
}

/// The game mode together with its trump suit. Hokum always names a trump
/// suit and Sun never does, so the pair cannot disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Contract {
    mode: Mode,
    trump: Option<Suit>,
}

impl Contract {
    pub const fn sun() -> Self {
        Self {
            mode: Mode::Sun,
            trump: None,
        }
    }

    pub const fn hokum(trump: Suit) -> Self {
        Self {
            mode: Mode::Hokum,
            trump: Some(trump),
        }
    }

    pub const fn mode(self) -> Mode {
        self.mode
    }

    pub const fn trump(self) -> Option<Suit> {
        self.trump
    }

    pub const fn is_hokum(self) -> bool {
        matches!(self.mode, Mode::Hokum)
    }

    pub const fn pool_abnat(self) -> u32 {
        self.mode.pool_abnat()
    }

    pub const fn pool_points(self) -> u32 {
        self.mode.pool_points()
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.trump {
            Some(trump) => write!(f, "{}({})", self.mode, trump),
            None => write!(f, "{}", self.mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Contract, LAST_TRICK_BONUS, Mode};
    use crate::model::card::Card;
    use crate::model::card_set::CardSet;
    use crate::model::suit::Suit;

    fn deck_abnat(contract: Contract) -> u32 {
        CardSet::FULL.iter().map(|c: Card| c.abnat(contract)).sum()
    }

    #[test]
    fn pools_match_card_tables() {
        let sun = Contract::sun();
        assert_eq!(deck_abnat(sun) + LAST_TRICK_BONUS, sun.pool_abnat());
        for trump in Suit::ALL {
            let hokum = Contract::hokum(trump);
            assert_eq!(deck_abnat(hokum) + LAST_TRICK_BONUS, hokum.pool_abnat());
        }
    }

    #[test]
    fn sun_has_no_trump() {
        assert_eq!(Contract::sun().trump(), None);
        assert_eq!(Contract::hokum(Suit::Clubs).trump(), Some(Suit::Clubs));
        assert_eq!(Contract::hokum(Suit::Clubs).to_string(), "hokum(C)");
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("SUN".parse::<Mode>(), Ok(Mode::Sun));
        assert_eq!("hokum".parse::<Mode>(), Ok(Mode::Hokum));
        assert!("bridge".parse::<Mode>().is_err());
    }
}
