use crate::model::contract::Contract;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const COUNT: usize = 32;

    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// Stable index in `0..32`: `suit * 8 + rank offset`.
    pub const fn id(self) -> u8 {
        (self.suit as u8) * 8 + self.rank.offset()
    }

    pub const fn from_id(id: u8) -> Option<Self> {
        let suit = match Suit::from_index((id / 8) as usize) {
            Some(suit) => suit,
            None => return None,
        };
        match Rank::from_offset(id % 8) {
            Some(rank) => Some(Card::new(rank, suit)),
            None => None,
        }
    }

    pub fn is_trump(self, contract: Contract) -> bool {
        contract.trump() == Some(self.suit)
    }

    pub fn abnat(self, contract: Contract) -> u32 {
        if self.is_trump(contract) {
            self.rank.trump_abnat()
        } else {
            self.rank.plain_abnat()
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCardError(pub String);

impl fmt::Display for ParseCardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid card '{}'", self.0)
    }
}

impl std::error::Error for ParseCardError {}

impl FromStr for Card {
    type Err = ParseCardError;

    /// Parses the display form, e.g. `"AS"`, `"10H"`, `"7c"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let split = text
            .char_indices()
            .last()
            .map(|(idx, _)| idx)
            .filter(|idx| *idx > 0)
            .ok_or_else(|| ParseCardError(s.to_string()))?;
        let (rank, suit) = text.split_at(split);
        let rank = rank
            .parse::<Rank>()
            .map_err(|_| ParseCardError(s.to_string()))?;
        let suit = suit
            .parse::<Suit>()
            .map_err(|_| ParseCardError(s.to_string()))?;
        Ok(Card::new(rank, suit))
    }
}
