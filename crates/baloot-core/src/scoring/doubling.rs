use super::ScoreError;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Flat award for a hand played at the Gahwa level.
pub const GAHWA_POINTS: u32 = 152;

/// Escalation level agreed during bidding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Doubling {
    #[default]
    Normal,
    Double,
    Triple,
    Quadruple,
    Gahwa,
}

impl Doubling {
    /// Level 0 and 1 both mean an undoubled hand.
    pub fn from_level(level: u8) -> Result<Self, ScoreError> {
        match level {
            0 | 1 => Ok(Doubling::Normal),
            2 => Ok(Doubling::Double),
            3 => Ok(Doubling::Triple),
            4 => Ok(Doubling::Quadruple),
            5 => Ok(Doubling::Gahwa),
            other => Err(ScoreError::InvalidDoubling(other)),
        }
    }

    /// `None` for Gahwa, which awards [`GAHWA_POINTS`] instead of multiplying.
    pub const fn multiplier(self) -> Option<u32> {
        match self {
            Doubling::Normal => Some(1),
            Doubling::Double => Some(2),
            Doubling::Triple => Some(3),
            Doubling::Quadruple => Some(4),
            Doubling::Gahwa => None,
        }
    }

    pub const fn is_doubled(self) -> bool {
        !matches!(self, Doubling::Normal)
    }
}

impl fmt::Display for Doubling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.multiplier() {
            Some(m) => write!(f, "x{m}"),
            None => f.write_str("gahwa"),
        }
    }
}
