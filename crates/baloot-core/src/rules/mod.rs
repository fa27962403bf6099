//! Trick-taking rules: which cards may be played and who takes a trick.
//!
//! - `legality`: legal-move sets and play validation with violation reasons.
//! - `resolve`: card strength, partial-trick winners and full trick resolution.

mod legality;
mod resolve;

pub use legality::{check_play, legal_moves, legal_moves_with_winner};
pub use resolve::{card_strength, current_winner, resolve_trick};

use crate::model::card::Card;
use crate::model::player::Seat;
use crate::model::suit::Suit;
use crate::model::trick::TrickError;
use thiserror::Error;

/// Broken preconditions. The engine refuses to guess when it sees one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("hand is empty")]
    EmptyHand,
    #[error("trick already holds four plays")]
    TrickComplete,
    #[error("trick has {plays} plays; four are required to resolve it")]
    IncompleteTrick { plays: usize },
    #[error("card {0} appears more than once")]
    DuplicateCard(Card),
}

/// Why a proposed card is not among the legal moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlayViolation {
    #[error("{0} is not in hand")]
    NotInHand(Card),
    #[error("must follow the led suit {suit}")]
    MustFollowSuit { suit: Suit },
    #[error("must play a trump stronger than {to_beat}")]
    MustOvertrump { to_beat: Card },
    #[error("must play trump ({trump})")]
    MustTrump { trump: Suit },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayError {
    #[error(transparent)]
    Rule(#[from] RuleError),
    #[error("illegal play: {0}")]
    Illegal(#[from] PlayViolation),
    #[error(transparent)]
    Trick(#[from] TrickError),
    #[error("expected {expected} to play next but got {actual}")]
    OutOfTurn { expected: Seat, actual: Seat },
    #[error("hand is already complete")]
    HandComplete,
}
