use crate::model::card_set::CardSet;
use crate::model::contract::Contract;
use crate::model::deck::HAND_SIZE;
use crate::model::player::{Seat, Team};
use crate::model::trick::Trick;

/// Everything every seat at the table can see: the contract, the open trick
/// and the tricks already gathered. Private hands are never part of it.
#[derive(Debug, Clone, Copy)]
pub struct TableView<'a> {
    pub contract: Contract,
    pub bidder: Team,
    pub current_trick: &'a Trick,
    pub history: &'a [Trick],
}

impl<'a> TableView<'a> {
    pub fn new(
        contract: Contract,
        bidder: Team,
        current_trick: &'a Trick,
        history: &'a [Trick],
    ) -> Self {
        Self {
            contract,
            bidder,
            current_trick,
            history,
        }
    }

    pub fn tricks_completed(&self) -> usize {
        self.history.len()
    }

    pub fn next_to_play(&self) -> Seat {
        self.current_trick.next_seat()
    }

    /// Every card already on the table this hand, open trick included.
    pub fn played_cards(&self) -> CardSet {
        self.history
            .iter()
            .fold(self.current_trick.cards(), |acc, trick| acc.union(trick.cards()))
    }

    /// Cards `seat` must still hold, from tricks completed and whether it
    /// has already played to the open trick.
    pub fn hand_size(&self, seat: Seat) -> usize {
        let played_now = usize::from(self.current_trick.has_played(seat));
        HAND_SIZE.saturating_sub(self.tricks_completed() + played_now)
    }
}
