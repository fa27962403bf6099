use crate::model::contract::Contract;
use crate::model::player::Seat;
use crate::model::suit::Suit;
use crate::model::table::TableView;
use crate::model::trick::Trick;
use crate::rules::current_winner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SuitMask(u8);

impl SuitMask {
    pub const EMPTY: Self = Self(0);

    pub fn contains(self, suit: Suit) -> bool {
        let bit = 1 << suit as u8;
        self.0 & bit != 0
    }

    pub fn with(mut self, suit: Suit) -> Self {
        let bit = 1 << suit as u8;
        self.0 |= bit;
        self
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Suits each seat is known to be out of, inferred from public play.
///
/// A seat that did not follow the led suit holds none of it. In Hokum, a
/// seat that discarded off-trump while void and while an opponent held the
/// trick holds no trump either, since it would have been forced to ruff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VoidTracker {
    voids: [SuitMask; 4],
}

impl VoidTracker {
    pub fn from_view(view: &TableView<'_>) -> Self {
        let mut tracker = Self::default();
        for trick in view.history {
            tracker.observe(trick, view.contract);
        }
        tracker.observe(view.current_trick, view.contract);
        tracker
    }

    pub fn void_mask(&self, seat: Seat) -> SuitMask {
        self.voids[seat.index()]
    }

    pub fn is_void(&self, seat: Seat, suit: Suit) -> bool {
        self.voids[seat.index()].contains(suit)
    }

    fn observe(&mut self, trick: &Trick, contract: Contract) {
        let Some(lead) = trick.lead_suit() else {
            return;
        };
        for (idx, play) in trick.plays().iter().enumerate().skip(1) {
            if play.card.suit == lead {
                continue;
            }
            let seat = play.seat;
            self.mark(seat, lead);

            let Some(trump) = contract.trump() else {
                continue;
            };
            if play.card.suit == trump {
                continue;
            }
            let before = Trick::from_plays(
                trick.leader(),
                &trick.plays()[..idx]
                    .iter()
                    .map(|p| p.card)
                    .collect::<Vec<_>>(),
            );
            let opponent_winning = before
                .ok()
                .and_then(|partial| current_winner(&partial, contract))
                .is_some_and(|best| best.seat.team() != seat.team());
            if opponent_winning {
                self.mark(seat, trump);
            }
        }
    }

    fn mark(&mut self, seat: Seat, suit: Suit) {
        let mask = &mut self.voids[seat.index()];
        *mask = mask.with(suit);
    }
}
