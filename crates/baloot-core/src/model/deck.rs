use crate::model::card::Card;
use crate::model::card_set::CardSet;
use crate::model::hand::Hand;
use crate::model::player::Seat;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::array;

pub const HAND_SIZE: usize = 8;

#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn standard() -> Self {
        Self {
            cards: CardSet::FULL.to_vec(),
        }
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::standard();
        deck.shuffle_in_place(rng);
        deck
    }

    pub fn shuffled_with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(&mut rng)
    }

    pub fn shuffle_in_place<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Deals eight cards to each seat in blocks, starting with `first`.
    pub fn deal(&self, first: Seat) -> [Hand; 4] {
        let mut hands = array::from_fn(|_| Hand::new());
        let order = first.rotation();
        for (chunk, seat) in self.cards.chunks(HAND_SIZE).zip(order) {
            for card in chunk {
                hands[seat.index()].add(*card);
            }
        }
        hands
    }
}

#[cfg(test)]
mod tests {
    use super::{Deck, HAND_SIZE};
    use crate::model::card_set::CardSet;
    use crate::model::player::Seat;

    #[test]
    fn standard_deck_has_32_unique_cards() {
        let deck = Deck::standard();
        assert_eq!(deck.cards().len(), 32);
        let set: CardSet = deck.cards().iter().copied().collect();
        assert_eq!(set, CardSet::FULL);
    }

    #[test]
    fn shuffle_with_seed_is_deterministic() {
        let deck_a = Deck::shuffled_with_seed(42);
        let deck_b = Deck::shuffled_with_seed(42);
        assert_eq!(deck_a.cards(), deck_b.cards());
        assert_ne!(deck_a.cards(), Deck::shuffled_with_seed(43).cards());
    }

    #[test]
    fn deal_gives_every_seat_eight_disjoint_cards() {
        let hands = Deck::shuffled_with_seed(7).deal(Seat::East);
        let mut all = CardSet::EMPTY;
        for hand in &hands {
            assert_eq!(hand.len(), HAND_SIZE);
            assert!(all.is_disjoint(hand.set()));
            all = all.union(hand.set());
        }
        assert_eq!(all, CardSet::FULL);
    }
}
