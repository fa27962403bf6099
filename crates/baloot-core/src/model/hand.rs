use crate::model::card::Card;
use crate::model::card_set::CardSet;
use crate::model::suit::Suit;

/// A seat's cards, always iterated in suit then rank order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hand {
    cards: CardSet,
}

impl Hand {
    pub fn new() -> Self {
        Self {
            cards: CardSet::EMPTY,
        }
    }

    pub fn with_cards(cards: impl IntoIterator<Item = Card>) -> Self {
        Self {
            cards: cards.into_iter().collect(),
        }
    }

    pub const fn from_set(cards: CardSet) -> Self {
        Self { cards }
    }

    /// Returns `false` if the card was already held.
    pub fn add(&mut self, card: Card) -> bool {
        self.cards.insert(card)
    }

    pub fn remove(&mut self, card: Card) -> bool {
        self.cards.remove(card)
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(card)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Card> + '_ {
        self.cards.iter()
    }

    pub fn set(&self) -> CardSet {
        self.cards
    }

    pub fn suit(&self, suit: Suit) -> CardSet {
        self.cards.suit(suit)
    }

    pub fn has_suit(&self, suit: Suit) -> bool {
        self.cards.has_suit(suit)
    }
}
