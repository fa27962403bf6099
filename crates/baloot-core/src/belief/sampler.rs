//! Determinization: dealing the unseen cards into one concrete world.

use super::voids::VoidTracker;
use crate::model::card::Card;
use crate::model::card_set::CardSet;
use crate::model::hand::Hand;
use crate::model::player::Seat;
use crate::model::table::TableView;
use rand::Rng;
use rand::seq::SliceRandom;
use std::array;
use thiserror::Error;

/// Attempts made before a void-respecting deal is given up on.
pub const DEFAULT_MAX_ATTEMPTS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoidHandling {
    /// Deal the unseen cards uniformly, ignoring what play revealed.
    #[default]
    Ignore,
    /// Never hand a seat a card of a suit it has shown out of.
    Respect,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SamplingError {
    #[error("card {0} is both in hand and already played")]
    DuplicateCard(Card),
    #[error("{seat} holds {found} cards but {expected} are expected")]
    HandSizeMismatch {
        seat: Seat,
        expected: usize,
        found: usize,
    },
    #[error("{available} unseen cards cannot fill {required} hidden slots")]
    PoolSizeMismatch { available: usize, required: usize },
    #[error("no deal satisfied the inferred voids after {attempts} attempts")]
    VoidConstraintsUnsatisfied { attempts: usize },
}

/// A fully specified world: every seat's remaining cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampledWorld {
    hands: [Hand; 4],
}

impl SampledWorld {
    pub fn hands(&self) -> &[Hand; 4] {
        &self.hands
    }

    pub fn hand(&self, seat: Seat) -> &Hand {
        &self.hands[seat.index()]
    }

    pub fn into_hands(self) -> [Hand; 4] {
        self.hands
    }
}

/// Prepared sampling state for one decision. Validation and void inference
/// run once; [`Determinization::sample`] can then be called per iteration.
#[derive(Debug, Clone)]
pub struct Determinization {
    perspective: Seat,
    own: Hand,
    unseen: Vec<Card>,
    sizes: [usize; 4],
    voids: Option<VoidTracker>,
    max_attempts: usize,
}

impl Determinization {
    pub fn prepare(
        view: &TableView<'_>,
        perspective: Seat,
        own: &Hand,
        voids: VoidHandling,
    ) -> Result<Self, SamplingError> {
        let played = view.played_cards();
        if let Some(card) = own.set().intersection(played).first() {
            return Err(SamplingError::DuplicateCard(card));
        }

        let expected = view.hand_size(perspective);
        if own.len() != expected {
            return Err(SamplingError::HandSizeMismatch {
                seat: perspective,
                expected,
                found: own.len(),
            });
        }

        let mut sizes = [0; 4];
        for seat in Seat::LOOP {
            if seat != perspective {
                sizes[seat.index()] = view.hand_size(seat);
            }
        }

        let unseen = CardSet::FULL.difference(played).difference(own.set());
        let required: usize = sizes.iter().sum();
        if unseen.len() != required {
            return Err(SamplingError::PoolSizeMismatch {
                available: unseen.len(),
                required,
            });
        }

        let voids = match voids {
            VoidHandling::Ignore => None,
            VoidHandling::Respect => Some(VoidTracker::from_view(view)),
        };

        Ok(Self {
            perspective,
            own: *own,
            unseen: unseen.to_vec(),
            sizes,
            voids,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        })
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn respects_voids(&self) -> bool {
        self.voids.is_some()
    }

    /// Drops void constraints, turning every later sample into a uniform deal.
    pub fn relax(&mut self) {
        self.voids = None;
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<SampledWorld, SamplingError> {
        match &self.voids {
            None => Ok(self.deal_uniform(rng)),
            Some(voids) => {
                for _ in 0..self.max_attempts {
                    if let Some(world) = self.deal_constrained(voids, rng) {
                        return Ok(world);
                    }
                }
                Err(SamplingError::VoidConstraintsUnsatisfied {
                    attempts: self.max_attempts,
                })
            }
        }
    }

    fn empty_world(&self) -> [Hand; 4] {
        array::from_fn(|idx| {
            if idx == self.perspective.index() {
                self.own
            } else {
                Hand::new()
            }
        })
    }

    fn deal_uniform<R: Rng + ?Sized>(&self, rng: &mut R) -> SampledWorld {
        let mut pool = self.unseen.clone();
        pool.shuffle(rng);
        let mut hands = self.empty_world();
        let mut cards = pool.into_iter();
        for seat in Seat::LOOP {
            for card in cards.by_ref().take(self.sizes[seat.index()]) {
                hands[seat.index()].add(card);
            }
        }
        SampledWorld { hands }
    }

    /// Places the most constrained cards first, each on a random eligible
    /// seat with room left. Returns `None` when a card runs out of seats.
    fn deal_constrained<R: Rng + ?Sized>(
        &self,
        voids: &VoidTracker,
        rng: &mut R,
    ) -> Option<SampledWorld> {
        let eligible = |card: Card| {
            Seat::LOOP
                .into_iter()
                .filter(|&seat| self.sizes[seat.index()] > 0 && !voids.is_void(seat, card.suit))
                .count()
        };

        let mut pool = self.unseen.clone();
        pool.shuffle(rng);
        pool.sort_by_key(|&card| eligible(card));

        let mut hands = self.empty_world();
        let mut room = self.sizes;
        let mut candidates = Vec::with_capacity(3);
        for card in pool {
            candidates.clear();
            candidates.extend(
                Seat::LOOP
                    .into_iter()
                    .filter(|&seat| room[seat.index()] > 0 && !voids.is_void(seat, card.suit)),
            );
            let &seat = candidates.choose(rng)?;
            hands[seat.index()].add(card);
            room[seat.index()] -= 1;
        }
        Some(SampledWorld { hands })
    }
}
