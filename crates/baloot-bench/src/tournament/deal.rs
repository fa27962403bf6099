use crate::config::ContractMode;
use baloot_core::model::contract::Contract;
use baloot_core::model::deck::Deck;
use baloot_core::model::player::{Seat, Team};
use baloot_core::model::suit::Suit;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Everything fixed about a deal before play starts. Bidding is outside the
/// harness, so the contract and bidder are drawn from the deal seed.
#[derive(Debug, Clone)]
pub struct DealSetup {
    pub deck: Deck,
    pub contract: Contract,
    pub bidder: Team,
    pub starting_player: Seat,
}

impl DealSetup {
    /// The opening seat rotates with the hand index; the rest follows the seed.
    pub fn from_seed(seed: u64, hand_index: usize, mode: ContractMode) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let deck = Deck::shuffled(&mut rng);
        let sun = match mode {
            ContractMode::Sun => true,
            ContractMode::Hokum => false,
            ContractMode::Mixed => rng.gen_bool(0.5),
        };
        let contract = if sun {
            Contract::sun()
        } else {
            Contract::hokum(Suit::ALL[rng.gen_range(0..Suit::ALL.len())])
        };
        let bidder = Team::BOTH[rng.gen_range(0..Team::BOTH.len())];

        Self {
            deck,
            contract,
            bidder,
            starting_player: Seat::LOOP[hand_index % Seat::LOOP.len()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DealSetup;
    use crate::config::ContractMode;
    use baloot_core::model::player::Seat;

    #[test]
    fn same_seed_same_deal() {
        let a = DealSetup::from_seed(99, 3, ContractMode::Mixed);
        let b = DealSetup::from_seed(99, 3, ContractMode::Mixed);
        assert_eq!(a.deck.cards(), b.deck.cards());
        assert_eq!(a.contract, b.contract);
        assert_eq!(a.bidder, b.bidder);
        assert_eq!(a.starting_player, Seat::West);
    }

    #[test]
    fn fixed_modes_are_honoured() {
        for seed in 0..20 {
            assert!(!DealSetup::from_seed(seed, 0, ContractMode::Sun).contract.is_hokum());
            assert!(DealSetup::from_seed(seed, 0, ContractMode::Hokum).contract.is_hokum());
        }
    }
}
