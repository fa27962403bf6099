use super::RuleError;
use crate::model::card::Card;
use crate::model::card_set::CardSet;
use crate::model::contract::Contract;
use crate::model::player::Seat;
use crate::model::suit::Suit;
use crate::model::trick::{Play, Trick};

const LEAD_BAND: u8 = 8;
const TRUMP_BAND: u8 = 16;

/// Strength of `card` in a trick led with `lead_suit`.
///
/// Trumps rank above every lead-suit card, and cards that are neither trump
/// nor of the led suit score zero and can never take the trick.
pub fn card_strength(card: Card, lead_suit: Suit, contract: Contract) -> u8 {
    if card.is_trump(contract) {
        TRUMP_BAND + card.rank.trump_strength()
    } else if card.suit == lead_suit {
        LEAD_BAND + card.rank.plain_strength()
    } else {
        0
    }
}

/// The play currently holding the trick, if any card has been played.
pub fn current_winner(trick: &Trick, contract: Contract) -> Option<Play> {
    let lead_suit = trick.lead_suit()?;
    trick
        .plays()
        .iter()
        .copied()
        .max_by_key(|play| card_strength(play.card, lead_suit, contract))
}

pub fn resolve_trick(trick: &Trick, contract: Contract) -> Result<Seat, RuleError> {
    if !trick.is_complete() {
        return Err(RuleError::IncompleteTrick {
            plays: trick.plays().len(),
        });
    }
    let mut seen = CardSet::EMPTY;
    for play in trick.plays() {
        if !seen.insert(play.card) {
            return Err(RuleError::DuplicateCard(play.card));
        }
    }
    current_winner(trick, contract)
        .map(|play| play.seat)
        .ok_or(RuleError::IncompleteTrick { plays: 0 })
}

#[cfg(test)]
mod tests {
    use super::{current_winner, resolve_trick};
    use crate::model::card::Card;
    use crate::model::contract::Contract;
    use crate::model::player::Seat;
    use crate::model::suit::Suit;
    use crate::model::trick::Trick;
    use crate::rules::RuleError;

    fn trick(leader: Seat, cards: [&str; 4]) -> Trick {
        let cards = cards.map(|c| c.parse::<Card>().unwrap());
        Trick::from_plays(leader, &cards).unwrap()
    }

    #[test]
    fn ten_beats_king_in_plain_suits() {
        let t = trick(Seat::North, ["KS", "10S", "AH", "9S"]);
        assert_eq!(resolve_trick(&t, Contract::sun()), Ok(Seat::East));
    }

    #[test]
    fn off_suit_ace_cannot_win_in_sun() {
        let t = trick(Seat::East, ["7D", "AH", "AC", "AS"]);
        assert_eq!(resolve_trick(&t, Contract::sun()), Ok(Seat::East));
    }

    #[test]
    fn lowest_trump_beats_lead_ace() {
        let t = trick(Seat::North, ["AS", "10S", "7H", "KS"]);
        assert_eq!(resolve_trick(&t, Contract::hokum(Suit::Hearts)), Ok(Seat::South));
    }

    #[test]
    fn jack_and_nine_top_the_trump_order() {
        let t = trick(Seat::West, ["AH", "9H", "JH", "10H"]);
        let hokum = Contract::hokum(Suit::Hearts);
        assert_eq!(resolve_trick(&t, hokum), Ok(Seat::East));
        assert_eq!(resolve_trick(&t, Contract::sun()), Ok(Seat::West));
    }

    #[test]
    fn partial_trick_winner_tracks_best_so_far() {
        let cards = ["QD", "KD"].map(|c| c.parse::<Card>().unwrap());
        let t = Trick::from_plays(Seat::South, &cards).unwrap();
        let best = current_winner(&t, Contract::sun()).unwrap();
        assert_eq!(best.seat, Seat::West);
        assert!(current_winner(&Trick::new(Seat::North), Contract::sun()).is_none());
    }

    #[test]
    fn resolving_three_plays_is_a_precondition_error() {
        let cards = ["QD", "KD", "AD"].map(|c| c.parse::<Card>().unwrap());
        let t = Trick::from_plays(Seat::South, &cards).unwrap();
        assert_eq!(
            resolve_trick(&t, Contract::sun()),
            Err(RuleError::IncompleteTrick { plays: 3 })
        );
    }

    #[test]
    fn duplicate_cards_are_rejected() {
        let t = trick(Seat::North, ["QD", "QD", "AD", "7D"]);
        assert!(matches!(
            resolve_trick(&t, Contract::sun()),
            Err(RuleError::DuplicateCard(_))
        ));
    }
}
