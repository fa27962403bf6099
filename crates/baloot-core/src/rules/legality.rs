use super::resolve::{card_strength, current_winner};
use super::{PlayError, PlayViolation, RuleError};
use crate::model::card::Card;
use crate::model::card_set::CardSet;
use crate::model::contract::Contract;
use crate::model::hand::Hand;
use crate::model::player::Team;
use crate::model::suit::Suit;
use crate::model::trick::{Play, Trick};

/// Cards the seat due to act in `trick` may play from `hand`.
///
/// The team currently holding the trick is derived from the plays so far,
/// using the same strength function as trick resolution. Never empty for a
/// non-empty hand.
pub fn legal_moves(hand: &Hand, trick: &Trick, contract: Contract) -> Result<CardSet, RuleError> {
    validate(hand, trick)?;
    match current_winner(trick, contract) {
        Some(best) => Ok(restrict(hand.set(), trick, best, contract, best.seat.team())),
        None => Ok(hand.set()),
    }
}

/// Same as [`legal_moves`], with the winning team supplied by the caller.
pub fn legal_moves_with_winner(
    hand: &Hand,
    trick: &Trick,
    contract: Contract,
    team_winning: Team,
) -> Result<CardSet, RuleError> {
    validate(hand, trick)?;
    match current_winner(trick, contract) {
        Some(best) => Ok(restrict(hand.set(), trick, best, contract, team_winning)),
        None => Ok(hand.set()),
    }
}

/// Accepts `card` or names the rule it breaks.
pub fn check_play(
    hand: &Hand,
    trick: &Trick,
    contract: Contract,
    card: Card,
) -> Result<(), PlayError> {
    if !hand.contains(card) {
        return Err(PlayViolation::NotInHand(card).into());
    }
    let legal = legal_moves(hand, trick, contract)?;
    if legal.contains(card) {
        return Ok(());
    }

    let violation = match (trick.lead_suit(), contract.trump()) {
        (Some(lead), _) if card.suit != lead && hand.has_suit(lead) => {
            PlayViolation::MustFollowSuit { suit: lead }
        }
        (Some(_), Some(trump)) if card.suit != trump => PlayViolation::MustTrump { trump },
        (Some(_), Some(_)) => {
            let to_beat = current_winner(trick, contract)
                .map(|play| play.card)
                .unwrap_or(card);
            PlayViolation::MustOvertrump { to_beat }
        }
        // Leading and Sun discards are always legal, so any miss is a suit failure.
        (lead, _) => PlayViolation::MustFollowSuit {
            suit: lead.unwrap_or(card.suit),
        },
    };
    Err(violation.into())
}

fn validate(hand: &Hand, trick: &Trick) -> Result<(), RuleError> {
    if hand.is_empty() {
        return Err(RuleError::EmptyHand);
    }
    if trick.is_complete() {
        return Err(RuleError::TrickComplete);
    }
    if let Some(card) = trick.cards().intersection(hand.set()).first() {
        return Err(RuleError::DuplicateCard(card));
    }
    Ok(())
}

fn restrict(
    cards: CardSet,
    trick: &Trick,
    best: Play,
    contract: Contract,
    team_winning: Team,
) -> CardSet {
    let Some(lead) = trick.lead_suit() else {
        return cards;
    };
    let following = cards.suit(lead);

    let Some(trump) = contract.trump() else {
        return if following.is_empty() { cards } else { following };
    };

    if !following.is_empty() {
        return if lead == trump {
            overtrump(following, best, lead, contract)
        } else {
            following
        };
    }

    if team_winning == trick.next_seat().team() {
        return cards;
    }

    let trumps = cards.suit(trump);
    if trumps.is_empty() {
        cards
    } else {
        overtrump(trumps, best, lead, contract)
    }
}

/// Trumps that beat the current best card when one exists, else all trumps.
fn overtrump(trumps: CardSet, best: Play, lead: Suit, contract: Contract) -> CardSet {
    if !best.card.is_trump(contract) {
        return trumps;
    }
    let to_beat = card_strength(best.card, lead, contract);
    let higher: CardSet = trumps
        .iter()
        .filter(|card| card_strength(*card, lead, contract) > to_beat)
        .collect();
    if higher.is_empty() { trumps } else { higher }
}

#[cfg(test)]
mod tests {
    use super::{check_play, legal_moves, legal_moves_with_winner};
    use crate::model::card::Card;
    use crate::model::card_set::CardSet;
    use crate::model::contract::Contract;
    use crate::model::hand::Hand;
    use crate::model::player::{Seat, Team};
    use crate::model::suit::Suit;
    use crate::model::trick::Trick;
    use crate::rules::{PlayError, PlayViolation, RuleError};

    fn hand(cards: &[&str]) -> Hand {
        Hand::with_cards(cards.iter().map(|c| c.parse::<Card>().unwrap()))
    }

    fn set(cards: &[&str]) -> CardSet {
        hand(cards).set()
    }

    fn trick(leader: Seat, cards: &[&str]) -> Trick {
        let cards: Vec<Card> = cards.iter().map(|c| c.parse().unwrap()).collect();
        Trick::from_plays(leader, &cards).unwrap()
    }

    #[test]
    fn leader_may_play_anything() {
        let h = hand(&["7S", "AH", "JD"]);
        let hokum = Contract::hokum(Suit::Hearts);
        let moves = legal_moves(&h, &Trick::new(Seat::North), hokum).unwrap();
        assert_eq!(moves, h.set());
    }

    #[test]
    fn must_follow_led_suit() {
        let h = hand(&["7S", "KS", "AH", "JD"]);
        let t = trick(Seat::North, &["10S"]);
        assert_eq!(legal_moves(&h, &t, Contract::sun()).unwrap(), set(&["7S", "KS"]));
    }

    #[test]
    fn void_in_sun_frees_the_whole_hand() {
        let h = hand(&["AH", "JD", "7C"]);
        let t = trick(Seat::North, &["10S", "AS"]);
        assert_eq!(legal_moves(&h, &t, Contract::sun()).unwrap(), h.set());
    }

    #[test]
    fn trump_lead_forces_overtrump_when_possible() {
        let hokum = Contract::hokum(Suit::Hearts);
        let h = hand(&["7H", "KH", "JH", "AS"]);
        let t = trick(Seat::North, &["9H"]);
        assert_eq!(legal_moves(&h, &t, hokum).unwrap(), set(&["JH"]));
    }

    #[test]
    fn trump_lead_allows_undertrump_when_nothing_beats_it() {
        let hokum = Contract::hokum(Suit::Hearts);
        let h = hand(&["7H", "KH", "AS"]);
        let t = trick(Seat::North, &["JH"]);
        assert_eq!(legal_moves(&h, &t, hokum).unwrap(), set(&["7H", "KH"]));
    }

    #[test]
    fn trump_lead_overtrump_applies_even_over_partner() {
        let hokum = Contract::hokum(Suit::Hearts);
        // North leads, East follows low, South (North's partner) to act.
        let h = hand(&["7H", "AH", "KS"]);
        let t = trick(Seat::North, &["10H", "8H"]);
        assert_eq!(legal_moves(&h, &t, hokum).unwrap(), set(&["AH"]));
    }

    #[test]
    fn void_against_opponent_must_trump() {
        let hokum = Contract::hokum(Suit::Hearts);
        let h = hand(&["7H", "QH", "AC", "KD"]);
        let t = trick(Seat::North, &["AS"]);
        assert_eq!(legal_moves(&h, &t, hokum).unwrap(), set(&["7H", "QH"]));
    }

    #[test]
    fn void_must_overtrump_an_opponent_ruff() {
        let hokum = Contract::hokum(Suit::Hearts);
        // North leads spades, East ruffs with KH; South is void in spades.
        let h = hand(&["7H", "QH", "10H", "AC"]);
        let t = trick(Seat::North, &["AS", "KH"]);
        assert_eq!(legal_moves(&h, &t, hokum).unwrap(), set(&["10H"]));
    }

    #[test]
    fn void_may_undertrump_when_unable_to_overtrump() {
        let hokum = Contract::hokum(Suit::Hearts);
        let h = hand(&["7H", "QH", "AC"]);
        let t = trick(Seat::North, &["AS", "JH"]);
        assert_eq!(legal_moves(&h, &t, hokum).unwrap(), set(&["7H", "QH"]));
    }

    #[test]
    fn partner_holding_the_trick_frees_the_hand() {
        let hokum = Contract::hokum(Suit::Hearts);
        // North leads AS and holds the trick; South (partner) is void in spades.
        let h = hand(&["7H", "QH", "AC"]);
        let t = trick(Seat::North, &["AS", "7S"]);
        assert_eq!(legal_moves(&h, &t, hokum).unwrap(), h.set());
    }

    #[test]
    fn void_without_trump_is_free() {
        let hokum = Contract::hokum(Suit::Hearts);
        let h = hand(&["AC", "KD"]);
        let t = trick(Seat::North, &["AS"]);
        assert_eq!(legal_moves(&h, &t, hokum).unwrap(), h.set());
    }

    #[test]
    fn explicit_winner_overrides_derived_one() {
        let hokum = Contract::hokum(Suit::Hearts);
        let h = hand(&["7H", "AC"]);
        let t = trick(Seat::North, &["AS"]);
        // East acts; claiming its own team holds the trick lifts the obligation.
        assert_eq!(
            legal_moves_with_winner(&h, &t, hokum, Team::EastWest).unwrap(),
            h.set()
        );
        assert_eq!(
            legal_moves_with_winner(&h, &t, hokum, Team::NorthSouth).unwrap(),
            set(&["7H"])
        );
    }

    #[test]
    fn single_legal_card_is_still_a_set() {
        let h = hand(&["7S", "AH"]);
        let t = trick(Seat::North, &["10S"]);
        let moves = legal_moves(&h, &t, Contract::sun()).unwrap();
        assert_eq!(moves.len(), 1);
    }

    #[test]
    fn preconditions_are_reported() {
        let t = trick(Seat::North, &["10S"]);
        assert_eq!(
            legal_moves(&Hand::new(), &t, Contract::sun()),
            Err(RuleError::EmptyHand)
        );
        assert!(matches!(
            legal_moves(&hand(&["10S", "7D"]), &t, Contract::sun()),
            Err(RuleError::DuplicateCard(_))
        ));
        let full = trick(Seat::North, &["10S", "7S", "8S", "9S"]);
        assert_eq!(
            legal_moves(&hand(&["AD"]), &full, Contract::sun()),
            Err(RuleError::TrickComplete)
        );
    }

    #[test]
    fn violations_name_the_broken_rule() {
        let hokum = Contract::hokum(Suit::Hearts);
        let t = trick(Seat::North, &["AS", "KH"]);
        let h = hand(&["7H", "10H", "AC", "QS"]);
        assert_eq!(
            check_play(&h, &t, hokum, "AC".parse().unwrap()),
            Err(PlayError::Illegal(PlayViolation::MustFollowSuit { suit: Suit::Spades }))
        );

        let h = hand(&["7H", "10H", "AC"]);
        assert_eq!(
            check_play(&h, &t, hokum, "AC".parse().unwrap()),
            Err(PlayError::Illegal(PlayViolation::MustTrump { trump: Suit::Hearts }))
        );
        assert_eq!(
            check_play(&h, &t, hokum, "7H".parse().unwrap()),
            Err(PlayError::Illegal(PlayViolation::MustOvertrump {
                to_beat: "KH".parse().unwrap()
            }))
        );
        assert_eq!(check_play(&h, &t, hokum, "10H".parse().unwrap()), Ok(()));
        assert!(matches!(
            check_play(&h, &t, hokum, "JC".parse().unwrap()),
            Err(PlayError::Illegal(PlayViolation::NotInHand(_)))
        ));
    }
}
