use crate::policy::DecisionError;
use baloot_core::model::card::Card;
use baloot_core::model::contract::{Contract, LAST_TRICK_BONUS};
use baloot_core::model::deck::HAND_SIZE;
use baloot_core::model::hand::Hand;
use baloot_core::model::player::Seat;
use baloot_core::model::rank::Rank;
use baloot_core::model::table::TableView;
use baloot_core::model::trick::Trick;
use baloot_core::rules::{legal_moves, resolve_trick};
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};

/// Selection weight of a card during rollouts. High-value cards are played
/// more often so simulated opponents take their points.
fn rollout_weight(card: Card) -> u32 {
    match card.rank {
        Rank::Ace | Rank::Ten => 3,
        Rank::King => 2,
        _ => 1,
    }
}

/// Plays `first` for `seat`, then finishes the hand with weighted-random
/// legal moves for everyone. Returns my team's trick points minus the
/// opponents' over the simulated remainder.
pub(crate) fn rollout<R: Rng + ?Sized>(
    table: &TableView<'_>,
    seat: Seat,
    first: Card,
    hands: [Hand; 4],
    rng: &mut R,
) -> Result<i64, DecisionError> {
    let contract = table.contract;
    let mut hands = hands;
    let mut trick = table.current_trick.clone();
    let mut completed = table.tricks_completed();
    let mut points = [0_u32; 2];
    let mut forced = Some(first);

    while completed < HAND_SIZE {
        let actor = trick.next_seat();
        let card = match forced.take() {
            Some(card) => card,
            None => pick_weighted(&hands[actor.index()], &trick, contract, rng)?,
        };
        hands[actor.index()].remove(card);
        trick.play(actor, card)?;

        if trick.is_complete() {
            let winner = resolve_trick(&trick, contract)?;
            completed += 1;
            let mut abnat = trick.abnat(contract);
            if completed == HAND_SIZE {
                abnat += LAST_TRICK_BONUS;
            }
            points[winner.team().index()] += abnat;
            trick = Trick::new(winner);
        }
    }

    let mine = seat.team();
    Ok(i64::from(points[mine.index()]) - i64::from(points[mine.opponent().index()]))
}

fn pick_weighted<R: Rng + ?Sized>(
    hand: &Hand,
    trick: &Trick,
    contract: Contract,
    rng: &mut R,
) -> Result<Card, DecisionError> {
    let legal = legal_moves(hand, trick, contract)?.to_vec();
    if legal.len() == 1 {
        return Ok(legal[0]);
    }
    let dist = WeightedIndex::new(legal.iter().map(|&card| rollout_weight(card)))?;
    Ok(legal[dist.sample(rng)])
}
