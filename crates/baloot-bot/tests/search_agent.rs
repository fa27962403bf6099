use baloot_bot::{Policy, PolicyContext, RandomPolicy, SearchParams, SearchPolicy, choose_move};
use baloot_core::model::contract::Contract;
use baloot_core::model::deck::Deck;
use baloot_core::model::player::{Seat, Team};
use baloot_core::model::round::HandState;
use baloot_core::model::suit::Suit;
use std::time::Duration;

/// Plays `plays` random cards into a fresh hand so searches start mid-trick.
fn advanced_hand(seed: u64, contract: Contract, plays: usize) -> HandState {
    let deck = Deck::shuffled_with_seed(seed);
    let mut state = HandState::deal(&deck, Seat::West, contract, Team::EastWest);
    let mut random = RandomPolicy::new(seed);
    for _ in 0..plays {
        let Some(seat) = state.next_to_play() else {
            break;
        };
        let hand = *state.hand(seat);
        let card = random
            .propose_move(&PolicyContext::new(seat, &hand, state.table_view()))
            .unwrap();
        state.play_card(seat, card).unwrap();
    }
    state
}

#[test]
fn search_returns_legal_cards_throughout_a_hand() {
    let params = SearchParams::default().with_iterations(48).with_seed(3);
    for contract in [Contract::sun(), Contract::hokum(Suit::Diamonds)] {
        let deck = Deck::shuffled_with_seed(99);
        let mut state = HandState::deal(&deck, Seat::North, contract, Team::NorthSouth);
        let mut policy = SearchPolicy::new(params).unwrap();
        while let Some(seat) = state.next_to_play() {
            let legal = state.legal_moves(seat).unwrap();
            let hand = *state.hand(seat);
            let card = policy
                .propose_move(&PolicyContext::new(seat, &hand, state.table_view()))
                .unwrap();
            assert!(legal.contains(card), "{card} is not legal for {seat}");
            state.play_card(seat, card).unwrap();
        }
        assert!(state.is_complete());
    }
}

#[test]
fn same_seed_gives_same_statistics() {
    let state = advanced_hand(17, Contract::hokum(Suit::Spades), 6);
    let seat = state.next_to_play().unwrap();
    let params = SearchParams::default().with_iterations(200).with_seed(42);
    let first = choose_move(&state.table_view(), seat, state.hand(seat), &params).unwrap();
    let second = choose_move(&state.table_view(), seat, state.hand(seat), &params).unwrap();
    assert_eq!(first.card, second.card);
    assert_eq!(first.candidates, second.candidates);
}

#[test]
fn worker_count_does_not_change_the_result() {
    let state = advanced_hand(5, Contract::sun(), 9);
    let seat = state.next_to_play().unwrap();
    let params = SearchParams::default().with_iterations(160).with_seed(8);
    let global = choose_move(&state.table_view(), seat, state.hand(seat), &params).unwrap();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .unwrap();
    let single =
        pool.install(|| choose_move(&state.table_view(), seat, state.hand(seat), &params).unwrap());
    assert_eq!(global.card, single.card);
    assert_eq!(global.candidates, single.candidates);
}

#[test]
fn every_candidate_is_sampled_round_robin() {
    let state = advanced_hand(23, Contract::sun(), 0);
    let seat = state.next_to_play().unwrap();
    let params = SearchParams::default().with_iterations(80).with_seed(1);
    let outcome = choose_move(&state.table_view(), seat, state.hand(seat), &params).unwrap();
    let legal = state.legal_moves(seat).unwrap();
    assert_eq!(outcome.candidates.len(), legal.len());
    assert_eq!(outcome.iterations, 80);
    let counts: Vec<u32> = outcome.candidates.iter().map(|c| c.samples).collect();
    let min = counts.iter().copied().min().unwrap();
    let max = counts.iter().copied().max().unwrap();
    assert!(max - min <= 1, "uneven sampling {counts:?}");
    let best = outcome
        .candidates
        .iter()
        .filter_map(|c| c.average())
        .fold(f64::NEG_INFINITY, f64::max);
    let chosen = outcome
        .candidates
        .iter()
        .find(|c| c.card == outcome.card)
        .and_then(|c| c.average())
        .unwrap();
    assert_eq!(chosen, best);
}

#[test]
fn exhausted_time_budget_stops_after_first_batch() {
    let state = advanced_hand(31, Contract::hokum(Suit::Hearts), 2);
    let seat = state.next_to_play().unwrap();
    let params = SearchParams::default()
        .with_iterations(10_000)
        .with_time_budget(Some(Duration::ZERO));
    let outcome = choose_move(&state.table_view(), seat, state.hand(seat), &params).unwrap();
    assert!(outcome.iterations < 10_000);
    assert!(outcome.candidates.iter().all(|c| c.samples > 0));
}

#[test]
fn void_aware_search_still_plays_legally() {
    let state = advanced_hand(8, Contract::hokum(Suit::Clubs), 13);
    let seat = state.next_to_play().unwrap();
    let params = SearchParams::default()
        .with_iterations(64)
        .with_respect_voids(true);
    let outcome = choose_move(&state.table_view(), seat, state.hand(seat), &params).unwrap();
    assert!(state.legal_moves(seat).unwrap().contains(outcome.card));
}
