use baloot_bot::{SearchParams, choose_move};
use baloot_core::model::contract::Contract;
use baloot_core::model::deck::Deck;
use baloot_core::model::player::{Seat, Team};
use baloot_core::model::round::HandState;
use baloot_core::model::suit::Suit;
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn bench_opening_decision(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_decision");

    let cases: &[(u64, Contract)] = &[
        (42, Contract::sun()),
        (12345, Contract::hokum(Suit::Hearts)),
        (8675309, Contract::hokum(Suit::Spades)),
    ];

    for (seed, contract) in cases.iter().copied() {
        let deck = Deck::shuffled_with_seed(seed);
        let state = HandState::deal(&deck, Seat::North, contract, Team::NorthSouth);
        let params = SearchParams::default().with_iterations(400).with_seed(seed);
        group.bench_function(format!("opening_seed{}_{}", seed, contract), |b| {
            b.iter(|| {
                let outcome = choose_move(
                    &state.table_view(),
                    Seat::North,
                    state.hand(Seat::North),
                    &params,
                );
                black_box(outcome)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_opening_decision);
criterion_main!(benches);
