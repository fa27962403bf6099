//! Determinized Monte Carlo search over the current legal moves.
//!
//! Every iteration samples one world for the hidden cards, fixes a candidate
//! move round-robin, and rolls the hand out to the end. Iterations seed their
//! own RNG from `seed + iteration`, so the outcome for a given seed does not
//! depend on how rayon splits the work.

mod params;
mod rollout;

pub use params::{DEFAULT_ITERATIONS, SearchParams};

use crate::policy::DecisionError;
use baloot_core::belief::{Determinization, SamplingError, VoidHandling};
use baloot_core::model::card::Card;
use baloot_core::model::hand::Hand;
use baloot_core::model::player::Seat;
use baloot_core::model::table::TableView;
use baloot_core::rules::legal_moves;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::{Level, event};

/// Iterations issued between time-budget checks.
const BATCH_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateStats {
    pub card: Card,
    pub samples: u32,
    pub total_reward: i64,
}

impl CandidateStats {
    pub fn average(&self) -> Option<f64> {
        (self.samples > 0).then(|| self.total_reward as f64 / f64::from(self.samples))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub card: Card,
    /// Per-candidate statistics in legal-move order. Empty when only one
    /// move was legal and no search ran.
    pub candidates: Vec<CandidateStats>,
    pub iterations: usize,
    /// Iterations that dropped void constraints after the sampler gave up.
    pub fallbacks: usize,
    pub elapsed: Duration,
}

/// Per-candidate `(sum, count)` accumulator merged across workers.
#[derive(Debug, Clone)]
struct Tally {
    sums: Vec<i64>,
    counts: Vec<u32>,
}

impl Tally {
    fn new(len: usize) -> Self {
        Self {
            sums: vec![0; len],
            counts: vec![0; len],
        }
    }

    fn record(mut self, idx: usize, reward: i64) -> Self {
        self.sums[idx] += reward;
        self.counts[idx] += 1;
        self
    }

    fn merge(mut self, other: Tally) -> Self {
        for idx in 0..self.sums.len() {
            self.sums[idx] += other.sums[idx];
            self.counts[idx] += other.counts[idx];
        }
        self
    }
}

/// Picks the card for `seat` with the highest average rollout reward.
///
/// A single legal move is returned without sampling. The iteration count is
/// raised to the number of legal moves so every candidate is sampled at
/// least once, even when a time budget cuts the search short.
pub fn choose_move(
    table: &TableView<'_>,
    seat: Seat,
    hand: &Hand,
    params: &SearchParams,
) -> Result<SearchOutcome, DecisionError> {
    let started = Instant::now();
    let expected = table.next_to_play();
    if expected != seat {
        return Err(DecisionError::NotToAct { seat, expected });
    }

    let candidates = legal_moves(hand, table.current_trick, table.contract)?.to_vec();
    if let [only] = candidates.as_slice() {
        return Ok(SearchOutcome {
            card: *only,
            candidates: Vec::new(),
            iterations: 0,
            fallbacks: 0,
            elapsed: started.elapsed(),
        });
    }

    let voids = if params.respect_voids {
        VoidHandling::Respect
    } else {
        VoidHandling::Ignore
    };
    let sampler = Determinization::prepare(table, seat, hand, voids)?;
    let mut uniform = sampler.clone();
    uniform.relax();

    let total = params.iterations.max(candidates.len());
    let batch = BATCH_SIZE.max(candidates.len());
    let fallbacks = AtomicUsize::new(0);

    let iteration = |i: usize| -> Result<(usize, i64), DecisionError> {
        let mut rng = SmallRng::seed_from_u64(params.seed.wrapping_add(i as u64));
        let world = match sampler.sample(&mut rng) {
            Ok(world) => world,
            Err(SamplingError::VoidConstraintsUnsatisfied { .. }) => {
                fallbacks.fetch_add(1, Ordering::Relaxed);
                uniform.sample(&mut rng)?
            }
            Err(err) => return Err(err.into()),
        };
        let idx = i % candidates.len();
        let reward = rollout::rollout(table, seat, candidates[idx], world.into_hands(), &mut rng)?;
        Ok((idx, reward))
    };

    let mut tally = Tally::new(candidates.len());
    let mut issued = 0;
    while issued < total {
        let end = (issued + batch).min(total);
        let partial = (issued..end)
            .into_par_iter()
            .map(&iteration)
            .try_fold(
                || Tally::new(candidates.len()),
                |acc, item| item.map(|(idx, reward)| acc.record(idx, reward)),
            )
            .try_reduce(|| Tally::new(candidates.len()), |a, b| Ok(a.merge(b)))?;
        tally = tally.merge(partial);
        issued = end;

        if params
            .time_budget
            .is_some_and(|budget| started.elapsed() >= budget)
        {
            break;
        }
    }

    let stats: Vec<CandidateStats> = candidates
        .iter()
        .enumerate()
        .map(|(idx, &card)| CandidateStats {
            card,
            samples: tally.counts[idx],
            total_reward: tally.sums[idx],
        })
        .collect();

    let mut best = stats[0];
    let mut best_avg = f64::NEG_INFINITY;
    for candidate in &stats {
        let Some(avg) = candidate.average() else {
            continue;
        };
        if avg > best_avg {
            best = *candidate;
            best_avg = avg;
        }
    }

    let fallbacks = fallbacks.into_inner();
    if fallbacks > 0 {
        event!(
            target: "baloot_bot::search",
            Level::WARN,
            seat = %seat,
            fallbacks,
            "void constraints unsatisfiable; dealt those worlds uniformly"
        );
    }

    let elapsed = started.elapsed();
    event!(
        target: "baloot_bot::search",
        Level::DEBUG,
        seat = %seat,
        card = %best.card,
        average = best_avg,
        candidates = stats.len(),
        iterations = issued,
        elapsed_ms = elapsed.as_millis() as u64,
    );

    Ok(SearchOutcome {
        card: best.card,
        candidates: stats,
        iterations: issued,
        fallbacks,
        elapsed,
    })
}

#[cfg(test)]
mod tests {
    use super::{SearchParams, Tally, choose_move};
    use baloot_core::model::card::Card;
    use baloot_core::model::contract::Contract;
    use baloot_core::model::hand::Hand;
    use baloot_core::model::player::{Seat, Team};
    use baloot_core::model::suit::Suit;
    use baloot_core::model::table::TableView;
    use baloot_core::model::trick::Trick;

    fn cards(list: &[&str]) -> Vec<Card> {
        list.iter().map(|c| c.parse().unwrap()).collect()
    }

    #[test]
    fn tally_merges_sums_and_counts() {
        let a = Tally::new(2).record(0, 5).record(1, -3);
        let b = Tally::new(2).record(0, 7);
        let merged = a.merge(b);
        assert_eq!(merged.sums, vec![12, -3]);
        assert_eq!(merged.counts, vec![2, 1]);
    }

    #[test]
    fn single_legal_move_skips_search() {
        let hand = Hand::with_cards(cards(&["7S", "AH", "KD"]));
        let open = Trick::from_plays(Seat::North, &cards(&["AS"])).unwrap();
        let table = TableView::new(Contract::sun(), Team::NorthSouth, &open, &[]);
        let outcome = choose_move(&table, Seat::East, &hand, &SearchParams::default()).unwrap();
        assert_eq!(outcome.card, "7S".parse().unwrap());
        assert_eq!(outcome.iterations, 0);
        assert!(outcome.candidates.is_empty());
    }

    #[test]
    fn acting_out_of_turn_is_refused() {
        let hand = Hand::with_cards(cards(&["7S", "AH"]));
        let open = Trick::new(Seat::North);
        let history: Vec<Trick> = Vec::new();
        let table = TableView::new(Contract::hokum(Suit::Hearts), Team::EastWest, &open, &history);
        assert!(choose_move(&table, Seat::South, &hand, &SearchParams::default()).is_err());
    }
}
