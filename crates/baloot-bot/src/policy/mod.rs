mod random;
mod search;

pub use random::RandomPolicy;
pub use search::SearchPolicy;

use baloot_core::belief::SamplingError;
use baloot_core::model::card::Card;
use baloot_core::model::hand::Hand;
use baloot_core::model::player::Seat;
use baloot_core::model::table::TableView;
use baloot_core::model::trick::TrickError;
use baloot_core::rules::RuleError;
use thiserror::Error;

/// Context provided to policies for decision-making
pub struct PolicyContext<'a> {
    pub seat: Seat,
    pub hand: &'a Hand,
    pub table: TableView<'a>,
}

impl<'a> PolicyContext<'a> {
    pub fn new(seat: Seat, hand: &'a Hand, table: TableView<'a>) -> Self {
        Self { seat, hand, table }
    }
}

#[derive(Debug, Error)]
pub enum DecisionError {
    #[error("{seat} asked to act but {expected} is next")]
    NotToAct { seat: Seat, expected: Seat },
    #[error(transparent)]
    Rule(#[from] RuleError),
    #[error(transparent)]
    Sampling(#[from] SamplingError),
    #[error("rollout broke trick order: {0}")]
    Rollout(#[from] TrickError),
    #[error("rollout weights rejected: {0}")]
    Weights(#[from] rand::distributions::WeightedError),
    #[error("failed to build search worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Capability shared by every agent that can sit at the table.
pub trait Policy: Send {
    fn name(&self) -> &'static str;

    /// Returns a legal card for `ctx.seat`, which must be next to play.
    fn propose_move(&mut self, ctx: &PolicyContext) -> Result<Card, DecisionError>;
}
