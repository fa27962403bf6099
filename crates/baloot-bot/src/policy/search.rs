use super::{DecisionError, Policy, PolicyContext};
use crate::search::{SearchParams, choose_move};
use baloot_core::model::card::Card;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Determinized rollout search. Each decision draws its own search seed
/// from a stream rooted at `params.seed`, so a seeded match replays exactly.
pub struct SearchPolicy {
    params: SearchParams,
    seeds: StdRng,
    pool: Option<ThreadPool>,
}

impl SearchPolicy {
    pub fn new(params: SearchParams) -> Result<Self, DecisionError> {
        let pool = match params.workers {
            Some(threads) => Some(ThreadPoolBuilder::new().num_threads(threads).build()?),
            None => None,
        };
        Ok(Self {
            params,
            seeds: StdRng::seed_from_u64(params.seed),
            pool,
        })
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }
}

impl Policy for SearchPolicy {
    fn name(&self) -> &'static str {
        "search"
    }

    fn propose_move(&mut self, ctx: &PolicyContext) -> Result<Card, DecisionError> {
        let params = self.params.with_seed(self.seeds.r#gen());
        let outcome = match &self.pool {
            Some(pool) => pool.install(|| choose_move(&ctx.table, ctx.seat, ctx.hand, &params)),
            None => choose_move(&ctx.table, ctx.seat, ctx.hand, &params),
        }?;
        Ok(outcome.card)
    }
}
