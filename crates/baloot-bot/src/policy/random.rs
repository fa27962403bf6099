use super::{DecisionError, Policy, PolicyContext};
use baloot_core::model::card::Card;
use baloot_core::rules::{RuleError, legal_moves};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;

/// Uniform choice among legal moves. Baseline opponent for the search agent.
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn propose_move(&mut self, ctx: &PolicyContext) -> Result<Card, DecisionError> {
        let expected = ctx.table.next_to_play();
        if expected != ctx.seat {
            return Err(DecisionError::NotToAct {
                seat: ctx.seat,
                expected,
            });
        }
        let legal = legal_moves(ctx.hand, ctx.table.current_trick, ctx.table.contract)?;
        legal
            .iter()
            .choose(&mut self.rng)
            .ok_or(DecisionError::Rule(RuleError::EmptyHand))
    }
}
