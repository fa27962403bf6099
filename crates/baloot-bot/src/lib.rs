pub mod policy;
pub mod search;

pub use policy::{DecisionError, Policy, PolicyContext, RandomPolicy, SearchPolicy};
pub use search::{CandidateStats, SearchOutcome, SearchParams, choose_move};
