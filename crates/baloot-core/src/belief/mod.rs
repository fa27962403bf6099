//! Hidden-information support for the search agent.
//!
//! This module is composed of:
//! - `voids`: suits a seat has publicly shown it cannot hold.
//! - `sampler`: determinization of unseen cards into a concrete world.

mod sampler;
mod voids;

pub use sampler::{Determinization, SampledWorld, SamplingError, VoidHandling};
pub use voids::{SuitMask, VoidTracker};
