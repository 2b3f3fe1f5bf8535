//! Greedy lookahead AI for battle stacks.
//!
//! The AI looks one command ahead through the engine's planning API:
//!
//! 1. **Candidate Generation**: every (direction, cell) from which the active
//!    stack could strike each opponent, split into reachable now and
//!    reachable at all
//! 2. **Scoring**: each candidate plan is valued from its average damage
//!    estimates, weighted by unit value ([`AiParams`])
//! 3. **Selection**: shoot, strike, wait or walk, in that order of preference
//!
//! # Core Components
//!
//! - [`GreedyAi`]: the provider implementing [`crate::ActionProvider`]
//! - [`AiParams`]: valuation weights
//! - [`generator`]: melee candidate generation

pub mod generator;
pub mod params;
pub mod provider;
pub mod scoring;

pub use generator::{AttackCandidate, MeleeCandidates};
pub use params::AiParams;
pub use provider::GreedyAi;
