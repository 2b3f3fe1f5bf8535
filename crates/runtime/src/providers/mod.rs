//! Action provider implementations for different side behaviors.

pub mod ai;

pub use ai::{AiParams, GreedyAi};
