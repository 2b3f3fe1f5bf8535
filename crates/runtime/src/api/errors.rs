//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from the battle engine, replays and repositories so clients
//! can bubble them up with consistent context.
use thiserror::Error;

use battle_core::BattleError;

pub use crate::replay::ReplayError;
pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Battle(#[from] BattleError),

    #[error(transparent)]
    Replay(#[from] ReplayError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("battle is not finished but no stack is active")]
    NoActiveStack,
}
