//! Recording and playback of battle commands.
//!
//! A battle is fully determined by its setup (armies, field preset, seed),
//! the static content and the ordered list of accepted commands. Recording
//! keeps exactly that; playback rebuilds the engine and resubmits the
//! commands one by one.

mod log;
mod player;
mod recorder;

pub use log::ReplayLog;
pub use player::ReplayPlayer;
pub use recorder::RecordingControl;

use battle_core::{BattleAction, BattleError};
use thiserror::Error;

/// Errors raised while playing a replay back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("failed to rebuild the battle: {0}")]
    Setup(#[source] BattleError),

    #[error("recorded action #{index} ({action}) was rejected: {source}")]
    Diverged {
        index: usize,
        action: BattleAction,
        #[source]
        source: BattleError,
    },

    #[error("no recorded action at position {position}")]
    Exhausted { position: usize },
}
