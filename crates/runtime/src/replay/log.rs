//! The persisted form of a battle.

use battle_core::{BattleAction, BattleSetup, compute_actions_root};
use serde::{Deserialize, Serialize};

/// Initial setup plus every accepted command, in order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayLog {
    pub setup: BattleSetup,
    pub actions: Vec<BattleAction>,
}

impl ReplayLog {
    pub fn new(setup: BattleSetup) -> Self {
        Self {
            setup,
            actions: Vec::new(),
        }
    }

    pub fn with_actions(setup: BattleSetup, actions: Vec<BattleAction>) -> Self {
        Self { setup, actions }
    }

    pub fn push(&mut self, action: BattleAction) {
        self.actions.push(action);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// SHA-256 commitment to the action sequence.
    pub fn actions_root(&self) -> Result<[u8; 32], bincode::Error> {
        compute_actions_root(&self.actions)
    }
}
