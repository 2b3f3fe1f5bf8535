//! Abstraction for sourcing the commands of each side.
//!
//! Runtime users plug in [`ActionProvider`] implementations so a battle can
//! run with human input, scripted fixtures, or AI policies.
use std::collections::VecDeque;

use battle_core::{BattleAction, BattleView};

use super::errors::Result;

/// Trait for providing the next command of the active stack.
///
/// Different implementations can handle:
/// - Player input (from UI/CLI)
/// - AI decisions
/// - Scripted/replayed actions
/// - Testing fixtures
pub trait ActionProvider {
    /// Provide a command for the active stack of `view`.
    ///
    /// The view is read-only; the caller submits the returned action.
    fn provide_action(&mut self, view: &dyn BattleView) -> Result<BattleAction>;
}

/// A simple action provider that always guards.
/// Useful for testing or as a fallback.
#[derive(Clone, Copy, Debug, Default)]
pub struct GuardActionProvider;

impl ActionProvider for GuardActionProvider {
    fn provide_action(&mut self, _view: &dyn BattleView) -> Result<BattleAction> {
        Ok(BattleAction::Guard)
    }
}

/// Hands out a fixed list of actions in order, then guards.
#[derive(Clone, Debug, Default)]
pub struct ScriptedActionProvider {
    actions: VecDeque<BattleAction>,
}

impl ScriptedActionProvider {
    pub fn new(actions: impl IntoIterator<Item = BattleAction>) -> Self {
        Self {
            actions: actions.into_iter().collect(),
        }
    }

    /// Actions not handed out yet.
    pub fn remaining(&self) -> usize {
        self.actions.len()
    }
}

impl ActionProvider for ScriptedActionProvider {
    fn provide_action(&mut self, _view: &dyn BattleView) -> Result<BattleAction> {
        Ok(self.actions.pop_front().unwrap_or(BattleAction::Guard))
    }
}
