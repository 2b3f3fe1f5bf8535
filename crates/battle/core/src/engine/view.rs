//! Read and write surfaces of a running battle.
//!
//! AI providers, replay players and front ends all drive the engine through
//! the same two traits, so none of them needs special treatment.

use std::collections::BTreeMap;

use super::{BattleEngine, BattleError};
use crate::action::{AvailableActions, BattleAction, CastParams, CastPlan, MovePlan, PlanAttackParams, PlanMoveParams};
use crate::config::BattleConfig;
use crate::field::{BattleField, BattlePosition, PositionSet};
use crate::formula::FormulaError;
use crate::state::{BattleHero, BattleResult, BattleStack, BattleState, Side, StackId};

/// Read-only view of a battle.
pub trait BattleView {
    fn state(&self) -> &BattleState;

    fn config(&self) -> &BattleConfig;

    /// Capabilities of the active stack; all `false` when nobody is active.
    fn available_actions(&self) -> AvailableActions;

    /// Cells `stack` can walk to this turn.
    fn reachable(&self, stack: StackId) -> PositionSet;

    /// Step counts to every cell `stack` can reach within `limit` steps
    /// (`None` for unlimited).
    fn distances(&self, stack: StackId, limit: Option<u32>) -> BTreeMap<BattlePosition, u32>;

    fn find_plan_move(&self, movement: &PlanMoveParams, attack: &PlanAttackParams) -> MovePlan;

    fn find_plan_cast(&self, params: &CastParams) -> Result<CastPlan, FormulaError>;

    fn field(&self) -> &BattleField {
        self.state().field()
    }

    fn obstacles(&self) -> &PositionSet {
        self.state().obstacles()
    }

    fn stacks(&self) -> &[BattleStack] {
        self.state().stacks()
    }

    fn alive_stacks(&self) -> Vec<&BattleStack> {
        self.state().alive().collect()
    }

    fn stack(&self, id: StackId) -> Option<&BattleStack> {
        self.state().stack(id)
    }

    fn find_stack(&self, pos: BattlePosition, only_alive: bool) -> Option<&BattleStack> {
        self.state().find_stack(pos, only_alive)
    }

    fn active_stack(&self) -> Option<&BattleStack> {
        self.state().current().and_then(|id| self.state().stack(id))
    }

    fn current_side(&self) -> Option<Side> {
        self.active_stack().map(BattleStack::side)
    }

    fn hero(&self, side: Side) -> Option<&BattleHero> {
        self.state().hero(side)
    }

    fn round(&self) -> u32 {
        self.state().round()
    }

    fn is_finished(&self) -> bool {
        self.state().phase().is_finished()
    }

    fn result(&self) -> Option<BattleResult> {
        self.state().phase().result()
    }
}

/// Commands of the active stack.
///
/// Each call either fails with a [`BattleError`] and leaves the battle as it
/// was, or succeeds after every observer has been notified.
pub trait BattleControl {
    fn do_move_attack(&mut self, movement: PlanMoveParams, attack: PlanAttackParams) -> Result<(), BattleError>;

    fn do_wait(&mut self) -> Result<(), BattleError>;

    fn do_guard(&mut self) -> Result<(), BattleError>;

    fn do_cast(&mut self, params: CastParams) -> Result<(), BattleError>;

    /// Dispatches a recorded action to the matching command.
    fn apply(&mut self, action: &BattleAction) -> Result<(), BattleError> {
        match action {
            BattleAction::Guard => self.do_guard(),
            BattleAction::Wait => self.do_wait(),
            BattleAction::MoveAttack { movement, attack } => self.do_move_attack(*movement, *attack),
            BattleAction::Cast(params) => self.do_cast(params.clone()),
        }
    }
}

impl BattleView for BattleEngine {
    fn state(&self) -> &BattleState {
        &self.state
    }

    fn config(&self) -> &BattleConfig {
        &self.config
    }

    fn available_actions(&self) -> AvailableActions {
        BattleEngine::available_actions(self)
    }

    fn reachable(&self, stack: StackId) -> PositionSet {
        let Some(speed) = self.state.stack(stack).map(|stack| stack.current.speed) else {
            return PositionSet::new();
        };
        self.reach_map(stack)
            .map(|reach| reach.available(Some(u32::try_from(speed).unwrap_or(0))))
            .unwrap_or_default()
    }

    fn distances(&self, stack: StackId, limit: Option<u32>) -> BTreeMap<BattlePosition, u32> {
        self.reach_map(stack)
            .map(|reach| reach.distances(limit))
            .unwrap_or_default()
    }

    fn find_plan_move(&self, movement: &PlanMoveParams, attack: &PlanAttackParams) -> MovePlan {
        BattleEngine::find_plan_move(self, movement, attack)
    }

    fn find_plan_cast(&self, params: &CastParams) -> Result<CastPlan, FormulaError> {
        BattleEngine::find_plan_cast(self, params)
    }
}

impl BattleControl for BattleEngine {
    fn do_move_attack(&mut self, movement: PlanMoveParams, attack: PlanAttackParams) -> Result<(), BattleError> {
        BattleEngine::do_move_attack(self, movement, attack)
    }

    fn do_wait(&mut self) -> Result<(), BattleError> {
        BattleEngine::do_wait(self)
    }

    fn do_guard(&mut self) -> Result<(), BattleError> {
        BattleEngine::do_guard(self)
    }

    fn do_cast(&mut self, params: CastParams) -> Result<(), BattleError> {
        BattleEngine::do_cast(self, params)
    }
}
