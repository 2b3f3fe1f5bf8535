//! Control wrapper that records accepted commands.

use std::collections::BTreeMap;

use battle_core::{
    AvailableActions, BattleAction, BattleConfig, BattleControl, BattleError, BattlePosition,
    BattleState, BattleView, CastParams, CastPlan, FormulaError, MovePlan, PlanAttackParams,
    PlanMoveParams, PositionSet, StackId,
};

/// Forwards commands to the wrapped control and keeps those that succeed.
///
/// Rejected commands leave the battle untouched, so leaving them out keeps
/// the recording replayable. Reads are forwarded as well, which lets an
/// [`crate::ActionProvider`] plan against the wrapper directly.
#[derive(Debug)]
pub struct RecordingControl<C> {
    inner: C,
    actions: Vec<BattleAction>,
}

impl<C> RecordingControl<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            actions: Vec::new(),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Direct access; commands issued here are not recorded.
    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    pub fn actions(&self) -> &[BattleAction] {
        &self.actions
    }

    pub fn into_parts(self) -> (C, Vec<BattleAction>) {
        (self.inner, self.actions)
    }

    fn record(&mut self, result: Result<(), BattleError>, action: BattleAction) -> Result<(), BattleError> {
        match &result {
            Ok(()) => {
                tracing::trace!(%action, index = self.actions.len(), "recorded");
                self.actions.push(action);
            }
            Err(err) => tracing::debug!(%action, %err, "command rejected, not recorded"),
        }
        result
    }
}

impl<C: BattleControl> BattleControl for RecordingControl<C> {
    fn do_move_attack(&mut self, movement: PlanMoveParams, attack: PlanAttackParams) -> Result<(), BattleError> {
        let result = self.inner.do_move_attack(movement, attack);
        self.record(result, BattleAction::move_attack(movement, attack))
    }

    fn do_wait(&mut self) -> Result<(), BattleError> {
        let result = self.inner.do_wait();
        self.record(result, BattleAction::Wait)
    }

    fn do_guard(&mut self) -> Result<(), BattleError> {
        let result = self.inner.do_guard();
        self.record(result, BattleAction::Guard)
    }

    fn do_cast(&mut self, params: CastParams) -> Result<(), BattleError> {
        let result = self.inner.do_cast(params.clone());
        self.record(result, BattleAction::Cast(params))
    }
}

impl<C: BattleView> BattleView for RecordingControl<C> {
    fn state(&self) -> &BattleState {
        self.inner.state()
    }

    fn config(&self) -> &BattleConfig {
        self.inner.config()
    }

    fn available_actions(&self) -> AvailableActions {
        self.inner.available_actions()
    }

    fn reachable(&self, stack: StackId) -> PositionSet {
        self.inner.reachable(stack)
    }

    fn distances(&self, stack: StackId, limit: Option<u32>) -> BTreeMap<BattlePosition, u32> {
        self.inner.distances(stack, limit)
    }

    fn find_plan_move(&self, movement: &PlanMoveParams, attack: &PlanAttackParams) -> MovePlan {
        self.inner.find_plan_move(movement, attack)
    }

    fn find_plan_cast(&self, params: &CastParams) -> Result<CastPlan, FormulaError> {
        self.inner.find_plan_cast(params)
    }
}
